use nalgebra::{DMatrix, DVector};

/// Rows and columns `low..=high` touched by the Hessenberg reduction.
///
/// Balancing is not performed, so every decomposition uses [`Span::full`].
/// Rows outside a narrower span would hold roots that are already isolated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub low: usize,
    pub high: usize,
}

impl Span {
    /// The full `0..n` range. `n` must be at least 1.
    pub fn full(n: usize) -> Self {
        Self { low: 0, high: n - 1 }
    }

    pub fn contains(&self, i: usize) -> bool {
        self.low <= i && i <= self.high
    }
}

/// Nonsymmetric reduction to Hessenberg form.
///
/// `h` is reduced in place; `v` is overwritten with the accumulated
/// orthogonal transform, so that `vᵀ A v == h`.
pub fn reduce_to_hessenberg(h: &mut DMatrix<f64>, v: &mut DMatrix<f64>, span: Span) {
    puffin::profile_function!();

    //  This is derived from the Algol procedures orthes and ortran,
    //  by Martin and Wilkinson, Handbook for Auto. Comp.,
    //  Vol.ii-Linear Algebra, and the corresponding
    //  Fortran subroutines in EISPACK.

    let n = h.ncols();
    let Span { low, high } = span;
    let mut ort = DVector::<f64>::zeros(n);

    for m in (low + 1)..high {
        // Scale column.

        let mut scale = 0.0;
        for i in m..=high {
            scale += h[(i, m - 1)].abs();
        }
        if scale != 0.0 {
            // Compute Householder transformation.

            let mut hh = 0.0;
            for i in (m..=high).rev() {
                ort[i] = h[(i, m - 1)] / scale;
                hh += ort[i] * ort[i];
            }
            let mut g = hh.sqrt();
            if ort[m] > 0.0 {
                g = -g;
            }
            hh -= ort[m] * g;
            ort[m] -= g;

            // Apply Householder similarity transformation
            // H = (I-u*u'/h)*H*(I-u*u')/h)

            for j in m..n {
                let mut f = 0.0;
                for i in (m..=high).rev() {
                    f += ort[i] * h[(i, j)];
                }
                f /= hh;
                for i in m..=high {
                    h[(i, j)] -= f * ort[i];
                }
            }

            for i in 0..=high {
                let mut f = 0.0;
                for j in (m..=high).rev() {
                    f += ort[j] * h[(i, j)];
                }
                f /= hh;
                for j in m..=high {
                    h[(i, j)] -= f * ort[j];
                }
            }
            ort[m] *= scale;
            h[(m, m - 1)] = scale * g;
        }
    }

    // Accumulate transformations (Algol's ortran).

    v.fill_with_identity();

    for m in ((low + 1)..high).rev() {
        if h[(m, m - 1)] != 0.0 {
            for i in (m + 1)..=high {
                ort[i] = h[(i, m - 1)];
            }
            for j in m..=high {
                let mut g = 0.0;
                for i in m..=high {
                    g += ort[i] * v[(i, j)];
                }
                // Double division avoids possible underflow
                g = (g / ort[m]) / h[(m, m - 1)];
                for i in m..=high {
                    v[(i, j)] += g * ort[i];
                }
            }
        }
    }

    // The Householder vectors were left below the sub-diagonal.

    for j in 0..n {
        for i in (j + 2)..n {
            h[(i, j)] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reduces_and_accumulates() {
        let a = DMatrix::from_row_slice(
            5,
            5,
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, //
                -1.0, 0.5, 2.0, 0.0, 1.0, //
                3.0, -2.0, 4.0, 1.0, 0.0, //
                0.0, 1.0, -1.0, 2.0, 3.0, //
                2.0, 2.0, 0.0, -3.0, 1.0,
            ],
        );
        let mut h = a.clone();
        let mut v = DMatrix::zeros(5, 5);
        reduce_to_hessenberg(&mut h, &mut v, Span::full(5));

        for j in 0..5 {
            for i in (j + 2)..5 {
                assert_abs_diff_eq!(h[(i, j)], 0.0, epsilon = 1e-12);
            }
        }
        assert_abs_diff_eq!(
            v.transpose() * &v,
            DMatrix::identity(5, 5),
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(v.transpose() * &a * &v, h, epsilon = 1e-10);
    }

    #[test]
    fn small_matrices_are_untouched() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let mut h = a.clone();
        let mut v = DMatrix::zeros(2, 2);
        reduce_to_hessenberg(&mut h, &mut v, Span::full(2));
        assert_eq!(h, a);
        assert_eq!(v, DMatrix::identity(2, 2));
    }

    #[test]
    fn span_contains() {
        let span = Span { low: 1, high: 3 };
        assert!(!span.contains(0));
        assert!(span.contains(1));
        assert!(span.contains(3));
        assert!(!span.contains(4));
    }
}
