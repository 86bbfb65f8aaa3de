use nalgebra::{DMatrix, DVector};

/// Symmetric Householder reduction to tridiagonal form.
///
/// On entry `v` holds the symmetric matrix. On return `v` holds the
/// orthogonal transform, `d` the diagonal and `e[1..]` the sub-diagonal of
/// `vᵀ A v`, with `e[0] == 0`.
pub fn tridiagonalize(v: &mut DMatrix<f64>, d: &mut DVector<f64>, e: &mut DVector<f64>) {
    puffin::profile_function!();

    //  This is derived from the Algol procedures tred2 by
    //  Bowdler, Martin, Reinsch, and Wilkinson, Handbook for
    //  Auto. Comp., Vol.ii-Linear Algebra, and the corresponding
    //  Fortran subroutine in EISPACK.

    let n = v.ncols();
    if n == 0 {
        return;
    }

    for j in 0..n {
        d[j] = v[(n - 1, j)];
    }

    // Householder reduction to tridiagonal form.

    for i in (1..n).rev() {
        // Scale to avoid under/overflow.

        let mut scale = 0.0;
        let mut h = 0.0;
        for k in 0..i {
            scale += d[k].abs();
        }
        if scale == 0.0 {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = v[(i - 1, j)];
                v[(i, j)] = 0.0;
                v[(j, i)] = 0.0;
            }
        } else {
            // Generate Householder vector.

            for k in 0..i {
                d[k] /= scale;
                h += d[k] * d[k];
            }
            let mut f = d[i - 1];
            let mut g = h.sqrt();
            if f > 0.0 {
                g = -g;
            }
            e[i] = scale * g;
            h -= f * g;
            d[i - 1] = f - g;
            for j in 0..i {
                e[j] = 0.0;
            }

            // Apply similarity transformation to remaining columns.

            for j in 0..i {
                f = d[j];
                v[(j, i)] = f;
                g = e[j] + v[(j, j)] * f;
                for k in (j + 1)..i {
                    g += v[(k, j)] * d[k];
                    e[k] += v[(k, j)] * f;
                }
                e[j] = g;
            }
            f = 0.0;
            for j in 0..i {
                e[j] /= h;
                f += e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] -= hh * d[j];
            }
            for j in 0..i {
                f = d[j];
                g = e[j];
                for k in j..i {
                    v[(k, j)] -= f * e[k] + g * d[k];
                }
                d[j] = v[(i - 1, j)];
                v[(i, j)] = 0.0;
            }
        }
        d[i] = h;
    }

    // Accumulate transformations.

    for i in 0..(n - 1) {
        v[(n - 1, i)] = v[(i, i)];
        v[(i, i)] = 1.0;
        let h = d[i + 1];
        if h != 0.0 {
            for k in 0..=i {
                d[k] = v[(k, i + 1)] / h;
            }
            for j in 0..=i {
                let mut g = 0.0;
                for k in 0..=i {
                    g += v[(k, i + 1)] * v[(k, j)];
                }
                for k in 0..=i {
                    v[(k, j)] -= g * d[k];
                }
            }
        }
        for k in 0..=i {
            v[(k, i + 1)] = 0.0;
        }
    }
    for j in 0..n {
        d[j] = v[(n - 1, j)];
        v[(n - 1, j)] = 0.0;
    }
    v[(n - 1, n - 1)] = 1.0;
    e[0] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tridiagonal(d: &DVector<f64>, e: &DVector<f64>) -> DMatrix<f64> {
        let n = d.len();
        let mut t = DMatrix::from_diagonal(d);
        for i in 1..n {
            t[(i, i - 1)] = e[i];
            t[(i - 1, i)] = e[i];
        }
        t
    }

    #[test]
    fn reduces_4x4() {
        let a = DMatrix::from_row_slice(
            4,
            4,
            &[
                4.0, 1.0, -2.0, 2.0, //
                1.0, 2.0, 0.0, 1.0, //
                -2.0, 0.0, 3.0, -2.0, //
                2.0, 1.0, -2.0, -1.0,
            ],
        );
        let mut v = a.clone();
        let mut d = DVector::zeros(4);
        let mut e = DVector::zeros(4);
        tridiagonalize(&mut v, &mut d, &mut e);

        assert_eq!(e[0], 0.0);
        assert_abs_diff_eq!(
            v.transpose() * &v,
            DMatrix::identity(4, 4),
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(
            v.transpose() * &a * &v,
            tridiagonal(&d, &e),
            epsilon = 1e-10
        );
    }

    #[test]
    fn already_reduced_column_is_copied() {
        // Last row is zero off the diagonal, so the first step has zero scale.
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 5.0]);
        let mut v = a.clone();
        let mut d = DVector::zeros(3);
        let mut e = DVector::zeros(3);
        tridiagonalize(&mut v, &mut d, &mut e);

        assert_eq!(e[2], 0.0);
        assert_abs_diff_eq!(
            v.transpose() * &a * &v,
            tridiagonal(&d, &e),
            epsilon = 1e-10
        );
    }

    #[test]
    fn single_entry() {
        let mut v = DMatrix::from_element(1, 1, 7.0);
        let mut d = DVector::zeros(1);
        let mut e = DVector::zeros(1);
        tridiagonalize(&mut v, &mut d, &mut e);
        assert_eq!(d[0], 7.0);
        assert_eq!(e[0], 0.0);
        assert_eq!(v[(0, 0)], 1.0);
    }
}
