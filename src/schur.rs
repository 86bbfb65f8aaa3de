use nalgebra::{DMatrix, DVector};

use crate::complex::Complex;
use crate::convergence::{Convergence, IterationBudget};
use crate::hessenberg::Span;

/// Sum of absolute values on and above the first sub-diagonal.
pub fn hessenberg_norm(h: &DMatrix<f64>) -> f64 {
    let n = h.ncols();
    let mut norm = 0.0;
    for i in 0..n {
        for j in i.saturating_sub(1)..n {
            norm += h[(i, j)].abs();
        }
    }
    norm
}

/// Largest magnitude in the trailing 2×2 block ending at `(n, n)`.
///
/// Non-zero whenever the block is not deflated, since `h[(n, n - 1)]` is then
/// not negligible.
fn block_scale(h: &DMatrix<f64>, n: usize) -> f64 {
    h[(n - 1, n - 1)]
        .abs()
        .max(h[(n - 1, n)].abs())
        .max(h[(n, n - 1)].abs())
        .max(h[(n, n)].abs())
}

/// Nonsymmetric reduction from Hessenberg to real Schur form.
///
/// Real eigenvalues end up as 1×1 blocks and complex conjugate pairs as 2×2
/// blocks on the diagonal of `h`. Eigenvalues are written to `d` (real parts)
/// and `e` (imaginary parts, `e[i] > 0` followed by `e[i + 1] == -e[i]` for a
/// pair). All rotations are accumulated into `v`.
///
/// `norm` is [`hessenberg_norm`] of `h` on entry.
pub fn reduce_to_real_schur(
    h: &mut DMatrix<f64>,
    v: &mut DMatrix<f64>,
    d: &mut DVector<f64>,
    e: &mut DVector<f64>,
    span: Span,
    norm: f64,
    budget: &mut IterationBudget,
) -> Convergence {
    puffin::profile_function!();

    //  This is derived from the Algol procedure hqr2,
    //  by Martin and Wilkinson, Handbook for Auto. Comp.,
    //  Vol.ii-Linear Algebra, and the corresponding
    //  Fortran subroutine in EISPACK.

    let nn = h.ncols();
    let Span { low, high } = span;
    let eps = f64::EPSILON;
    let mut exshift = 0.0;

    // Store roots outside the reduced span

    for i in (0..nn).filter(|&i| !span.contains(i)) {
        d[i] = h[(i, i)];
        e[i] = 0.0;
    }

    // A zero Hessenberg matrix has only zero eigenvalues and nothing to iterate on.

    if norm == 0.0 {
        for i in low..=high {
            d[i] = 0.0;
            e[i] = 0.0;
        }
        return Convergence::Converged;
    }

    // Outer loop over eigenvalue index

    let mut convergence = Convergence::Converged;
    let mut n = high;
    let mut iter = 0;
    loop {
        // Look for single small sub-diagonal element

        let mut l = n;
        while l > low {
            let mut s = h[(l - 1, l - 1)].abs() + h[(l, l)].abs();
            if s == 0.0 {
                s = norm;
            }
            if h[(l, l - 1)].abs() < eps * s {
                break;
            }
            l -= 1;
        }

        // Check for convergence
        // One root found

        if l == n {
            h[(n, n)] += exshift;
            d[n] = h[(n, n)];
            e[n] = 0.0;
            log::trace!("QR deflated real root {} at index {}", d[n], n);
            iter = 0;
            if n == low {
                break;
            }
            n -= 1;

        // Two roots found
        } else if l + 1 == n {
            // p, w, q and z are relative to the largest block entry
            let scale = block_scale(h, n);
            let w = (h[(n, n - 1)] / scale) * (h[(n - 1, n)] / scale);
            let p = (h[(n - 1, n - 1)] / scale - h[(n, n)] / scale) / 2.0;
            let q = p * p + w;
            let mut z = q.abs().sqrt();
            h[(n, n)] += exshift;
            h[(n - 1, n - 1)] += exshift;
            let x = h[(n, n)];

            // Real pair

            if q >= 0.0 {
                z = if p >= 0.0 { p + z } else { p - z };
                d[n - 1] = x + z * scale;
                d[n] = d[n - 1];
                if z != 0.0 {
                    d[n] = x - (w / z) * scale;
                }
                e[n - 1] = 0.0;
                e[n] = 0.0;
                let x = h[(n, n - 1)] / scale;
                let s = x.abs() + z.abs();
                let mut p = x / s;
                let mut q = z / s;
                let r = (p * p + q * q).sqrt();
                p /= r;
                q /= r;

                // Row modification

                for j in (n - 1)..nn {
                    let z = h[(n - 1, j)];
                    h[(n - 1, j)] = q * z + p * h[(n, j)];
                    h[(n, j)] = q * h[(n, j)] - p * z;
                }

                // Column modification

                for i in 0..=n {
                    let z = h[(i, n - 1)];
                    h[(i, n - 1)] = q * z + p * h[(i, n)];
                    h[(i, n)] = q * h[(i, n)] - p * z;
                }

                // Accumulate transformations

                for i in low..=high {
                    let z = v[(i, n - 1)];
                    v[(i, n - 1)] = q * z + p * v[(i, n)];
                    v[(i, n)] = q * v[(i, n)] - p * z;
                }
                log::trace!("QR deflated real pair {}, {} at index {}", d[n - 1], d[n], n - 1);

            // Complex pair
            } else {
                let root = Complex::new(x + p * scale, z * scale);
                d[n - 1] = root.re;
                d[n] = root.re;
                e[n - 1] = root.im;
                e[n] = -root.im;
                log::trace!("QR deflated complex pair {} at index {}", root, n - 1);
            }
            iter = 0;
            if n < low + 2 {
                break;
            }
            n -= 2;

        // No convergence yet
        } else {
            if !budget.spend() {
                log::warn!(
                    "QR iteration did not converge after {} sweeps, {} of {} eigenvalues found",
                    budget.used(),
                    nn - (n + 1 - low),
                    nn
                );
                for i in low..=n {
                    h[(i, i)] += exshift;
                    d[i] = h[(i, i)];
                    e[i] = 0.0;
                }
                convergence = Convergence::MaxIterationsExceeded;
                break;
            }

            // Form shift

            let mut x = h[(n, n)];
            let mut y = h[(n - 1, n - 1)];
            let mut w = h[(n, n - 1)] * h[(n - 1, n)];

            // Wilkinson's original ad hoc shift

            if iter == 10 {
                exshift += x;
                for i in low..=n {
                    h[(i, i)] -= x;
                }
                let s = h[(n, n - 1)].abs() + h[(n - 1, n - 2)].abs();
                x = 0.75 * s;
                y = x;
                w = -0.4375 * s * s;
            }

            // MATLAB's new ad hoc shift

            if iter == 30 {
                let mut s = (y - x) / 2.0;
                s = s * s + w;
                if s > 0.0 {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) / 2.0 + s);
                    for i in low..=n {
                        h[(i, i)] -= s;
                    }
                    exshift += s;
                    x = 0.964;
                    y = x;
                    w = x;
                }
            }

            iter += 1;

            // Look for two consecutive small sub-diagonal elements

            let mut m = n - 2;
            let mut p;
            let mut q;
            let mut r;
            loop {
                let z = h[(m, m)];
                r = x - z;
                let s = y - z;
                p = (r * s - w) / h[(m + 1, m)] + h[(m, m + 1)];
                q = h[(m + 1, m + 1)] - z - r - s;
                r = h[(m + 2, m + 1)];
                let s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                if h[(m, m - 1)].abs() * (q.abs() + r.abs())
                    < eps * (p.abs() * (h[(m - 1, m - 1)].abs() + z.abs() + h[(m + 1, m + 1)].abs()))
                {
                    break;
                }
                m -= 1;
            }

            for i in (m + 2)..=n {
                h[(i, i - 2)] = 0.0;
                if i > m + 2 {
                    h[(i, i - 3)] = 0.0;
                }
            }

            // Double QR step involving rows l:n and columns m:n

            for k in m..n {
                let notlast = k != n - 1;
                let scale = if k != m {
                    p = h[(k, k - 1)];
                    q = h[(k + 1, k - 1)];
                    r = if notlast { h[(k + 2, k - 1)] } else { 0.0 };
                    let x = p.abs() + q.abs() + r.abs();
                    if x == 0.0 {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                    Some(x)
                } else {
                    None
                };

                let mut s = (p * p + q * q + r * r).sqrt();
                if p < 0.0 {
                    s = -s;
                }
                if s == 0.0 {
                    continue;
                }
                match scale {
                    Some(x) => h[(k, k - 1)] = -s * x,
                    None if l != m => h[(k, k - 1)] = -h[(k, k - 1)],
                    None => {}
                }
                p += s;
                let x = p / s;
                let y = q / s;
                let z = r / s;
                q /= p;
                r /= p;

                // Row modification

                for j in k..nn {
                    let mut p = h[(k, j)] + q * h[(k + 1, j)];
                    if notlast {
                        p += r * h[(k + 2, j)];
                        h[(k + 2, j)] -= p * z;
                    }
                    h[(k, j)] -= p * x;
                    h[(k + 1, j)] -= p * y;
                }

                // Column modification

                for i in 0..=n.min(k + 3) {
                    let mut p = x * h[(i, k)] + y * h[(i, k + 1)];
                    if notlast {
                        p += z * h[(i, k + 2)];
                        h[(i, k + 2)] -= p * r;
                    }
                    h[(i, k)] -= p;
                    h[(i, k + 1)] -= p * q;
                }

                // Accumulate transformations

                for i in low..=high {
                    let mut p = x * v[(i, k)] + y * v[(i, k + 1)];
                    if notlast {
                        p += z * v[(i, k + 2)];
                        v[(i, k + 2)] -= p * r;
                    }
                    v[(i, k)] -= p;
                    v[(i, k + 1)] -= p * q;
                }
            }
        }
    }

    // The bulge chase leaves stale entries below the sub-diagonal, and
    // deflation leaves negligible ones on it outside of 2x2 blocks.

    for j in 0..nn {
        for i in (j + 2)..nn {
            h[(i, j)] = 0.0;
        }
        if convergence.is_converged() && j + 1 < nn && e[j] <= 0.0 {
            h[(j + 1, j)] = 0.0;
        }
    }

    convergence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hessenberg::reduce_to_hessenberg;
    use approx::assert_abs_diff_eq;

    fn schur(a: &DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>, DVector<f64>, DVector<f64>) {
        let n = a.ncols();
        let span = Span::full(n);
        let mut h = a.clone();
        let mut v = DMatrix::zeros(n, n);
        let mut d = DVector::zeros(n);
        let mut e = DVector::zeros(n);
        reduce_to_hessenberg(&mut h, &mut v, span);
        let norm = hessenberg_norm(&h);
        let mut budget = IterationBudget::new(30 * n.max(10));
        let convergence = reduce_to_real_schur(&mut h, &mut v, &mut d, &mut e, span, norm, &mut budget);
        assert_eq!(convergence, Convergence::Converged);
        (h, v, d, e)
    }

    #[test]
    fn norm_skips_lower_part() {
        let h = DMatrix::from_row_slice(3, 3, &[1.0, -2.0, 3.0, 4.0, 5.0, 6.0, 100.0, 7.0, 8.0]);
        assert_eq!(hessenberg_norm(&h), 36.0);
    }

    #[test]
    fn rotation_has_complex_pair() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let (_, _, d, e) = schur(&a);
        assert_abs_diff_eq!(d[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d[1], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(e[0], 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(e[1], -1.0, epsilon = 1e-14);
    }

    #[test]
    fn complex_pair_at_extreme_scales() {
        for scale in [1e300, 1e-300] {
            let a = DMatrix::from_row_slice(2, 2, &[scale, scale, -scale, scale]);
            let (_, _, d, e) = schur(&a);
            assert_eq!(d[0], scale);
            assert_eq!(d[1], scale);
            assert_eq!(e[0], scale);
            assert_eq!(e[1], -scale);
        }
    }

    #[test]
    fn real_pair_at_large_scale() {
        let a = DMatrix::from_row_slice(2, 2, &[3e200, 1e200, 2e200, -1e200]);
        let (_, _, d, e) = schur(&a);
        assert_eq!(e, DVector::zeros(2));
        let disc = 6.0_f64.sqrt();
        assert_abs_diff_eq!(d[0] / 1e200, 1.0 + disc, epsilon = 1e-12);
        assert_abs_diff_eq!(d[1] / 1e200, 1.0 - disc, epsilon = 1e-12);
    }

    #[test]
    fn real_pair_is_triangularized() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let (h, v, d, e) = schur(&a);
        assert_eq!(e, DVector::zeros(2));
        let disc = 33.0_f64.sqrt();
        let mut values = vec![d[0], d[1]];
        values.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_abs_diff_eq!(values[0], (5.0 - disc) / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], (5.0 + disc) / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(h[(1, 0)], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(&v * &h * v.transpose(), a, epsilon = 1e-12);
    }

    #[test]
    fn schur_form_is_similar() {
        let a = DMatrix::from_row_slice(
            4,
            4,
            &[
                4.0, -2.0, 1.0, 3.0, //
                1.0, 0.0, -1.0, 2.0, //
                -3.0, 2.0, 5.0, 1.0, //
                2.0, 1.0, 0.0, -2.0,
            ],
        );
        let (h, v, d, e) = schur(&a);
        assert_abs_diff_eq!(&v * &h * v.transpose(), a, epsilon = 1e-10);
        assert_abs_diff_eq!(d.sum(), a.trace(), epsilon = 1e-10);
        for i in 0..4 {
            if e[i] > 0.0 {
                assert_eq!(e[i + 1], -e[i]);
                assert_eq!(d[i + 1], d[i]);
            }
        }
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[
                1.0, 2.0, 3.0, //
                -4.0, 5.0, 6.0, //
                7.0, 8.0, -9.0,
            ],
        );
        let span = Span::full(3);
        let mut h = a.clone();
        let mut v = DMatrix::zeros(3, 3);
        let mut d = DVector::zeros(3);
        let mut e = DVector::zeros(3);
        reduce_to_hessenberg(&mut h, &mut v, span);
        let norm = hessenberg_norm(&h);
        let mut budget = IterationBudget::new(0);
        let convergence = reduce_to_real_schur(&mut h, &mut v, &mut d, &mut e, span, norm, &mut budget);
        assert_eq!(convergence, Convergence::MaxIterationsExceeded);
        assert!(d.iter().all(|x| x.is_finite()));
    }
}
