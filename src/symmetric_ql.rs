use nalgebra::{DMatrix, DVector};

use crate::convergence::{Convergence, IterationBudget};

/// Symmetric tridiagonal QL algorithm.
///
/// Takes the output of [`crate::tridiagonal::tridiagonalize`] and leaves the
/// eigenvalues in `d`, sorted ascending, with the matching eigenvectors in the
/// columns of `v`. `e` is zero on return.
///
/// `tolerance` is the deflation threshold relative to the largest
/// `|d[l]| + |e[l]|` seen so far.
pub fn diagonalize(
    v: &mut DMatrix<f64>,
    d: &mut DVector<f64>,
    e: &mut DVector<f64>,
    tolerance: f64,
    budget: &mut IterationBudget,
) -> Convergence {
    puffin::profile_function!();

    //  This is derived from the Algol procedures tql2, by
    //  Bowdler, Martin, Reinsch, and Wilkinson, Handbook for
    //  Auto. Comp., Vol.ii-Linear Algebra, and the corresponding
    //  Fortran subroutine in EISPACK.

    let n = d.len();
    if n == 0 {
        return Convergence::Converged;
    }

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = 0.0;

    let mut convergence = Convergence::Converged;
    let mut f = 0.0;
    let mut tst1: f64 = 0.0;
    'eigenvalues: for l in 0..n {
        // Find small subdiagonal element

        tst1 = tst1.max(d[l].abs() + e[l].abs());
        let mut m = l;
        while m < n - 1 {
            if e[m].abs() <= tolerance * tst1 {
                break;
            }
            m += 1;
        }

        // If m == l, d[l] is an eigenvalue,
        // otherwise, iterate.

        if m > l {
            loop {
                if !budget.spend() {
                    log::warn!(
                        "QL iteration did not converge after {} sweeps, {} of {} eigenvalues found",
                        budget.used(),
                        l,
                        n
                    );
                    convergence = Convergence::MaxIterationsExceeded;
                    for i in l..n {
                        d[i] += f;
                        e[i] = 0.0;
                    }
                    break 'eigenvalues;
                }

                // Compute implicit shift

                let mut g = d[l];
                let mut p = (d[l + 1] - g) / (2.0 * e[l]);
                let mut r = p.hypot(1.0);
                if p < 0.0 {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for i in (l + 2)..n {
                    d[i] -= h;
                }
                f += h;

                // Implicit QL transformation.

                p = d[m];
                let mut c = 1.0;
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = 0.0;
                let mut s2 = 0.0;
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * e[i];
                    h = c * p;
                    r = p.hypot(e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);

                    // Accumulate transformation.

                    for k in 0..n {
                        h = v[(k, i + 1)];
                        v[(k, i + 1)] = s * v[(k, i)] + c * h;
                        v[(k, i)] = c * v[(k, i)] - s * h;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                // Check for convergence.

                if e[l].abs() <= tolerance * tst1 {
                    break;
                }
            }
        }
        log::trace!("QL deflated eigenvalue {} of {}", l + 1, n);
        d[l] += f;
        e[l] = 0.0;
    }

    sort_ascending(v, d);
    convergence
}

/// Selection sort of eigenvalues, swapping eigenvector columns to match.
fn sort_ascending(v: &mut DMatrix<f64>, d: &mut DVector<f64>) {
    let n = d.len();
    for i in 0..n.saturating_sub(1) {
        let mut k = i;
        let mut p = d[i];
        for j in (i + 1)..n {
            if d[j] < p {
                k = j;
                p = d[j];
            }
        }
        if k != i {
            d[k] = d[i];
            d[i] = p;
            v.swap_columns(i, k);
        }
    }
}
