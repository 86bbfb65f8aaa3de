use nalgebra::DMatrix;

use crate::options::SymmetryCheck;

/// Which reduction a matrix goes through.
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Householder tridiagonalization followed by implicit QL.
    Symmetric,
    /// Hessenberg reduction followed by double-shift QR to real Schur form.
    General,
}

/// Pick the algorithm for a matrix.
///
/// A non-square matrix is never symmetric and classifies as
/// [`Algorithm::General`].
pub fn classify(a: &DMatrix<f64>, check: SymmetryCheck) -> Algorithm {
    if !a.is_square() {
        return Algorithm::General;
    }
    let symmetric = match check {
        SymmetryCheck::Exact => is_symmetric_within(a, |x, y| x == y),
        SymmetryCheck::Tolerance(tolerance) => {
            is_symmetric_within(a, |x, y| (x - y).abs() <= tolerance)
        }
        SymmetryCheck::Never => false,
    };
    if symmetric {
        Algorithm::Symmetric
    } else {
        Algorithm::General
    }
}

fn is_symmetric_within(a: &DMatrix<f64>, same: impl Fn(f64, f64) -> bool) -> bool {
    let n = a.ncols();
    for j in 0..n {
        for i in (j + 1)..n {
            if !same(a[(i, j)], a[(j, i)]) {
                return false;
            }
        }
    }
    true
}

/// Replace `a` with `(a + aᵀ) / 2`.
pub(crate) fn symmetrize(a: &mut DMatrix<f64>) {
    let n = a.ncols();
    for j in 0..n {
        for i in (j + 1)..n {
            let mean = 0.5 * (a[(i, j)] + a[(j, i)]);
            a[(i, j)] = mean;
            a[(j, i)] = mean;
        }
    }
}
