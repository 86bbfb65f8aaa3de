// This code is based on EigenvalueDecomposition.java from the library Jama which is release to public domain.
// The solver in the Eigen C++ library is also based on the code from Jama.

/*! Eigenvalues and eigenvectors of a real matrix.

    If A is symmetric, then A = V*D*V' where the eigenvalue matrix D is
    diagonal and the eigenvector matrix V is orthogonal.
    I.e. A = V*(D*V') and V*V' equals the identity matrix.

    If A is not symmetric, then the eigenvalue matrix D is block diagonal
    with the real eigenvalues in 1-by-1 blocks and any complex eigenvalues,
    lambda + i*mu, in 2-by-2 blocks, [lambda, mu; -mu, lambda].  The
    columns of V represent the eigenvectors in the sense that A*V = V*D.
    The matrix V may be badly conditioned, or even singular, so the
    validity of the equation A = V*D*inverse(V) depends upon the condition
    of V.
*/
use nalgebra::{DMatrix, DVector};

use crate::back_substitution::back_substitute;
use crate::complex::Complex;
use crate::convergence::{Convergence, IterationBudget};
use crate::error::{EigenError, Result};
use crate::hessenberg::{reduce_to_hessenberg, Span};
use crate::options::{DecompositionOptions, SymmetryCheck};
use crate::schur::{hessenberg_norm, reduce_to_real_schur};
use crate::symmetric_ql::diagonalize;
use crate::symmetry::{classify, symmetrize, Algorithm};
use crate::tridiagonal::tridiagonalize;

/// Eigen-decomposition of a square real matrix, computed once on construction.
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug)]
pub struct EigenvalueDecomposition {
    /// Row and column dimension (square matrix).
    n: usize,

    algorithm: Algorithm,
    convergence: Convergence,
    iterations: usize,

    /// Real and imaginary parts of the eigenvalues.
    d: DVector<f64>,
    e: DVector<f64>,

    /// Eigenvectors, one column per eigenvalue.
    v: DMatrix<f64>,
}

impl EigenvalueDecomposition {
    /// Check for symmetry, then construct the eigenvalue decomposition.
    ///
    /// The caller's matrix is not modified.
    pub fn new(a: &DMatrix<f64>) -> Result<Self> {
        Self::with_options(a, &DecompositionOptions::default())
    }

    pub fn with_options(a: &DMatrix<f64>, options: &DecompositionOptions) -> Result<Self> {
        puffin::profile_function!();
        options.validate()?;
        check_input(a)?;

        let n = a.ncols();
        let algorithm = classify(a, options.symmetry);
        log::debug!("decomposing {}x{} matrix on the {:?} path", n, n, algorithm);

        let mut d = DVector::zeros(n);
        let mut e = DVector::zeros(n);
        if n == 0 {
            return Ok(Self {
                n,
                algorithm,
                convergence: Convergence::Converged,
                iterations: 0,
                d,
                e,
                v: DMatrix::zeros(0, 0),
            });
        }

        let (v, convergence, iterations) = match algorithm {
            Algorithm::Symmetric => {
                let mut v = a.clone();
                if let SymmetryCheck::Tolerance(_) = options.symmetry {
                    symmetrize(&mut v);
                }
                let mut budget = IterationBudget::new(
                    options.max_iterations_per_eigenvalue.saturating_mul(n),
                );

                // Tridiagonalize.
                tridiagonalize(&mut v, &mut d, &mut e);

                // Diagonalize.
                let convergence =
                    diagonalize(&mut v, &mut d, &mut e, options.ql_tolerance, &mut budget);
                (v, convergence, budget.used())
            }
            Algorithm::General => {
                let span = Span::full(n);
                let mut h = a.clone();
                let mut v = DMatrix::zeros(n, n);
                let mut budget = IterationBudget::new(
                    options.max_iterations_per_eigenvalue.saturating_mul(n.max(10)),
                );

                // Reduce to Hessenberg form.
                reduce_to_hessenberg(&mut h, &mut v, span);

                // Reduce Hessenberg to real Schur form.
                let norm = hessenberg_norm(&h);
                let convergence =
                    reduce_to_real_schur(&mut h, &mut v, &mut d, &mut e, span, norm, &mut budget);

                // Backsubstitute and transform the vectors back.
                back_substitute(&mut h, &mut v, &d, &e, span, norm);
                (v, convergence, budget.used())
            }
        };

        if convergence.is_converged() {
            log::debug!("converged after {} sweeps", iterations);
        }

        Ok(Self {
            n,
            algorithm,
            convergence,
            iterations,
            d,
            e,
            v,
        })
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    /// The path the matrix went through.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    pub fn is_converged(&self) -> bool {
        self.convergence.is_converged()
    }

    /// Total QL or QR sweeps spent.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// All eigenvalues, aligned with the columns of [`Self::eigenvectors`].
    ///
    /// Complex eigenvalues come in adjacent conjugate pairs, positive
    /// imaginary part first. On the symmetric path they are real and sorted
    /// ascending.
    pub fn eigenvalues(&self) -> Vec<Complex<f64>> {
        self.d
            .iter()
            .zip(self.e.iter())
            .map(|(&re, &im)| Complex::new(re, im))
            .collect()
    }

    /// The eigenvalues with zero imaginary part, in index order.
    pub fn real_eigenvalues(&self) -> impl Iterator<Item = f64> + '_ {
        self.real_indices().map(move |i| self.d[i])
    }

    /// The eigenvector matrix V.
    ///
    /// For a conjugate pair at `(i, i + 1)` column `i` holds the real part and
    /// column `i + 1` the imaginary part of the eigenvector of eigenvalue `i`.
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.v
    }

    /// Eigenvectors of the real eigenvalues, aligned with [`Self::real_eigenvalues`].
    pub fn real_eigenvectors(&self) -> impl Iterator<Item = DVector<f64>> + '_ {
        self.real_indices().map(move |i| self.v.column(i).into_owned())
    }

    pub fn real_eigen_pairs(&self) -> impl Iterator<Item = (f64, DVector<f64>)> + '_ {
        self.real_indices()
            .map(move |i| (self.d[i], self.v.column(i).into_owned()))
    }

    /// One complex eigenvector per eigenvalue, aligned with [`Self::eigenvalues`].
    pub fn complex_eigenvectors(&self) -> Vec<DVector<Complex<f64>>> {
        let n = self.n;
        let v = &self.v;
        (0..n)
            .map(|i| {
                if self.e[i] > 0.0 {
                    DVector::from_fn(n, |k, _| Complex::new(v[(k, i)], v[(k, i + 1)]))
                } else if self.e[i] < 0.0 {
                    DVector::from_fn(n, |k, _| Complex::new(v[(k, i - 1)], -v[(k, i)]))
                } else {
                    DVector::from_fn(n, |k, _| Complex::new(v[(k, i)], 0.0))
                }
            })
            .collect()
    }

    /// Return the real parts of the eigenvalues
    pub fn real_parts(&self) -> &DVector<f64> {
        &self.d
    }

    /// Return the imaginary parts of the eigenvalues
    pub fn imaginary_parts(&self) -> &DVector<f64> {
        &self.e
    }

    /// Return the block diagonal eigenvalue matrix D
    pub fn diagonal_matrix(&self) -> DMatrix<f64> {
        let n = self.n;
        let Self { d, e, .. } = self;
        let mut diagonal = DMatrix::zeros(n, n);
        for i in 0..n {
            diagonal[(i, i)] = d[i];
            if e[i] > 0.0 {
                diagonal[(i, i + 1)] = e[i];
            } else if e[i] < 0.0 {
                diagonal[(i, i - 1)] = e[i];
            }
        }
        diagonal
    }

    /// Sum of the eigenvalues.
    pub fn trace(&self) -> f64 {
        self.d.sum()
    }

    /// Product of the eigenvalues.
    pub fn determinant(&self) -> f64 {
        let Self { d, e, .. } = self;
        let mut product = 1.0;
        for i in 0..self.n {
            if e[i] == 0.0 {
                product *= d[i];
            } else if e[i] > 0.0 {
                // λ·conj(λ) for the whole pair.
                product *= d[i] * d[i] + e[i] * e[i];
            }
        }
        product
    }

    fn real_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&i| self.e[i] == 0.0)
    }
}

fn check_input(a: &DMatrix<f64>) -> Result<()> {
    if !a.is_square() {
        return Err(EigenError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            if !a[(i, j)].is_finite() {
                return Err(EigenError::NonFinite { row: i, col: j });
            }
        }
    }
    Ok(())
}
