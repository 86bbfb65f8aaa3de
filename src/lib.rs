#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

//! Eigenvalues and eigenvectors of dense real matrices.
//!
//! Symmetric matrices are tridiagonalized and diagonalized with implicit QL;
//! everything else is reduced to Hessenberg and then real Schur form with
//! double-shift QR, followed by back-substitution for the eigenvectors.
//!
//! ```
//! use nalgebra::DMatrix;
//! use real_eigen::EigenvalueDecomposition;
//!
//! let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
//! let eig = EigenvalueDecomposition::new(&a).unwrap();
//! let values: Vec<f64> = eig.real_eigenvalues().collect();
//! assert!((values[0] - 1.0).abs() < 1e-12);
//! assert!((values[1] - 3.0).abs() < 1e-12);
//! ```

mod back_substitution;
mod complex;
mod convergence;
mod eigenvalue_decomposition;
mod error;
mod hessenberg;
mod options;
mod schur;
mod symmetric_ql;
mod symmetry;
mod tridiagonal;

pub use complex::Complex;
pub use convergence::Convergence;
pub use eigenvalue_decomposition::EigenvalueDecomposition;
pub use error::{EigenError, Result};
pub use options::{DecompositionOptions, SymmetryCheck};
pub use symmetry::{classify, Algorithm};
