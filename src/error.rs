//! Error types for the eigenvalue decomposition.

use thiserror::Error;

/// Result type for decomposition operations.
pub type Result<T> = std::result::Result<T, EigenError>;

/// Errors raised before any reduction runs.
///
/// Failing to converge is not an error; see [`crate::Convergence`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EigenError {
    /// Eigenvalues are only defined for square matrices.
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// NaN or infinite entry
    #[error("Matrix entry at ({row}, {col}) is not finite")]
    NonFinite {
        /// Row of the offending entry
        row: usize,
        /// Column of the offending entry
        col: usize,
    },

    /// Rejected decomposition option
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_square_error() {
        let err = EigenError::NotSquare { rows: 2, cols: 3 };
        assert_eq!(err.to_string(), "Matrix is not square: 2x3");
    }

    #[test]
    fn test_non_finite_error() {
        let err = EigenError::NonFinite { row: 1, col: 0 };
        assert_eq!(err.to_string(), "Matrix entry at (1, 0) is not finite");
    }

    #[test]
    fn test_invalid_option_error() {
        let err = EigenError::InvalidOption("ql_tolerance must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid option: ql_tolerance must be positive"
        );
    }
}
