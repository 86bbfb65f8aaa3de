use crate::error::{EigenError, Result};

/// How the input matrix is tested for symmetry before picking an algorithm.
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SymmetryCheck {
    /// `a[(i, j)] == a[(j, i)]` for every entry.
    #[default]
    Exact,
    /// `|a[(i, j)] - a[(j, i)]| <= tolerance` for every entry.
    /// A matrix accepted this way is symmetrized before reduction.
    Tolerance(f64),
    /// Always use the general (Hessenberg + real Schur) path.
    Never,
}

/// Tuning knobs for [`crate::EigenvalueDecomposition::with_options`].
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DecompositionOptions {
    /// Decides between the symmetric and the general path.
    pub symmetry: SymmetryCheck,

    /// Sweeps allowed per eigenvalue before giving up. The total budget is
    /// this times `n` for QL and times `max(n, 10)` for QR, saturating at
    /// `usize::MAX`.
    pub max_iterations_per_eigenvalue: usize,

    /// Relative deflation threshold of the symmetric QL iteration.
    pub ql_tolerance: f64,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        Self {
            symmetry: SymmetryCheck::default(),
            max_iterations_per_eigenvalue: 30,
            ql_tolerance: 1e-12,
        }
    }
}

impl DecompositionOptions {
    /// Replace the symmetry check.
    pub fn with_symmetry(mut self, symmetry: SymmetryCheck) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Replace the per-eigenvalue sweep limit. Must be at least 1.
    pub fn with_max_iterations_per_eigenvalue(mut self, max_iterations: usize) -> Self {
        self.max_iterations_per_eigenvalue = max_iterations;
        self
    }

    /// Replace the QL deflation threshold. Must lie strictly between 0 and 1.
    pub fn with_ql_tolerance(mut self, tolerance: f64) -> Self {
        self.ql_tolerance = tolerance;
        self
    }

    /// Check every field, returning [`EigenError::InvalidOption`] for the
    /// first bad one.
    pub fn validate(&self) -> Result<()> {
        if let SymmetryCheck::Tolerance(tolerance) = self.symmetry {
            if !(tolerance >= 0.0 && tolerance.is_finite()) {
                return Err(EigenError::InvalidOption(format!(
                    "symmetry tolerance must be finite and non-negative, got {}",
                    tolerance
                )));
            }
        }
        if self.max_iterations_per_eigenvalue == 0 {
            return Err(EigenError::InvalidOption(
                "max_iterations_per_eigenvalue must be at least 1".to_string(),
            ));
        }
        if !(self.ql_tolerance > 0.0 && self.ql_tolerance < 1.0) {
            return Err(EigenError::InvalidOption(format!(
                "ql_tolerance must lie in (0, 1), got {}",
                self.ql_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = DecompositionOptions::default();
        assert_eq!(options.symmetry, SymmetryCheck::Exact);
        assert_eq!(options.max_iterations_per_eigenvalue, 30);
        assert_eq!(options.ql_tolerance, 1e-12);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let negative = DecompositionOptions::default().with_symmetry(SymmetryCheck::Tolerance(-1.0));
        assert!(matches!(
            negative.validate(),
            Err(EigenError::InvalidOption(_))
        ));

        let nan = DecompositionOptions::default().with_symmetry(SymmetryCheck::Tolerance(f64::NAN));
        assert!(nan.validate().is_err());

        let zero_budget = DecompositionOptions::default().with_max_iterations_per_eigenvalue(0);
        assert!(zero_budget.validate().is_err());

        let zero_tolerance = DecompositionOptions::default().with_ql_tolerance(0.0);
        assert!(zero_tolerance.validate().is_err());
    }
}
