/// Outcome of the iterative part of a decomposition.
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    Converged,
    /// The sweep budget ran out. Eigenvalues that had not deflated yet are
    /// approximations read off the diagonal of the working matrix.
    MaxIterationsExceeded,
}

impl Convergence {
    pub fn is_converged(self) -> bool {
        self == Self::Converged
    }
}

/// Counts sweeps against a fixed limit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IterationBudget {
    limit: usize,
    used: usize,
}

impl IterationBudget {
    pub(crate) fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Spend one sweep. Returns `false` once the limit is reached.
    pub(crate) fn spend(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_stops_at_limit() {
        let mut budget = IterationBudget::new(2);
        assert!(budget.spend());
        assert!(budget.spend());
        assert!(!budget.spend());
        assert_eq!(budget.used(), 2);
    }
}
