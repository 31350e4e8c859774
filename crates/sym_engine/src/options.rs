//! Evaluation options for the rewrite engine.
//!
//! Options are plain values owned by the [`crate::Calculator`]; per-call
//! overrides go through [`crate::Calculator::reduce_with`].

/// Number domain controls how closed-form numeric special cases behave.
///
/// - `Real` (default): a fractional power of a negative rational with an even
///   root has no value and is reported as a domain error
/// - `Complex`: such powers reduce to multiples of the imaginary unit `I`
///   when the root is exact, and stay unevaluated otherwise
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NumberDomain {
    #[default]
    Real,
    Complex,
}

/// Budget for one `reduce` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Maximum number of full rewrite passes before giving up on reaching a
    /// fixed point. The partially reduced node is returned (with a warning).
    pub max_passes: usize,
    /// Only nodes at most this deep (root = 0) are rewritten.
    /// `None` means unlimited.
    pub max_depth: Option<usize>,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            max_passes: 128,
            max_depth: None,
        }
    }
}

impl ReduceOptions {
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Configuration of a [`crate::Calculator`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalculatorOptions {
    pub number_domain: NumberDomain,
    pub reduce: ReduceOptions,
}

impl CalculatorOptions {
    /// Real-only calculator with default budgets.
    pub fn real() -> Self {
        Self::default()
    }

    /// Complex-capable calculator with default budgets.
    pub fn complex() -> Self {
        Self::default().with_number_domain(NumberDomain::Complex)
    }

    pub fn with_number_domain(mut self, domain: NumberDomain) -> Self {
        self.number_domain = domain;
        self
    }

    pub fn with_reduce(mut self, reduce: ReduceOptions) -> Self {
        self.reduce = reduce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CalculatorOptions::default();
        assert_eq!(opts.number_domain, NumberDomain::Real);
        assert_eq!(opts.reduce.max_passes, 128);
        assert_eq!(opts.reduce.max_depth, None);
    }

    #[test]
    fn test_builders() {
        let opts = CalculatorOptions::complex()
            .with_reduce(ReduceOptions::default().with_max_passes(4).with_max_depth(2));
        assert_eq!(opts.number_domain, NumberDomain::Complex);
        assert_eq!(opts.reduce.max_passes, 4);
        assert_eq!(opts.reduce.max_depth, Some(2));
    }
}
