//! Evaluation options.

use serde::{Deserialize, Serialize};

/// Default bound on nesting (parentheses, unary operators, calls).
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Knobs for a single [`Evaluator`](crate::Evaluator).
///
/// Deserializes from a partial JSON object; absent fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Maximum nesting depth before evaluation fails with a syntax error.
    pub max_depth: u32,
    /// Seed for `random()`. `None` draws from system entropy.
    pub random_seed: Option<u64>,
    /// Classify every element of the final result.
    pub final_sweep: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            random_seed: None,
            final_sweep: true,
        }
    }
}

impl EvalOptions {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_final_sweep(mut self, final_sweep: bool) -> Self {
        self.final_sweep = final_sweep;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = EvalOptions::default();
        assert_eq!(opts.max_depth, 64);
        assert_eq!(opts.random_seed, None);
        assert!(opts.final_sweep);
    }

    #[test]
    fn test_builders() {
        let opts = EvalOptions::default()
            .with_max_depth(8)
            .with_random_seed(42)
            .with_final_sweep(false);
        assert_eq!(opts.max_depth, 8);
        assert_eq!(opts.random_seed, Some(42));
        assert!(!opts.final_sweep);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let opts: EvalOptions = serde_json::from_str(r#"{"random_seed": 9}"#).unwrap();
        assert_eq!(opts, EvalOptions::default().with_random_seed(9));

        let opts: EvalOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, EvalOptions::default());
    }
}
