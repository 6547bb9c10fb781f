//! vexpr evaluator: numeric vector expressions evaluated in a single pass.
//!
//! An expression such as `sum(x * 2) / length(x)` is tokenized on demand,
//! parsed by precedence climbing and computed as it is parsed. Operands
//! are [`Vector`]s; scalars are vectors of length one and broadcast
//! against the other operand.
//!
//! # Example
//!
//! ```
//! use vexpr_eval::evaluate;
//! use vexpr_types::MapResolver;
//!
//! let host = MapResolver::new().with("x", vec![1.0, 2.0, 3.0]);
//! let result = evaluate("x * 2 + 1", &host).unwrap();
//! assert_eq!(result.active(), &[3.0, 5.0, 7.0]);
//! ```

pub mod broadcast;
pub mod builtins;
pub mod classify;
pub mod evaluator;
pub mod options;
pub mod stats;

pub use builtins::{CallContext, FunctionDescriptor, FunctionKind, FunctionRegistry};
pub use evaluator::Evaluator;
pub use options::{EvalOptions, DEFAULT_MAX_DEPTH};

use vexpr_types::{EvalResult, VariableResolver, Vector};

/// Evaluate `expression` with default options and the builtin registry.
pub fn evaluate(expression: &str, bindings: &dyn VariableResolver) -> EvalResult<Vector> {
    Evaluator::default().evaluate(expression, bindings)
}
