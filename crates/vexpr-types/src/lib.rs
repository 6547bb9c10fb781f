//! Shared types for the vexpr evaluator.
//!
//! This crate defines the [`Vector`] value model, the [`EvalError`]
//! taxonomy, and the [`VariableResolver`] boundary through which the
//! embedding host supplies named vectors.

mod error;
mod resolver;
mod vector;

pub use error::{ArithmeticFault, ErrorCategory, EvalError};
pub use resolver::{default_nested_literal, MapResolver, VariableResolver};
pub use vector::Vector;

/// Result type used throughout the vexpr crates.
pub type EvalResult<T> = std::result::Result<T, EvalError>;
