use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a floating-point failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticFault {
    /// Argument outside the function's domain, NaN result, or division by zero.
    #[error("domain error: argument not in valid range")]
    Domain,
    /// Result too large to represent.
    #[error("floating-point value too large to represent")]
    Overflow,
    /// Result collapsed to zero from a non-zero input.
    #[error("floating-point value too small to represent")]
    Underflow,
    /// Non-finite result that fits none of the above.
    #[error("unknown floating-point error")]
    Unknown,
}

/// Coarse error category, for hosts that only branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Dimension,
    Lookup,
    Arithmetic,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Dimension => write!(f, "dimension"),
            Self::Lookup => write!(f, "lookup"),
            Self::Arithmetic => write!(f, "arithmetic"),
        }
    }
}

/// A structured evaluation error.
///
/// The evaluator only classifies; rendering a message for the user is the
/// host's job. The `Display` impls are terse defaults.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EvalError {
    /// Unexpected or missing token, unmatched parentheses, bad literal.
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// Binary operator between vectors of different lengths.
    #[error("vectors are different lengths ({lhs_len} and {rhs_len})")]
    DimensionMismatch { lhs_len: usize, rhs_len: usize },

    /// Call syntax `name(...)` naming neither a builtin nor a host vector.
    #[error("unknown function \"{name}\"")]
    UnknownFunction { name: String },

    /// Reference to a vector the host does not know.
    #[error("no such vector \"{name}\"")]
    UnknownVariable { name: String },

    /// Character or token that is not a binary operator in operator position.
    #[error("unknown operator \"{op}\"")]
    UnknownOperator { op: String },

    /// Floating-point failure.
    #[error("{0}")]
    Arithmetic(#[from] ArithmeticFault),
}

impl EvalError {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create a dimension-mismatch error.
    pub fn dimension(lhs_len: usize, rhs_len: usize) -> Self {
        Self::DimensionMismatch { lhs_len, rhs_len }
    }

    /// Create an unknown-function error.
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    /// Create an unknown-variable error.
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable { name: name.into() }
    }

    /// Create an unknown-operator error.
    pub fn unknown_operator(op: impl Into<String>) -> Self {
        Self::UnknownOperator { op: op.into() }
    }

    /// Get the category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } | Self::UnknownOperator { .. } => ErrorCategory::Syntax,
            Self::DimensionMismatch { .. } => ErrorCategory::Dimension,
            Self::UnknownFunction { .. } | Self::UnknownVariable { .. } => ErrorCategory::Lookup,
            Self::Arithmetic(_) => ErrorCategory::Arithmetic,
        }
    }

    /// The arithmetic fault, if this is an arithmetic error.
    pub fn fault(&self) -> Option<ArithmeticFault> {
        match self {
            Self::Arithmetic(fault) => Some(*fault),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(EvalError::syntax("x").category(), ErrorCategory::Syntax);
        assert_eq!(
            EvalError::unknown_operator("@").category(),
            ErrorCategory::Syntax
        );
        assert_eq!(EvalError::dimension(3, 2).category(), ErrorCategory::Dimension);
        assert_eq!(
            EvalError::unknown_function("f").category(),
            ErrorCategory::Lookup
        );
        assert_eq!(
            EvalError::unknown_variable("v").category(),
            ErrorCategory::Lookup
        );
        assert_eq!(
            EvalError::from(ArithmeticFault::Overflow).category(),
            ErrorCategory::Arithmetic
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            EvalError::dimension(3, 2).to_string(),
            "vectors are different lengths (3 and 2)"
        );
        assert_eq!(
            EvalError::unknown_variable("x").to_string(),
            "no such vector \"x\""
        );
        assert_eq!(
            EvalError::syntax("unmatched parentheses").to_string(),
            "syntax error: unmatched parentheses"
        );
        assert_eq!(
            EvalError::Arithmetic(ArithmeticFault::Domain).to_string(),
            "domain error: argument not in valid range"
        );
    }

    #[test]
    fn test_fault_accessor() {
        assert_eq!(
            EvalError::Arithmetic(ArithmeticFault::Underflow).fault(),
            Some(ArithmeticFault::Underflow)
        );
        assert_eq!(EvalError::syntax("x").fault(), None);
    }

    #[test]
    fn test_error_json_serialization() {
        let json = serde_json::to_string(&EvalError::dimension(3, 2)).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"dimension_mismatch","detail":{"lhs_len":3,"rhs_len":2}}"#
        );

        let json = serde_json::to_string(&EvalError::Arithmetic(ArithmeticFault::Domain)).unwrap();
        assert_eq!(json, r#"{"kind":"arithmetic","detail":"domain"}"#);

        let back: EvalError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EvalError::Arithmetic(ArithmeticFault::Domain));
    }

    #[test]
    fn test_error_determinism_100_iterations() {
        let first = serde_json::to_string(&EvalError::unknown_function("frob")).unwrap();
        for i in 0..100 {
            let json = serde_json::to_string(&EvalError::unknown_function("frob")).unwrap();
            assert_eq!(first, json, "Determinism failure at iteration {i}");
        }
    }
}
