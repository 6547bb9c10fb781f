//! Floating-point error classification.
//!
//! Every native computation is wrapped at the point of use: the result is
//! inspected immediately and turned into an [`ArithmeticFault`] instead of
//! being accepted. There is no ambient error state to consult later.

use vexpr_types::ArithmeticFault;

/// Result of a checked floating-point computation.
pub type FloatResult = Result<f64, ArithmeticFault>;

/// Classify `result`.
///
/// - NaN is a domain error.
/// - An infinity computed from finite inputs is an overflow; one computed
///   from inputs that were already infinite cannot be attributed and is
///   reported as unknown.
pub fn check(result: f64, inputs_finite: bool) -> FloatResult {
    if result.is_nan() {
        Err(ArithmeticFault::Domain)
    } else if result.is_infinite() {
        if inputs_finite {
            Err(ArithmeticFault::Overflow)
        } else {
            Err(ArithmeticFault::Unknown)
        }
    } else {
        Ok(result)
    }
}

/// Like [`check`], for operations that cannot produce zero from the given
/// inputs: a zero or subnormal result while `nonvanishing` holds is an
/// underflow.
pub fn check_nonvanishing(result: f64, nonvanishing: bool, inputs_finite: bool) -> FloatResult {
    let result = check(result, inputs_finite)?;
    if nonvanishing && (result == 0.0 || result.is_subnormal()) {
        Err(ArithmeticFault::Underflow)
    } else {
        Ok(result)
    }
}

/// Apply a one-argument libm function and classify its result.
pub fn unary(f: fn(f64) -> f64, x: f64) -> FloatResult {
    check(f(x), x.is_finite())
}

/// Final sweep over a computed result: every element must be finite.
pub fn sweep(values: &[f64]) -> Result<(), ArithmeticFault> {
    for &x in values {
        check(x, true)?;
    }
    Ok(())
}
