//! Binary and unary operator dispatch over vectors.
//!
//! `combine` takes both operands by value and hands back one of their
//! buffers, so results are computed in place without aliasing.

use vexpr_lexer::Operator;
use vexpr_types::{ArithmeticFault, EvalError, EvalResult, Vector};

use crate::classify::{check, check_nonvanishing, FloatResult};

/// Combine `left` and `right` with a binary operator.
///
/// - A length-1 `right` is applied to every element of `left`.
/// - Otherwise a length-1 `left` is applied to every element of `right`,
///   keeping the operand order (`s - v[i]`, not `v[i] - s`).
/// - Otherwise the lengths must agree and elements combine pairwise.
///
/// `<<` and `>>` rotate `left` and require a scalar `right`.
pub fn combine(op: Operator, left: Vector, right: Vector) -> EvalResult<Vector> {
    log::trace!("combine {op}: {} x {}", left.len(), right.len());

    match op {
        Operator::ShiftLeft | Operator::ShiftRight => return rotate(op, left, &right),
        Operator::Not => return Err(EvalError::unknown_operator(op.symbol())),
        _ => {}
    }

    if let Some(s) = scalar_value(&right) {
        let mut left = left;
        for x in left.active_mut() {
            *x = apply(op, *x, s)?;
        }
        Ok(left)
    } else if let Some(s) = scalar_value(&left) {
        let mut out = right;
        for x in out.active_mut() {
            *x = apply(op, s, *x)?;
        }
        Ok(out)
    } else if left.len() != right.len() {
        Err(EvalError::dimension(left.len(), right.len()))
    } else {
        let mut left = left;
        for (x, &y) in left.active_mut().iter_mut().zip(right.active()) {
            *x = apply(op, *x, y)?;
        }
        Ok(left)
    }
}

/// Apply a prefix operator to every element in place.
pub fn apply_unary(op: Operator, mut operand: Vector) -> EvalResult<Vector> {
    match op {
        Operator::Sub => {
            for x in operand.active_mut() {
                *x = -*x;
            }
        }
        Operator::Not => {
            for x in operand.active_mut() {
                *x = truth(*x == 0.0);
            }
        }
        other => return Err(EvalError::unknown_operator(other.symbol())),
    }
    Ok(operand)
}

fn scalar_value(v: &Vector) -> Option<f64> {
    if v.is_scalar() {
        v.get(0)
    } else {
        None
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// One element-level application of a binary operator.
fn apply(op: Operator, a: f64, b: f64) -> FloatResult {
    let finite = a.is_finite() && b.is_finite();
    match op {
        Operator::Add => check(a + b, finite),
        Operator::Sub => check(a - b, finite),
        Operator::Mul => check_nonvanishing(a * b, a != 0.0 && b != 0.0 && finite, finite),
        Operator::Div => {
            if b == 0.0 {
                return Err(ArithmeticFault::Domain);
            }
            check_nonvanishing(a / b, a != 0.0 && finite, finite)
        }
        Operator::Mod => {
            if b == 0.0 {
                return Err(ArithmeticFault::Domain);
            }
            check(a % b, finite)
        }
        Operator::Pow => check_nonvanishing(a.powf(b), a != 0.0 && finite, finite),
        Operator::Eq => Ok(truth(a == b)),
        Operator::NotEq => Ok(truth(a != b)),
        Operator::Less => Ok(truth(a < b)),
        Operator::Greater => Ok(truth(a > b)),
        Operator::LessEq => Ok(truth(a <= b)),
        Operator::GreaterEq => Ok(truth(a >= b)),
        Operator::And => Ok(truth(a != 0.0 && b != 0.0)),
        Operator::Or => Ok(truth(a != 0.0 || b != 0.0)),
        // Rotations and `!` never reach element level.
        Operator::ShiftLeft | Operator::ShiftRight | Operator::Not => Err(ArithmeticFault::Unknown),
    }
}

/// Rotate the active window of `left` by the scalar in `right`.
fn rotate(op: Operator, mut left: Vector, right: &Vector) -> EvalResult<Vector> {
    let count = scalar_value(right)
        .ok_or_else(|| EvalError::syntax("second shift operand must be scalar"))?;
    if !count.is_finite() {
        return Err(ArithmeticFault::Domain.into());
    }
    let len = left.len();
    if len == 0 {
        return Ok(left);
    }
    // `as` saturates, and the remainder keeps huge counts in range.
    let shift = (count.trunc() as i64).rem_euclid(len as i64) as usize;
    match op {
        Operator::ShiftLeft => left.active_mut().rotate_left(shift),
        _ => left.active_mut().rotate_right(shift),
    }
    Ok(left)
}
