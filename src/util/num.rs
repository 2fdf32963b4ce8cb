use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Converts a number to a list index.
///
/// The value must be finite and non-negative; the fractional part is
/// truncated, matching the cast the language applies everywhere a number is
/// used integrally. Bounds against the list length are the caller's job.
///
/// ## Errors
/// Returns a type error for negative, NaN, or infinite values.
///
/// ## Example
/// ```
/// use adascript::util::num::f64_to_index;
///
/// assert_eq!(f64_to_index(2.0, 1).unwrap(), 2);
/// assert_eq!(f64_to_index(2.9, 1).unwrap(), 2);
/// assert!(f64_to_index(-1.0, 1).is_err());
/// ```
pub fn f64_to_index(value: f64, line: usize) -> EvalResult<usize> {
    if !value.is_finite() || value < 0.0 {
        return Err(RuntimeError::TypeError { details: format!("list index must be a non-negative number, got {value}"),
                                             line });
    }
    Ok(value as usize)
}

/// Converts a number to an `i64` by truncating toward zero.
///
/// Used by `range` bounds and the `int` cast. Values beyond the exact
/// integer range of a double were already imprecise before the conversion;
/// only non-finite values are rejected.
///
/// ## Errors
/// Returns a type error for NaN or infinite values.
///
/// ## Example
/// ```
/// use adascript::util::num::f64_to_i64;
///
/// assert_eq!(f64_to_i64(5.0, 1).unwrap(), 5);
/// assert_eq!(f64_to_i64(-2.7, 1).unwrap(), -2);
/// assert!(f64_to_i64(f64::NAN, 1).is_err());
/// ```
pub fn f64_to_i64(value: f64, line: usize) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::TypeError { details: format!("expected a finite number, got {value}"),
                                             line });
    }
    Ok(value as i64)
}
