// File: src/interpreter/native_functions/math.rs
//
// Math-related native functions

use super::expect_arity;
use crate::builtins;
use crate::errors::{ArsonError, Result};
use crate::interpreter::Value;

/// Handle math-related function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(name: &str, arg_values: &[Value]) -> Option<Result<Value>> {
    let result = match name {
        "random" => random(arg_values),
        _ => return None,
    };
    Some(result)
}

fn bound(value: &Value, which: &str) -> Result<i64> {
    match value {
        Value::Number(n) => builtins::truncate(*n).ok_or_else(|| {
            ArsonError::value_error(format!("random() {} is out of integer range: {}", which, n))
        }),
        other => Err(ArsonError::type_error(format!(
            "random() {} must be a number, not {}",
            which,
            other.type_name()
        ))),
    }
}

/// `random(min, max)` - uniform integer in the inclusive range
fn random(arg_values: &[Value]) -> Result<Value> {
    expect_arity("random", arg_values, 2)?;
    let min = bound(&arg_values[0], "min")?;
    let max = bound(&arg_values[1], "max")?;
    if min > max {
        return Err(ArsonError::value_error(format!(
            "random() min ({}) is greater than max ({})",
            min, max
        )));
    }
    Ok(Value::Number(builtins::random_int(min, max) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_equal_bounds() {
        let value = random(&[Value::Number(3.0), Value::Number(3.0)]).unwrap();
        assert_eq!(value, Value::Number(3.0));
    }

    #[test]
    fn test_random_truncates_bounds() {
        for _ in 0..50 {
            let value = random(&[Value::Number(1.9), Value::Number(2.9)]).unwrap();
            assert!(value == Value::Number(1.0) || value == Value::Number(2.0));
        }
    }

    #[test]
    fn test_random_requires_numbers() {
        let err = random(&[Value::str("1"), Value::Number(2.0)]).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::TypeError);
    }

    #[test]
    fn test_random_rejects_bounds_beyond_integer_range() {
        let err = random(&[Value::Number(0.0), Value::Number(1e20)]).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::ValueError);
        assert!(err.message.contains("max is out of integer range"));
    }
}
