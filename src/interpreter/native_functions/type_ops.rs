// File: src/interpreter/native_functions/type_ops.rs
//
// Type conversion functions

use super::expect_arity;
use crate::builtins;
use crate::errors::{ArsonError, Result};
use crate::interpreter::Value;

pub fn handle(name: &str, arg_values: &[Value]) -> Option<Result<Value>> {
    let result = match name {
        "int" | "float" | "str" | "bool" => {
            expect_arity(name, arg_values, 1).and_then(|_| convert(name, &arg_values[0]))
        }
        _ => return None,
    };
    Some(result)
}

fn convert(name: &str, value: &Value) -> Result<Value> {
    match name {
        "int" => to_int(value),
        "float" => to_float(value),
        "str" => Ok(Value::str(&value.to_string())),
        _ => Ok(Value::Bool(value.is_truthy())),
    }
}

/// Truncates toward zero. The result stays a float, so integers of any
/// magnitude survive; only NaN and infinities have no integer form.
fn to_int(value: &Value) -> Result<Value> {
    let n = match value {
        Value::Number(n) if n.is_finite() => n.trunc(),
        Value::Number(n) => {
            return Err(ArsonError::value_error(format!("Cannot convert {} to int", n)))
        }
        Value::Str(s) => builtins::parse_int(s)
            .ok_or_else(|| ArsonError::value_error(format!("Cannot convert '{}' to int", s)))?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        other => {
            return Err(ArsonError::type_error(format!(
                "Cannot convert {} to int",
                other.type_name()
            )))
        }
    };
    Ok(Value::Number(n))
}

fn to_float(value: &Value) -> Result<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Str(s) => builtins::parse_float(s)
            .map(Value::Number)
            .ok_or_else(|| ArsonError::value_error(format!("Cannot convert '{}' to float", s))),
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        other => Err(ArsonError::type_error(format!(
            "Cannot convert {} to float",
            other.type_name()
        ))),
    }
}
