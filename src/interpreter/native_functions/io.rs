// File: src/interpreter/native_functions/io.rs
//
// I/O-related native functions (fire, load)

use super::expect_arity;
use crate::errors::{ArsonError, Result};
use crate::interpreter::{Interpreter, Value};

/// Handle I/O-related function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(
    interp: &mut Interpreter,
    name: &str,
    arg_values: &[Value],
) -> Option<Result<Value>> {
    let result = match name {
        "fire" => {
            let output_parts: Vec<String> = arg_values.iter().map(Value::to_string).collect();
            interp.write_output(&output_parts.join(" ")).map(|_| Value::Null)
        }
        "load" => load(interp, arg_values),
        _ => return None,
    };
    Some(result)
}

fn load(interp: &mut Interpreter, arg_values: &[Value]) -> Result<Value> {
    expect_arity("load", arg_values, 1)?;
    let prompt = match &arg_values[0] {
        Value::Str(s) => s.to_string(),
        other => {
            return Err(ArsonError::type_error(format!(
                "load() prompt must be a string, not {}",
                other.type_name()
            )))
        }
    };
    interp.write_prompt(&prompt)?;
    let line = interp.read_line()?;
    Ok(Value::str(&line))
}
