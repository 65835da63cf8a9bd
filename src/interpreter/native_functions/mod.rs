// File: src/interpreter/native_functions/mod.rs
//
// Native (built-in) function implementations, split into category modules.
// Each category exposes a `handle` function that returns `None` for names it
// does not own, so the dispatcher can try the categories in turn.

pub mod io;
pub mod math;
pub mod type_ops;

use super::{Interpreter, Value};
use crate::errors::{ArsonError, Result};

/// Main dispatcher that routes native function calls to appropriate category modules
pub fn call_native_function(
    interp: &mut Interpreter,
    name: &str,
    arg_values: &[Value],
) -> Result<Value> {
    if let Some(result) = io::handle(interp, name, arg_values) {
        return result;
    }
    if let Some(result) = math::handle(name, arg_values) {
        return result;
    }
    if let Some(result) = type_ops::handle(name, arg_values) {
        return result;
    }

    Err(ArsonError::type_error(format!("Unknown native function: {}", name)))
}

/// Fails with a TypeError unless exactly `count` arguments were passed.
pub(crate) fn expect_arity(name: &str, arg_values: &[Value], count: usize) -> Result<()> {
    if arg_values.len() != count {
        return Err(ArsonError::type_error(format!(
            "{}() takes {} argument{} but {} were given",
            name,
            count,
            if count == 1 { "" } else { "s" },
            arg_values.len()
        )));
    }
    Ok(())
}
