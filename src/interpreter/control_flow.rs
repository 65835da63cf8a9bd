// File: src/interpreter/control_flow.rs
//
// Control flow signal for early returns.
//
// Executing a statement yields a Flow. A `return` anywhere inside a function
// body (including inside nested if/while/for blocks) produces Flow::Return,
// which every enclosing block propagates until the function call consumes it.

use super::value::Value;

/// Outcome of executing a statement or block
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    /// Keep going with the next statement
    Normal,
    /// `return` was executed; unwind to the nearest function call
    Return(Value),
}
