// File: src/interpreter/operators.rs
//
// Binary operator semantics for evaluated operands.
//
// `and`, `or` and `=` need unevaluated operands and are handled by the
// evaluator itself; everything else lands here once both sides are values.

use super::value::Value;
use crate::ast::BinaryOp;
use crate::errors::{ArsonError, Result};

pub(crate) fn apply(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right)
        }
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            compare(op, left, right)
        }
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::Assign | BinaryOp::And | BinaryOp::Or => Err(ArsonError::type_error(format!(
            "Operator '{}' cannot be applied to evaluated operands",
            op
        ))),
    }
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> ArsonError {
    ArsonError::type_error(format!(
        "Unsupported operand types for {}: '{}' and '{}'",
        op,
        left.type_name(),
        right.type_name()
    ))
}

fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::str(&format!("{}{}", a, b))),
        (Value::Array(a), Value::Array(b)) => {
            let mut items = a.items();
            items.extend(b.items());
            Ok(Value::array(items))
        }
        _ => Err(unsupported(BinaryOp::Add, left, right)),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let (a, b) = match (left, right) {
        (Value::Number(a), Value::Number(b)) => (*a, *b),
        _ => return Err(unsupported(op, left, right)),
    };
    let result = match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Err(ArsonError::value_error("Division by zero")),
        BinaryOp::Div => a / b,
        BinaryOp::Mod if b == 0.0 => return Err(ArsonError::value_error("Modulo by zero")),
        BinaryOp::Mod => a % b,
        _ => return Err(unsupported(op, left, right)),
    };
    Ok(Value::Number(result))
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => return Err(unsupported(op, left, right)),
    };
    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessEqual => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Value::Bool(result))
}
