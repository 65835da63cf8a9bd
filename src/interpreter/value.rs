// File: src/interpreter/value.rs
//
// Runtime value types for the Arson programming language.
// Defines all value types that can be represented and manipulated at runtime,
// their display form, truthiness and structural equality.

use super::containers::{Array, AttributeResolvable, BoundMethod, Dict, Receiver};
use super::ensure_sufficient_stack;
use super::environment::Environment;
use crate::ast::Stmt;
use crate::errors::{ArsonError, Result};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A user-defined function together with the environment it closed over.
pub struct Function {
    /// `None` for anonymous functions
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<[Stmt]>,
    /// Snapshot of the defining scope stack, taken when the function was created
    pub closure: Rc<Environment>,
}

/// Runtime values
#[derive(Clone)]
pub enum Value {
    /// Every number is a 64-bit float
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    Array(Array),
    Dict(Dict),
    Function(Rc<Function>),
    /// Builtin function by name
    NativeFunction(&'static str),
    /// A container method resolved from `container.name`
    Method(BoundMethod),
    /// The absence of a value
    Null,
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Array::new(items))
    }

    pub fn dict(entries: HashMap<String, Value>) -> Self {
        Value::Dict(Dict::new(entries))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::NativeFunction(_) => "builtin",
            Value::Method(_) => "method",
            Value::Null => "null",
        }
    }

    /// `false`, `0`, `""`, empty containers and null are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Array(array) => !array.is_empty(),
            Value::Dict(dict) => !dict.is_empty(),
            Value::Null => false,
            Value::Function(_) | Value::NativeFunction(_) | Value::Method(_) => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::NativeFunction(_) | Value::Method(_))
    }

    fn as_resolvable(&self) -> Option<&dyn AttributeResolvable> {
        match self {
            Value::Array(array) => Some(array),
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// `value[key]`
    pub fn index(&self, key: &Value) -> Result<Value> {
        match self.as_resolvable() {
            Some(container) => container.get_index(key),
            None => Err(ArsonError::type_error(format!(
                "'{}' value is not indexable",
                self.type_name()
            ))),
        }
    }

    /// `value.name` - only containers have attributes, and they are all methods.
    pub fn attribute(&self, name: &str) -> Result<Value> {
        let receiver = match self {
            Value::Array(array) => Receiver::Array(array.clone()),
            Value::Dict(dict) => Receiver::Dict(dict.clone()),
            other => {
                return Err(ArsonError::type_error(format!(
                    "'{}' has no attribute '{}'",
                    other.type_name(),
                    name
                )))
            }
        };
        let name = receiver.as_resolvable().get_named(name)?;
        Ok(Value::Method(BoundMethod { receiver, name }))
    }

    /// Hands the values and environments this value exclusively owns to the
    /// caller, so a long chain can be torn down without recursion.
    pub(crate) fn release_into(self, values: &mut Vec<Value>, parents: &mut Vec<Rc<Environment>>) {
        match self {
            Value::Function(function) => {
                if let Ok(function) = Rc::try_unwrap(function) {
                    parents.push(function.closure);
                }
            }
            Value::Array(array) => values.extend(array.into_unique_items()),
            Value::Dict(dict) => values.extend(dict.into_unique_values()),
            Value::Method(method) => match method.receiver {
                Receiver::Array(array) => values.push(Value::Array(array)),
                Receiver::Dict(dict) => values.push(Value::Dict(dict)),
            },
            _ => {}
        }
    }

    /// Structural equality. `open` holds the container pairs currently being
    /// compared; meeting one again means the two cycles line up.
    fn equals(&self, other: &Value, open: &mut Vec<(usize, usize)>) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => {
                let pair = (a.id(), b.id());
                if a.ptr_eq(b) || open.contains(&pair) {
                    return true;
                }
                let (left, right) = (a.items(), b.items());
                open.push(pair);
                let equal = left.len() == right.len()
                    && left
                        .iter()
                        .zip(&right)
                        .all(|(x, y)| ensure_sufficient_stack(|| x.equals(y, open)));
                open.pop();
                equal
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let pair = (a.id(), b.id());
                if a.ptr_eq(b) || open.contains(&pair) {
                    return true;
                }
                let (left, right) = (a.sorted_entries(), b.sorted_entries());
                open.push(pair);
                let equal = left.len() == right.len()
                    && left
                        .iter()
                        .zip(&right)
                        .all(|((ka, va), (kb, vb))| {
                            ka == kb && ensure_sufficient_stack(|| va.equals(vb, open))
                        });
                open.pop();
                equal
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => {
                a.name == b.name
                    && match (&a.receiver, &b.receiver) {
                        (Receiver::Array(x), Receiver::Array(y)) => x.ptr_eq(y),
                        (Receiver::Dict(x), Receiver::Dict(y)) => x.ptr_eq(y),
                        _ => false,
                    }
            }
            _ => false,
        }
    }

    /// Writes containers element by element. `open` holds the containers
    /// currently being written; one that contains itself prints `[...]` or `{...}`.
    fn write_nested(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<usize>, debug: bool) -> fmt::Result {
        match self {
            Value::Array(array) => {
                if open.contains(&array.id()) {
                    return f.write_str("[...]");
                }
                open.push(array.id());
                f.write_str("[")?;
                for (i, item) in array.items().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    ensure_sufficient_stack(|| item.write_nested(f, open, debug))?;
                }
                open.pop();
                f.write_str("]")
            }
            Value::Dict(dict) => {
                if open.contains(&dict.id()) {
                    return f.write_str("{...}");
                }
                open.push(dict.id());
                f.write_str("{")?;
                for (i, (key, value)) in dict.sorted_entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": ", key)?;
                    ensure_sufficient_stack(|| value.write_nested(f, open, debug))?;
                }
                open.pop();
                f.write_str("}")
            }
            scalar if debug => fmt::Debug::fmt(scalar, f),
            scalar => fmt::Display::fmt(scalar, f),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, &mut Vec::new())
    }
}

/// Display form used by `fire` and `str`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display already drops the fraction of integral values (7.0 -> "7")
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
            Value::Array(_) | Value::Dict(_) => self.write_nested(f, &mut Vec::new(), false),
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "<function {}>", name),
                None => f.write_str("<function>"),
            },
            Value::NativeFunction(name) => write!(f, "<builtin {}>", name),
            Value::Method(method) => write!(f, "<method {}>", method.name),
        }
    }
}

// Manual Debug implementation: functions would otherwise print their whole closure
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Str(s) => write!(f, "Str({:?})", s.as_ref()),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Null => write!(f, "Null"),
            Value::Array(_) | Value::Dict(_) => self.write_nested(f, &mut Vec::new(), true),
            Value::Function(func) => write!(
                f,
                "Function({}, {:?}, {} stmts)",
                func.name.as_deref().unwrap_or("<lambda>"),
                func.params,
                func.body.len()
            ),
            Value::NativeFunction(name) => write!(f, "NativeFunction({})", name),
            Value::Method(method) => write!(f, "Method({})", method.name),
        }
    }
}
