// File: src/interpreter/containers.rs
//
// Builtin container types (Array and Dict) and the attribute protocol they share.
//
// Containers are reference-like: cloning an `Array` or `Dict` value clones the
// handle, not the storage, so every binding that holds the same container sees
// its mutations. Element access and methods are resolved through the
// `AttributeResolvable` capability; a method name resolves to a `BoundMethod`
// that remembers its receiver and can be invoked later.

use super::native_functions::expect_arity;
use super::value::Value;
use crate::errors::{ArsonError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Array {}
    impl Sealed for super::Dict {}
}

/// Uniform "property or callable" resolution for builtin containers.
pub trait AttributeResolvable: sealed::Sealed {
    fn type_name(&self) -> &'static str;

    /// Method names this container answers to.
    fn method_names(&self) -> &'static [&'static str];

    /// `container[key]`
    fn get_index(&self, key: &Value) -> Result<Value>;

    /// Runs a method against this container.
    fn invoke_method(&self, method: &str, args: &[Value]) -> Result<Value>;

    /// `container.name` - resolves a method name to a callable bound to this receiver.
    fn get_named(&self, name: &str) -> Result<&'static str> {
        self.method_names()
            .iter()
            .find(|m| **m == name)
            .copied()
            .ok_or_else(|| {
                ArsonError::type_error(format!(
                    "'{}' has no attribute '{}'",
                    self.type_name(),
                    name
                ))
            })
    }
}

/// Converts an index value to a position inside `len`, truncating toward zero.
fn to_position(key: &Value, len: usize) -> Result<usize> {
    let raw = match key {
        Value::Number(n) => n.trunc(),
        other => {
            return Err(ArsonError::type_error(format!(
                "Array indices must be numbers, not {}",
                other.type_name()
            )))
        }
    };
    if raw < 0.0 || raw >= len as f64 {
        return Err(ArsonError::index_error(format!(
            "Array index {} out of range for length {}",
            raw, len
        )));
    }
    Ok(raw as usize)
}

/// Ordered, resizable, shared sequence of values
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    pub fn new(items: Vec<Value>) -> Self {
        Array(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Copies the current elements out of the shared storage.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared storage, stable while any handle is alive.
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// The elements, if this is the last handle to the storage.
    pub(crate) fn into_unique_items(self) -> Vec<Value> {
        Rc::try_unwrap(self.0).map(RefCell::into_inner).unwrap_or_default()
    }
}

impl AttributeResolvable for Array {
    fn type_name(&self) -> &'static str {
        "array"
    }

    fn method_names(&self) -> &'static [&'static str] {
        &["length", "push", "pop", "update"]
    }

    fn get_index(&self, key: &Value) -> Result<Value> {
        let items = self.0.borrow();
        let position = to_position(key, items.len())?;
        Ok(items[position].clone())
    }

    fn invoke_method(&self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            "length" => {
                expect_arity(method, args, 0)?;
                Ok(Value::Number(self.len() as f64))
            }
            "push" => {
                expect_arity(method, args, 1)?;
                self.push(args[0].clone());
                Ok(Value::Null)
            }
            "pop" => {
                expect_arity(method, args, 0)?;
                self.0
                    .borrow_mut()
                    .pop()
                    .ok_or_else(|| ArsonError::index_error("pop from empty array"))
            }
            "update" => {
                expect_arity(method, args, 2)?;
                let mut items = self.0.borrow_mut();
                let position = to_position(&args[0], items.len())?;
                items[position] = args[1].clone();
                Ok(Value::Null)
            }
            _ => self.get_named(method).map(|_| Value::Null),
        }
    }
}

/// Shared mapping from string keys to values
#[derive(Clone, Default)]
pub struct Dict(Rc<RefCell<HashMap<String, Value>>>);

impl Dict {
    pub fn new(entries: HashMap<String, Value>) -> Self {
        Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: String, value: Value) {
        self.0.borrow_mut().insert(key, value);
    }

    /// Entries sorted by key.
    pub fn sorted_entries(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> =
            self.0.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// The stored values, if this is the last handle to the storage.
    pub(crate) fn into_unique_values(self) -> Vec<Value> {
        match Rc::try_unwrap(self.0) {
            Ok(entries) => entries.into_inner().into_values().collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn string_key<'a>(method: &str, key: &'a Value) -> Result<&'a str> {
    match key {
        Value::Str(s) => Ok(&**s),
        other => Err(ArsonError::type_error(format!(
            "{}: dict keys must be strings, not {}",
            method,
            other.type_name()
        ))),
    }
}

impl AttributeResolvable for Dict {
    fn type_name(&self) -> &'static str {
        "dict"
    }

    fn method_names(&self) -> &'static [&'static str] {
        &["update", "length", "keys", "has"]
    }

    fn get_index(&self, key: &Value) -> Result<Value> {
        let key = string_key("lookup", key)?;
        self.get(key).ok_or_else(|| ArsonError::missing_key(key))
    }

    fn invoke_method(&self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            "update" => {
                expect_arity(method, args, 2)?;
                let key = string_key(method, &args[0])?;
                self.insert(key.to_string(), args[1].clone());
                Ok(Value::Null)
            }
            "length" => {
                expect_arity(method, args, 0)?;
                Ok(Value::Number(self.len() as f64))
            }
            "keys" => {
                expect_arity(method, args, 0)?;
                let keys = self.sorted_entries().into_iter().map(|(k, _)| Value::str(&k)).collect();
                Ok(Value::Array(Array::new(keys)))
            }
            "has" => {
                expect_arity(method, args, 1)?;
                let key = string_key(method, &args[0])?;
                Ok(Value::Bool(self.0.borrow().contains_key(key)))
            }
            _ => self.get_named(method).map(|_| Value::Null),
        }
    }
}

/// A container that methods can be bound to.
#[derive(Clone)]
pub enum Receiver {
    Array(Array),
    Dict(Dict),
}

impl Receiver {
    pub fn as_resolvable(&self) -> &dyn AttributeResolvable {
        match self {
            Receiver::Array(array) => array,
            Receiver::Dict(dict) => dict,
        }
    }
}

/// A method resolved from a container, waiting to be called.
#[derive(Clone)]
pub struct BoundMethod {
    pub receiver: Receiver,
    pub name: &'static str,
}

impl BoundMethod {
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        self.receiver.as_resolvable().invoke_method(self.name, args)
    }
}
