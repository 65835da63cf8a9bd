// File: src/interpreter/environment.rs
//
// Lexical scoping environment for variable management in the Arson interpreter.
// Implements a stack of scopes where inner scopes shadow outer scopes, sitting
// on an optional frozen parent environment.
//
// Closures capture by value: when a function is defined, the interpreter takes
// a snapshot of every visible binding. The parent of a snapshot is itself
// frozen, so only the live scopes are copied; later rebindings in the defining
// scope are not seen by the function, while containers inside the snapshot
// still share their storage with the originals.

use super::value::Value;
use std::collections::HashMap;
use std::iter;
use std::rc::Rc;

/// Variable storage using lexical scoping
///
/// Lookups search from the innermost scope (end of the Vec) outward, then
/// continue through the frozen parent chain.
///
/// # Examples
///
/// ```ignore
/// let mut env = Environment::new();
/// env.define("x".to_string(), Value::Number(10.0));
///
/// let mut call = Environment::enclosed(env.snapshot());
/// call.define("x".to_string(), Value::Number(20.0));
/// assert_eq!(call.get("x"), Some(Value::Number(20.0)));
/// assert_eq!(env.get("x"), Some(Value::Number(10.0)));
/// ```
#[derive(Clone, Debug)]
pub struct Environment {
    pub scopes: Vec<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Create a new environment with a single global scope
    pub fn new() -> Self {
        Environment { scopes: vec![HashMap::new()], parent: None }
    }

    /// A single fresh scope on top of a frozen environment (entering a function)
    pub fn enclosed(parent: Rc<Environment>) -> Self {
        Environment { scopes: vec![HashMap::new()], parent: Some(parent) }
    }

    fn chain(&self) -> impl Iterator<Item = &Environment> {
        iter::successors(Some(self), |env| env.parent.as_deref())
    }

    /// Get a variable, searching from inner to outer scopes
    pub fn get(&self, name: &str) -> Option<Value> {
        self.chain()
            .flat_map(|env| env.scopes.iter().rev())
            .find_map(|scope| scope.get(name).cloned())
    }

    /// Define (or rebind) a variable in the current (innermost) scope
    pub fn define(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Frozen copy of every visible binding, used as a closure's environment.
    pub fn snapshot(&self) -> Rc<Environment> {
        Rc::new(self.clone())
    }

    /// All visible names, innermost first. Used for "did you mean" suggestions.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chain()
            .flat_map(|env| env.scopes.iter().rev())
            .flat_map(|scope| scope.keys().map(String::as_str))
    }

    fn release_into(&mut self, values: &mut Vec<Value>, parents: &mut Vec<Rc<Environment>>) {
        for scope in self.scopes.drain(..) {
            values.extend(scope.into_values());
        }
        if let Some(parent) = self.parent.take() {
            parents.push(parent);
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// A closure rebound in a loop captures its predecessor, so environments can
// nest as deep as the loop ran. Unlink them with a work-list instead of
// letting the default drop recurse once per level.
impl Drop for Environment {
    fn drop(&mut self) {
        let mut values = Vec::new();
        let mut parents = Vec::new();
        self.release_into(&mut values, &mut parents);
        loop {
            if let Some(value) = values.pop() {
                value.release_into(&mut values, &mut parents);
            } else if let Some(parent) = parents.pop() {
                if let Ok(mut parent) = Rc::try_unwrap(parent) {
                    parent.release_into(&mut values, &mut parents);
                }
            } else {
                break;
            }
        }
    }
}
