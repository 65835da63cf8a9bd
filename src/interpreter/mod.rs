// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Arson programming language.
// Executes Arson programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter is the explicit runtime context: it owns the root
// environment, the builtin table, the output sink and the input source.
// It supports:
// - Variable binding and rebinding
// - Named functions and lambdas that capture their defining scope by value
// - Control flow (if/elif/else, while, for ... through, return)
// - Arrays and dicts with chained index, attribute and method access
//
// Runtime errors are ordinary `Err` values propagated with `?`; the language
// has no way to catch them, so the first one ends the program.

mod containers;
mod control_flow;
mod environment;
mod native_functions;
mod operators;
mod value;

pub use containers::{Array, AttributeResolvable, BoundMethod, Dict, Receiver};
pub use environment::Environment;
pub use value::{Function, Value};

use control_flow::Flow;

use crate::ast::{BinaryOp, Branch, Expr, Link, Stmt};
use crate::builtins;
use crate::errors::{find_closest_match, ArsonError, ErrorKind, Result};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Most user function calls that may be active at once.
pub const MAX_CALL_DEPTH: usize = 1000;

/// Main interpreter that executes Arson programs
pub struct Interpreter {
    pub env: Environment,
    builtins: HashMap<String, Value>,
    output: Option<Arc<Mutex<Vec<u8>>>>,
    input: Option<Box<dyn BufRead>>,
    call_stack: Vec<String>, // Track function calls for error reports
}

impl Interpreter {
    /// Creates a new interpreter with an empty environment
    pub fn new() -> Self {
        let mut interpreter = Interpreter {
            env: Environment::default(),
            builtins: HashMap::new(),
            output: None,
            input: None,
            call_stack: Vec::new(),
        };

        interpreter.register_builtins();

        interpreter
    }

    fn register_builtins(&mut self) {
        for name in builtins::BUILTIN_NAMES {
            self.builtins.insert(name.to_string(), Value::NativeFunction(name));
        }
    }

    /// Redirect program output into a shared buffer (used by tests)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Some(output);
    }

    /// Read `load` input from `reader` instead of stdin
    pub fn set_input<R: BufRead + 'static>(&mut self, reader: R) {
        self.input = Some(Box::new(reader));
    }

    /// Runs a whole program. A top-level `return` ends it early without error.
    pub fn run(&mut self, program: &[Stmt]) -> Result<()> {
        debug!(statements = program.len(), "running program");
        if let Flow::Return(value) = self.eval_stmts(program)? {
            debug!(?value, "program returned at top level");
        }
        Ok(())
    }

    fn write_raw(&self, text: &str) -> Result<()> {
        if let Some(out) = &self.output {
            let mut buffer = out
                .lock()
                .map_err(|_| ArsonError::runtime(ErrorKind::IoError, "Output buffer is poisoned"))?;
            buffer.extend_from_slice(text.as_bytes());
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()).map_err(|e| {
            ArsonError::runtime(ErrorKind::IoError, format!("Failed to write output: {}", e))
        })
    }

    /// Writes `msg` followed by a newline
    pub(crate) fn write_output(&self, msg: &str) -> Result<()> {
        self.write_raw(&format!("{}\n", msg))
    }

    /// Writes `prompt` with no newline and flushes it
    pub(crate) fn write_prompt(&self, prompt: &str) -> Result<()> {
        self.write_raw(prompt)
    }

    /// Reads one line of input without its line ending; end of input yields ""
    pub(crate) fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match self.input.as_mut() {
            Some(reader) => reader.read_line(&mut line),
            None => io::stdin().lock().read_line(&mut line),
        };
        read.map_err(|e| {
            ArsonError::runtime(ErrorKind::IoError, format!("Failed to read input: {}", e))
        })?;
        builtins::chomp(&mut line);
        Ok(line)
    }

    /// Executes statements in order, stopping at the first `return`
    pub(crate) fn eval_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.eval_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Evaluates a single statement
    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Var { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.define(name.clone(), value);
            }
            Stmt::Func { name, params, body } => {
                let function = Function {
                    name: Some(name.clone()),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: self.env.snapshot(),
                };
                self.env.define(name.clone(), Value::Function(Rc::new(function)));
            }
            Stmt::Return(expr) => {
                let value = self.eval_expr(expr)?;
                return Ok(Flow::Return(value));
            }
            Stmt::If { condition, body, otherwise } => {
                if self.eval_expr(condition)?.is_truthy() {
                    return self.eval_stmts(body);
                }
                for branch in otherwise {
                    match branch {
                        Branch::Elif { condition, body } => {
                            if self.eval_expr(condition)?.is_truthy() {
                                return self.eval_stmts(body);
                            }
                        }
                        Branch::Else { body } => return self.eval_stmts(body),
                    }
                }
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.eval_stmts(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::For { var, start, end, body } => {
                let start = self.range_bound(start, "start")?;
                let end = self.range_bound(end, "end")?;
                for i in start..end {
                    self.env.define(var.clone(), Value::Number(i as f64));
                    if let Flow::Return(value) = self.eval_stmts(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn range_bound(&mut self, expr: &Expr, which: &str) -> Result<i64> {
        match self.eval_expr(expr)? {
            Value::Number(n) => builtins::truncate(n).ok_or_else(|| {
                ArsonError::value_error(format!("Range {} is out of integer range: {}", which, n))
            }),
            other => Err(ArsonError::type_error(format!(
                "Range {} must be a number, not {}",
                which,
                other.type_name()
            ))),
        }
    }

    /// Evaluates an expression to a value, growing the native stack first
    /// when it is running low.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::str(s)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Identifier(name) => self.lookup(name),
            Expr::Negate(inner) => match self.eval_expr(inner)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(ArsonError::type_error(format!(
                    "Cannot negate a {} value",
                    other.type_name()
                ))),
            },
            Expr::BinOp { left, op, right } => self.eval_binary(left, *op, right),
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee)?;
                let args = self.eval_args(args)?;
                self.call_value(&callee, args)
            }
            Expr::Array(items) => {
                let items = self.eval_args(items)?;
                Ok(Value::array(items))
            }
            Expr::Dict(entries) => {
                let mut map = HashMap::with_capacity(entries.len());
                for (key, value_expr) in entries {
                    let value = self.eval_expr(value_expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::dict(map))
            }
            Expr::Lambda { params, body } => Ok(Value::Function(Rc::new(Function {
                name: None,
                params: params.clone(),
                body: Rc::clone(body),
                closure: self.env.snapshot(),
            }))),
            Expr::Chain { receiver, links } => self.eval_chain(receiver, links),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    /// Scope stack first, then builtins
    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.env.get(name) {
            return Ok(value);
        }
        if let Some(value) = self.builtins.get(name) {
            return Ok(value.clone());
        }
        let err = ArsonError::undefined_variable(name);
        let candidates = self.env.names().chain(self.builtins.keys().map(String::as_str));
        Err(match find_closest_match(name, candidates) {
            Some(close) => err.with_suggestion(close.to_string()),
            None => err,
        })
    }

    fn eval_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<Value> {
        match op {
            // Short-circuit: the deciding operand is the result
            BinaryOp::And => {
                let left = self.eval_expr(left)?;
                if left.is_truthy() {
                    self.eval_expr(right)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                let left = self.eval_expr(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval_expr(right)
                }
            }
            BinaryOp::Assign => match left {
                Expr::Identifier(name) => {
                    let value = self.eval_expr(right)?;
                    self.env.define(name.clone(), value.clone());
                    Ok(value)
                }
                _ => Err(ArsonError::type_error("Left side of '=' must be a variable name")),
            },
            _ => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                operators::apply(op, &left, &right)
            }
        }
    }

    /// Applies each link of a chain left to right.
    ///
    /// A method reached through `.name` is invoked immediately with no
    /// arguments unless the next link is an explicit call, so `xs.length`
    /// yields the count while `xs.push(4)` passes its arguments through.
    fn eval_chain(&mut self, receiver: &Expr, links: &[Link]) -> Result<Value> {
        let mut current = self.eval_expr(receiver)?;
        for (i, link) in links.iter().enumerate() {
            current = match link {
                Link::Call(args) => {
                    let args = self.eval_args(args)?;
                    self.call_value(&current, args)?
                }
                Link::Index(index) => {
                    let key = self.eval_expr(index)?;
                    current.index(&key)?
                }
                Link::Attr(name) => {
                    let resolved = current.attribute(name)?;
                    let explicit_call = matches!(links.get(i + 1), Some(Link::Call(_)));
                    if resolved.is_callable() && !explicit_call {
                        trace!(attribute = %name, "auto-invoking attribute");
                        self.call_value(&resolved, Vec::new())?
                    } else {
                        resolved
                    }
                }
            };
        }
        Ok(current)
    }

    /// Invokes any callable value with already-evaluated arguments
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Function(function) => self.call_function(function, args),
            Value::NativeFunction(name) => {
                trace!(builtin = *name, args = args.len(), "calling builtin");
                native_functions::call_native_function(self, name, &args)
            }
            Value::Method(method) => method.call(&args),
            other => Err(ArsonError::type_error(format!(
                "'{}' value is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_function(&mut self, function: &Rc<Function>, args: Vec<Value>) -> Result<Value> {
        let func_name = function.name.as_deref().unwrap_or("<lambda>");
        if args.len() != function.params.len() {
            return Err(ArsonError::type_error(format!(
                "Function '{}' expects {} argument{}, got {}",
                func_name,
                function.params.len(),
                if function.params.len() == 1 { "" } else { "s" },
                args.len()
            )));
        }

        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(ArsonError::runtime(
                ErrorKind::RecursionError,
                format!("Maximum call depth of {} exceeded", MAX_CALL_DEPTH),
            )
            .with_help(format!("'{}' was still recursing", func_name)));
        }

        // Fresh scope on top of the snapshot taken at definition time
        let mut local = Environment::enclosed(Rc::clone(&function.closure));
        if let Some(name) = &function.name {
            local.define(name.clone(), Value::Function(Rc::clone(function)));
        }
        for (param, arg) in function.params.iter().zip(args) {
            local.define(param.clone(), arg);
        }

        self.call_stack.push(func_name.to_string());
        trace!(function = func_name, depth = self.call_stack.len(), "calling function");

        let saved_env = std::mem::replace(&mut self.env, local);
        let result = self.eval_stmts(&function.body);
        self.env = saved_env;

        let result = result.map_err(|err| {
            if err.help.is_none() && err.kind.is_runtime() {
                let trace = self.call_stack.join(" -> ");
                err.with_help(format!("raised inside {}", trace))
            } else {
                err
            }
        });
        self.call_stack.pop();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }
}

/// Runs `f`, first moving to a new stack segment if less than the red zone remains.
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 128 * 1024;
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
