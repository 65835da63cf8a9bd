// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Arson programming language.
//
// Expressions (Expr) produce values, statements (Stmt) perform actions and
// drive control flow. Function bodies are stored behind `Rc<[Stmt]>` so that
// closures created at runtime share the parsed body instead of copying it.

use std::fmt;
use std::rc::Rc;

/// Binary operators. Parsing gives them all the same precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    Assign,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::Assign => "=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Represents an expression in Arson - something that evaluates to a value
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    Number(f64),
    Str(String),
    Bool(bool),
    Negate(Box<Expr>),
    BinOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Array(Vec<Expr>),
    /// Dict literal; keys are always string literals, kept in source order.
    Dict(Vec<(String, Expr)>),
    Lambda {
        params: Vec<String>,
        body: Rc<[Stmt]>,
    },
    /// `receiver` followed by two or more links, or by a single non-call link.
    Chain {
        receiver: Box<Expr>,
        links: Vec<Link>,
    },
}

/// One step of a chained access.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// `(args)`
    Call(Vec<Expr>),
    /// `.name`
    Attr(String),
    /// `[expr]`
    Index(Expr),
}

/// An `elif` or `else` alternative attached to an `if`.
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    Elif { condition: Expr, body: Vec<Stmt> },
    Else { body: Vec<Stmt> },
}

/// Represents a statement in Arson - an action or declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var {
        name: String,
        value: Expr,
    },
    Func {
        name: String,
        params: Vec<String>,
        body: Rc<[Stmt]>,
    },
    Return(Expr),
    If {
        condition: Expr,
        body: Vec<Stmt>,
        otherwise: Vec<Branch>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    /// Iterates the half-open range `[start, end)`.
    For {
        var: String,
        start: Expr,
        end: Expr,
        body: Vec<Stmt>,
    },
    Expr(Expr),
}
