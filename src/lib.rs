// File: src/lib.rs
//
// Library interface for the Arson interpreter.
// Exposes modules for integration testing and external use.

pub mod ast;
pub mod builtins;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
