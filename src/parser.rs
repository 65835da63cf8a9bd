// File: src/parser.rs
//
// Recursive descent parser for the Arson programming language.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// The grammar is deliberately small:
// - Variable declarations (burn name = expr)
// - Function definitions and function literals (prepmatch)
// - Control flow (if/elif/else, while, for ... through (start, end))
// - Expressions with a single, flat precedence level. Every binary operator
//   recurses into a full expression on its right, so `2 * 3 + 4` is
//   `2 * (3 + 4)`. Scripts written for the language rely on this.
//
// The parser uses a single-token lookahead (two for `prepmatch`) and aborts on
// the first unexpected token.

use crate::ast::{BinaryOp, Branch, Expr, Link, Stmt};
use crate::errors::{ArsonError, Result};
use crate::lexer::{Literal, Token, TokenKind};
use std::rc::Rc;

/// Parser maintains position in token stream and provides methods to parse statements and expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a new parser from a vector of tokens
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                literal: Literal::None,
                lexeme: String::new(),
                line,
                column,
            });
        }
        Parser { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_next_kind(&self) -> TokenKind {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + 1).min(last)].kind
    }

    /// Consume and return the current token, then advance to the next.
    /// Never moves past the final Eof.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the expected kind, fail otherwise
    fn eat(&mut self, expected: TokenKind) -> Result<Token> {
        if self.peek_kind() == expected {
            Ok(self.advance())
        } else {
            Err(self.expected(&expected.to_string()))
        }
    }

    fn expected(&self, what: &str) -> ArsonError {
        let token = self.peek();
        let actual = if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("{} '{}'", token.kind, token.lexeme)
        };
        ArsonError::parse_error(
            format!("Expected {} but got {}", what, actual),
            token.line,
            token.column,
        )
    }

    fn eat_identifier(&mut self) -> Result<String> {
        Ok(self.eat(TokenKind::Identifier)?.text().to_string())
    }

    /// Parse the entire token stream into a vector of statements
    pub fn parse(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            stmts.push(self.parse_stmt()?);
        }
        tracing::debug!(statements = stmts.len(), "parsed program");
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokenKind::Var => self.parse_var(),
            TokenKind::Func if self.peek_next_kind() == TokenKind::Identifier => self.parse_func(),
            TokenKind::Return => {
                self.advance();
                Ok(Stmt::Return(self.parse_expr()?))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn parse_var(&mut self) -> Result<Stmt> {
        self.eat(TokenKind::Var)?;
        let name = self.eat_identifier()?;
        self.eat(TokenKind::Equal)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Var { name, value })
    }

    fn parse_func(&mut self) -> Result<Stmt> {
        self.eat(TokenKind::Func)?;
        let name = self.eat_identifier()?;
        self.eat(TokenKind::LeftParen)?;
        let params = self.parse_id_list()?;
        self.eat(TokenKind::RightParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::Func { name, params, body: Rc::from(body) })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.eat(TokenKind::If)?;
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;

        let mut otherwise = Vec::new();
        while self.peek_kind() == TokenKind::Elif {
            self.advance();
            let condition = self.parse_expr()?;
            let body = self.parse_block()?;
            otherwise.push(Branch::Elif { condition, body });
        }
        if self.peek_kind() == TokenKind::Else {
            self.advance();
            let body = self.parse_block()?;
            otherwise.push(Branch::Else { body });
        }

        Ok(Stmt::If { condition, body, otherwise })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.eat(TokenKind::While)?;
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let for_token = self.eat(TokenKind::For)?;
        let var = self.eat_identifier()?;
        self.eat(TokenKind::Range)?;
        self.eat(TokenKind::LeftParen)?;
        let bounds = self.parse_expr_list(TokenKind::RightParen)?;
        self.eat(TokenKind::RightParen)?;
        let [start, end]: [Expr; 2] = bounds.try_into().map_err(|bounds: Vec<Expr>| {
            ArsonError::parse_error(
                format!("A for range takes exactly 2 expressions, got {}", bounds.len()),
                for_token.line,
                for_token.column,
            )
            .with_help("write the range as (start, end); end is exclusive")
        })?;
        let body = self.parse_block()?;
        Ok(Stmt::For { var, start, end, body })
    }

    /// `{ stmt* }`
    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.eat(TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RightBrace | TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        self.eat(TokenKind::RightBrace)?;
        Ok(body)
    }

    /// Identifiers separated by commas, possibly empty
    fn parse_id_list(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if self.peek_kind() == TokenKind::Identifier {
            names.push(self.eat_identifier()?);
            while self.peek_kind() == TokenKind::Comma {
                self.advance();
                names.push(self.eat_identifier()?);
            }
        }
        Ok(names)
    }

    /// Expressions separated by commas, stopping before `closing`
    fn parse_expr_list(&mut self, closing: TokenKind) -> Result<Vec<Expr>> {
        let mut exprs = Vec::new();
        if self.peek_kind() != closing {
            exprs.push(self.parse_expr()?);
            while self.peek_kind() == TokenKind::Comma {
                self.advance();
                exprs.push(self.parse_expr()?);
            }
        }
        Ok(exprs)
    }

    fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Times => BinaryOp::Mul,
            TokenKind::Divide => BinaryOp::Div,
            TokenKind::Modulo => BinaryOp::Mod,
            TokenKind::LessThan => BinaryOp::Less,
            TokenKind::LessThanOrEqual => BinaryOp::LessEqual,
            TokenKind::GreaterThan => BinaryOp::Greater,
            TokenKind::GreaterThanOrEqual => BinaryOp::GreaterEqual,
            TokenKind::Equality => BinaryOp::Equal,
            TokenKind::Equal => BinaryOp::Assign,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// `call (op expr)?` - right-associative, no precedence levels
    fn parse_expr(&mut self) -> Result<Expr> {
        let left = self.parse_call()?;
        if let Some(op) = Self::binary_op(self.peek_kind()) {
            self.advance();
            let right = self.parse_expr()?;
            return Ok(Expr::BinOp { left: Box::new(left), op, right: Box::new(right) });
        }
        Ok(left)
    }

    /// A primary expression followed by any number of `(args)`, `.name` or `[index]` links.
    fn parse_call(&mut self) -> Result<Expr> {
        let expr = self.parse_primary()?;
        let mut links = Vec::new();

        loop {
            let last_line = self.tokens[self.pos.saturating_sub(1)].line;
            let token = self.peek();
            // `(` and `[` only continue a chain on the same line; on a new line
            // they start the next statement.
            let same_line = token.line == last_line;
            match token.kind {
                TokenKind::LeftParen if same_line => {
                    self.advance();
                    let args = self.parse_expr_list(TokenKind::RightParen)?;
                    self.eat(TokenKind::RightParen)?;
                    links.push(Link::Call(args));
                }
                TokenKind::LeftBracket if same_line => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.eat(TokenKind::RightBracket)?;
                    links.push(Link::Index(index));
                }
                TokenKind::Period => {
                    self.advance();
                    let name = self.eat_identifier()?;
                    links.push(Link::Attr(name));
                }
                _ => break,
            }
        }

        match links.len() {
            0 => Ok(expr),
            1 if matches!(links[0], Link::Call(_)) => match links.pop() {
                Some(Link::Call(args)) => Ok(Expr::Call { callee: Box::new(expr), args }),
                _ => Ok(expr),
            },
            _ => Ok(Expr::Chain { receiver: Box::new(expr), links }),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::CallMarker => {
                self.advance();
                self.parse_primary()
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier(token.text().to_string()))
            }
            TokenKind::Number => {
                self.advance();
                match token.literal {
                    Literal::Number(n) => Ok(Expr::Number(n)),
                    _ => Err(ArsonError::parse_error(
                        format!("Number token '{}' carries no value", token.lexeme),
                        token.line,
                        token.column,
                    )),
                }
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Str(token.text().to_string()))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.parse_call()?)))
            }
            TokenKind::Func => {
                self.advance();
                self.eat(TokenKind::LeftParen)?;
                let params = self.parse_id_list()?;
                self.eat(TokenKind::RightParen)?;
                let body = self.parse_block()?;
                Ok(Expr::Lambda { params, body: Rc::from(body) })
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.eat(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_dict_literal(),
            kind if kind.is_reserved() => Err(ArsonError::parse_error(
                format!("Reserved keyword '{}' is not supported", token.lexeme),
                token.line,
                token.column,
            )),
            _ => Err(self.expected("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr> {
        self.eat(TokenKind::LeftBracket)?;
        let elements = self.parse_expr_list(TokenKind::RightBracket)?;
        self.eat(TokenKind::RightBracket)?;
        Ok(Expr::Array(elements))
    }

    /// `{ "key": expr, ... }` - a trailing comma is allowed
    fn parse_dict_literal(&mut self) -> Result<Expr> {
        self.eat(TokenKind::LeftBrace)?;
        let mut pairs = Vec::new();
        while self.peek_kind() != TokenKind::RightBrace {
            let key = self.eat(TokenKind::String)?.text().to_string();
            self.eat(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            pairs.push((key, value));
            if self.peek_kind() != TokenKind::RightBrace {
                self.eat(TokenKind::Comma)?;
            }
        }
        self.eat(TokenKind::RightBrace)?;
        Ok(Expr::Dict(pairs))
    }
}
