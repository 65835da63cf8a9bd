// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the Arson programming language.
// Converts source code text into a stream of tokens for parsing.
//
// Supports:
// - Keywords from a configurable table (burn, prepmatch, if/elif/else, while, for/through, ...)
// - Identifiers and numbers
// - String literals in single or double quotes, with escape sequences
// - Operators: +, -, *, /, %, =, ==, <, >, <=, >=
// - Punctuation: ( ) { } [ ] , : .
// - Comments starting with #

use crate::config::KeywordTable;
use crate::errors::{ArsonError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    True,
    False,

    // Keywords
    Var,
    Func,
    CallMarker,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    Range,
    And,
    Or,
    Class,
    Constructor,
    SelfKw,
    New,
    Import,
    Export,
    Module,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Period,

    // Operators
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Equal,
    Equality,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    Eof,
}

impl TokenKind {
    /// Keywords that are recognized but have no grammar.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Constructor
                | TokenKind::SelfKw
                | TokenKind::New
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::Module
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Decoded literal payload of a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    None,
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(rename = "value")]
    pub literal: Literal,
    /// Raw source text of the token.
    #[serde(rename = "content")]
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Text of an identifier or string token.
    pub fn text(&self) -> &str {
        match &self.literal {
            Literal::Str(s) => s,
            _ => &self.lexeme,
        }
    }
}

/// Tokenizes Arson source code with the default keyword spellings.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    tokenize_with(source, &KeywordTable::default())
}

/// Tokenizes Arson source code using a custom keyword table.
///
/// The returned vector always ends with exactly one `Eof` token.
pub fn tokenize_with(source: &str, keywords: &KeywordTable) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source, keywords.lookup_map());
    while !lexer.at_end() {
        lexer.scan_token()?;
    }
    lexer.push(TokenKind::Eof, Literal::None, String::new());
    tracing::debug!(count = lexer.tokens.len(), "tokenized source");
    Ok(lexer.tokens)
}

struct Lexer {
    chars: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
    /// Line and column where the token being scanned started.
    start_line: usize,
    start_column: usize,
    keywords: HashMap<String, TokenKind>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str, keywords: HashMap<String, TokenKind>) -> Self {
        Lexer {
            chars: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            keywords,
            tokens: Vec::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.at_end() {
            self.current += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if !self.at_end() && self.peek() == expected {
            self.advance();
            return true;
        }
        false
    }

    fn push(&mut self, kind: TokenKind, literal: Literal, lexeme: String) {
        self.tokens.push(Token {
            kind,
            literal,
            lexeme,
            line: self.start_line,
            column: self.start_column,
        });
    }

    fn symbol(&mut self, kind: TokenKind, lexeme: &str) {
        self.push(kind, Literal::None, lexeme.to_string());
    }

    fn scan_token(&mut self) -> Result<()> {
        self.start_line = self.line;
        self.start_column = self.column;
        let c = self.advance();

        match c {
            ' ' | '\t' | '\r' | '\n' => {}
            '#' => {
                while !self.at_end() && self.peek() != '\n' {
                    self.advance();
                }
            }
            '(' => self.symbol(TokenKind::LeftParen, "("),
            ')' => self.symbol(TokenKind::RightParen, ")"),
            '{' => self.symbol(TokenKind::LeftBrace, "{"),
            '}' => self.symbol(TokenKind::RightBrace, "}"),
            '[' => self.symbol(TokenKind::LeftBracket, "["),
            ']' => self.symbol(TokenKind::RightBracket, "]"),
            ',' => self.symbol(TokenKind::Comma, ","),
            ':' => self.symbol(TokenKind::Colon, ":"),
            '.' => self.symbol(TokenKind::Period, "."),
            '+' => self.symbol(TokenKind::Plus, "+"),
            '-' => self.symbol(TokenKind::Minus, "-"),
            '*' => self.symbol(TokenKind::Times, "*"),
            '/' => self.symbol(TokenKind::Divide, "/"),
            '%' => self.symbol(TokenKind::Modulo, "%"),
            // Two-character operators must be checked before the single-char fallback
            '=' => {
                if self.matches('=') {
                    self.symbol(TokenKind::Equality, "==");
                } else {
                    self.symbol(TokenKind::Equal, "=");
                }
            }
            '<' => {
                if self.matches('=') {
                    self.symbol(TokenKind::LessThanOrEqual, "<=");
                } else {
                    self.symbol(TokenKind::LessThan, "<");
                }
            }
            '>' => {
                if self.matches('=') {
                    self.symbol(TokenKind::GreaterThanOrEqual, ">=");
                } else {
                    self.symbol(TokenKind::GreaterThan, ">");
                }
            }
            '"' | '\'' => self.string(c)?,
            c if c.is_ascii_digit() => self.number(c)?,
            c if c.is_alphabetic() => self.identifier(c),
            other => {
                return Err(ArsonError::lex_error(
                    format!("Unexpected character '{}'", other),
                    self.start_line,
                    self.start_column,
                ));
            }
        }
        Ok(())
    }

    fn string(&mut self, delimiter: char) -> Result<()> {
        let mut text = String::new();
        let mut raw = String::from(delimiter);

        loop {
            if self.at_end() {
                return Err(ArsonError::lex_error(
                    "Unterminated string",
                    self.start_line,
                    self.start_column,
                ));
            }
            let ch = self.advance();
            raw.push(ch);
            if ch == delimiter {
                break;
            }
            if ch == '\\' && !self.at_end() {
                let esc = self.advance();
                raw.push(esc);
                match esc {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    _ => text.push(esc),
                }
            } else {
                text.push(ch);
            }
        }

        self.push(TokenKind::String, Literal::Str(text), raw);
        Ok(())
    }

    fn number(&mut self, first: char) -> Result<()> {
        let mut text = String::from(first);
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            text.push(self.advance());
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }
        // A run of ASCII digits with at most one interior '.' always parses.
        let value = text.parse::<f64>().map_err(|e| {
            ArsonError::lex_error(
                format!("Invalid number '{}': {}", text, e),
                self.start_line,
                self.start_column,
            )
        })?;
        self.push(TokenKind::Number, Literal::Number(value), text);
        Ok(())
    }

    fn identifier(&mut self, first: char) {
        let mut text = String::from(first);
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            text.push(self.advance());
        }
        match self.keywords.get(&text).copied() {
            Some(kind) => self.push(kind, Literal::None, text),
            None => self.push(TokenKind::Identifier, Literal::Str(text.clone()), text),
        }
    }
}
