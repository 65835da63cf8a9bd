// File: src/config.rs
//
// Keyword configuration for the Arson lexer.
//
// The language's keyword spellings are not fixed: every keyword can be
// renamed through a TOML table, e.g.
//
//     var = "let"
//     func = "fn"
//     range = "in"
//
// Keys that are absent keep their default spelling.

use crate::errors::{ArsonError, Result};
use crate::lexer::TokenKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Spellings for every keyword the lexer recognizes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordTable {
    pub var: String,
    pub func: String,
    pub call: String,
    #[serde(rename = "return")]
    pub return_: String,
    #[serde(rename = "if")]
    pub if_: String,
    pub elif: String,
    #[serde(rename = "else")]
    pub else_: String,
    #[serde(rename = "while")]
    pub while_: String,
    #[serde(rename = "for")]
    pub for_: String,
    pub range: String,
    #[serde(rename = "true")]
    pub true_: String,
    #[serde(rename = "false")]
    pub false_: String,
    pub and: String,
    pub or: String,
    pub class: String,
    pub constructor: String,
    #[serde(rename = "self")]
    pub self_: String,
    pub new: String,
    pub import: String,
    pub export: String,
    pub module: String,
}

impl Default for KeywordTable {
    fn default() -> Self {
        KeywordTable {
            var: "burn".into(),
            func: "prepmatch".into(),
            call: "lightmatch".into(),
            return_: "return".into(),
            if_: "if".into(),
            elif: "elif".into(),
            else_: "else".into(),
            while_: "while".into(),
            for_: "for".into(),
            range: "through".into(),
            true_: "true".into(),
            false_: "false".into(),
            and: "and".into(),
            or: "or".into(),
            class: "lightertype".into(),
            constructor: "ignite".into(),
            self_: "self".into(),
            new: "pullout".into(),
            import: "being".into(),
            export: "leave".into(),
            module: "containing".into(),
        }
    }
}

impl KeywordTable {
    /// Parses a keyword table from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: KeywordTable = toml::from_str(text)
            .map_err(|e| ArsonError::config_error(format!("Invalid keyword table: {}", e)))?;
        table.validate()?;
        Ok(table)
    }

    /// Loads a keyword table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ArsonError::config_error(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    fn entries(&self) -> [(&str, TokenKind); 21] {
        [
            (self.var.as_str(), TokenKind::Var),
            (self.func.as_str(), TokenKind::Func),
            (self.call.as_str(), TokenKind::CallMarker),
            (self.return_.as_str(), TokenKind::Return),
            (self.if_.as_str(), TokenKind::If),
            (self.elif.as_str(), TokenKind::Elif),
            (self.else_.as_str(), TokenKind::Else),
            (self.while_.as_str(), TokenKind::While),
            (self.for_.as_str(), TokenKind::For),
            (self.range.as_str(), TokenKind::Range),
            (self.true_.as_str(), TokenKind::True),
            (self.false_.as_str(), TokenKind::False),
            (self.and.as_str(), TokenKind::And),
            (self.or.as_str(), TokenKind::Or),
            (self.class.as_str(), TokenKind::Class),
            (self.constructor.as_str(), TokenKind::Constructor),
            (self.self_.as_str(), TokenKind::SelfKw),
            (self.new.as_str(), TokenKind::New),
            (self.import.as_str(), TokenKind::Import),
            (self.export.as_str(), TokenKind::Export),
            (self.module.as_str(), TokenKind::Module),
        ]
    }

    /// Every spelling must be a valid identifier and no two keywords may share one.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, TokenKind> = HashMap::new();
        for (spelling, kind) in self.entries() {
            let mut chars = spelling.chars();
            let valid = chars.next().is_some_and(|c| c.is_alphabetic())
                && chars.all(|c| c.is_alphanumeric() || c == '_');
            if !valid {
                return Err(ArsonError::config_error(format!(
                    "Keyword {:?} has invalid spelling '{}'",
                    kind, spelling
                )));
            }
            if let Some(previous) = seen.insert(spelling, kind) {
                return Err(ArsonError::config_error(format!(
                    "Spelling '{}' is used by both {:?} and {:?}",
                    spelling, previous, kind
                )));
            }
        }
        Ok(())
    }

    /// Spelling → token kind lookup used by the lexer.
    pub fn lookup_map(&self) -> HashMap<String, TokenKind> {
        self.entries().into_iter().map(|(s, k)| (s.to_string(), k)).collect()
    }
}
