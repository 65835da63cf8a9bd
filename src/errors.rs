// File: src/errors.rs
//
// Error handling and reporting for the Arson language.
// Every stage of the pipeline (lexer, parser, interpreter) reports failures
// through `ArsonError`, which carries a kind, a message, an optional source
// location and pretty-printed context for the terminal.

use colored::Colorize;
use std::fmt;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0, file: None }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Categories of failure. Lex and parse errors abort before execution starts;
/// everything else is raised while the program runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    NameError,
    TypeError,
    IndexError,
    ValueError,
    RecursionError,
    IoError,
    ConfigError,
}

impl ErrorKind {
    /// True for errors raised by the evaluator rather than the front end.
    pub fn is_runtime(&self) -> bool {
        !matches!(self, ErrorKind::LexError | ErrorKind::ParseError | ErrorKind::ConfigError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::LexError => write!(f, "Lex Error"),
            ErrorKind::ParseError => write!(f, "Parse Error"),
            ErrorKind::NameError => write!(f, "Name Error"),
            ErrorKind::TypeError => write!(f, "Type Error"),
            ErrorKind::IndexError => write!(f, "Index Error"),
            ErrorKind::ValueError => write!(f, "Value Error"),
            ErrorKind::RecursionError => write!(f, "Recursion Error"),
            ErrorKind::IoError => write!(f, "I/O Error"),
            ErrorKind::ConfigError => write!(f, "Config Error"),
        }
    }
}

/// A structured error with location information
#[derive(Debug, Clone)]
pub struct ArsonError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

pub type Result<T> = std::result::Result<T, ArsonError>;

impl ArsonError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            source_line: None,
            suggestion: None,
            help: None,
        }
    }

    pub fn with_source(mut self, source_line: String) -> Self {
        self.source_line = Some(source_line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_file(mut self, file: String) -> Self {
        self.location.file = Some(file);
        self
    }

    /// Attaches the offending line of `source` when the location is known.
    pub fn with_source_from(self, source: &str) -> Self {
        if !self.location.is_known() {
            return self;
        }
        match source.lines().nth(self.location.line - 1) {
            Some(line) => self.with_source(line.to_string()),
            None => self,
        }
    }

    pub fn lex_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(ErrorKind::LexError, message, SourceLocation::new(line, column))
    }

    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(ErrorKind::ParseError, message, SourceLocation::new(line, column))
    }

    /// Runtime errors carry no location: the AST does not track positions.
    pub fn runtime(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, SourceLocation::unknown())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::TypeError, message)
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::IndexError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::ValueError, message)
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::runtime(ErrorKind::NameError, format!("Variable '{}' does not exist", name))
    }

    pub fn missing_key(key: &str) -> Self {
        Self::runtime(ErrorKind::NameError, format!("Key '{}' not found in dict", key))
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError, message, SourceLocation::unknown())
    }
}

impl fmt::Display for ArsonError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        if self.location.is_known() {
            let location_str = format!("  --> {}", self.location);
            writeln!(f, "{}", location_str.bright_blue())?;
        }

        if let Some(ref source) = self.source_line {
            let line_num = self.location.line;
            let col_num = self.location.column;

            writeln!(f, "   {}", "|".bright_blue())?;
            writeln!(
                f,
                "{} {} {}",
                format!("{:3}", line_num).bright_blue(),
                "|".bright_blue(),
                source
            )?;
            writeln!(
                f,
                "   {} {}{}",
                "|".bright_blue(),
                " ".repeat(col_num.saturating_sub(1)),
                "^".red().bold()
            )?;
            writeln!(f, "   {}", "|".bright_blue())?;
        }

        if let Some(ref help) = self.help {
            writeln!(
                f,
                "   {} {}",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for ArsonError {}

/// Computes the Levenshtein distance between two strings
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let (len1, len2) = (s1_chars.len(), s2_chars.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

/// Find the closest match from a list of candidates.
/// Returns None if nothing is within an edit distance of 3.
pub fn find_closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match
}
