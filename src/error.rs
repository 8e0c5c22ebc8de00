//! Error types and position tracking for properties parsing
//!
//! This module provides the error taxonomy shared by the lexer, the parser,
//! the expansion engine and the writer, together with source positions for
//! precise reporting.

use std::fmt;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in chars)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advances the position past `c`.
    ///
    /// `next` is the character following `c`; a `'\r'` directly followed by
    /// `'\n'` does not start a new line on its own, the `'\n'` does.
    pub fn advance(&mut self, c: char, next: Option<char>) {
        match c {
            '\n' => self.next_line(),
            '\r' if next != Some('\n') => self.next_line(),
            _ => self.column += 1,
        }
        self.offset += c.len_utf8();
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Main error type for properties operations
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// Lexical analysis error
    #[error("properties: {0}")]
    Lex(#[from] LexError),

    /// Parsing error
    #[error("properties: {0}")]
    Parse(#[from] ParseError),

    /// Placeholder expansion error
    #[error("properties: {0}")]
    Expand(#[from] ExpandError),

    /// I/O error while writing
    #[error("properties: IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PropertiesError {
    /// Returns the source position of the error, if it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            PropertiesError::Lex(err) => Some(err.position()),
            PropertiesError::Parse(err) => Some(err.position()),
            PropertiesError::Expand(_) | PropertiesError::Io(_) => None,
        }
    }
}

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Input ended inside an escape sequence
    #[error("premature EOF at {position}")]
    PrematureEof { position: Position },

    /// `\uXXXX` escape without exactly four hex digits or naming a surrogate
    #[error("invalid unicode literal '\\{sequence}' at {position}")]
    InvalidUnicodeLiteral {
        sequence: String,
        position: Position,
    },
}

impl LexError {
    /// Returns where the offending input starts
    pub fn position(&self) -> Position {
        match self {
            LexError::PrematureEof { position } => *position,
            LexError::InvalidUnicodeLiteral { position, .. } => *position,
        }
    }
}

/// Parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token of the wrong kind for the current parser state
    #[error("Line {line}: unexpected {token}, expected {expected}")]
    UnexpectedToken {
        token: String,
        expected: String,
        line: usize,
        position: Position,
    },
}

impl ParseError {
    /// Returns where the offending token starts
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. } => *position,
        }
    }

    /// Returns the 1-based line of the offending token
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. } => *line,
        }
    }
}

/// Placeholder expansion errors
///
/// `property` names the `key = raw value` pair whose expansion failed when the
/// error was raised through [`crate::Properties::get`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A placeholder prefix without a matching postfix
    #[error("malformed expression {expression:?}{}", in_property(.property))]
    MalformedExpression {
        expression: String,
        property: Option<String>,
    },

    /// A placeholder chain that leads back to a key still being expanded
    #[error("circular reference {}{}", format_chain(.chain, .key), in_property(.property))]
    CircularReference {
        key: String,
        chain: Vec<String>,
        property: Option<String>,
    },
}

impl ExpandError {
    /// Attaches the offending `key = value` pair to the error
    pub fn in_property(self, key: &str, raw: &str) -> Self {
        let property = Some(format!("{} = {}", key, raw));
        match self {
            ExpandError::MalformedExpression { expression, .. } => {
                ExpandError::MalformedExpression {
                    expression,
                    property,
                }
            }
            ExpandError::CircularReference { key, chain, .. } => ExpandError::CircularReference {
                key,
                chain,
                property,
            },
        }
    }

    /// Returns the offending `key = value` pair, if known
    pub fn property(&self) -> Option<&str> {
        match self {
            ExpandError::MalformedExpression { property, .. }
            | ExpandError::CircularReference { property, .. } => property.as_deref(),
        }
    }
}

fn in_property(property: &Option<String>) -> String {
    match property {
        Some(property) => format!(" in {:?}", property),
        None => String::new(),
    }
}

fn format_chain(chain: &[String], key: &str) -> String {
    if chain.is_empty() {
        return key.to_string();
    }
    format!("{} -> {}", chain.join(" -> "), key)
}
