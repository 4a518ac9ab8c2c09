//! Error types for the Victoria 2 token generator.

use std::fmt;

/// Structural errors found while walking a token stream.
///
/// These never stop a load: the generator resynchronizes and the caller
/// turns them into diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input ended while a `{` group was still open.
    UnexpectedEof {
        /// Line of the last token in the stream.
        line: u32,
    },
    /// Encountered a token that cannot start an entry.
    UnexpectedToken {
        /// Line the token was found on.
        line: u32,
        /// The token that was found.
        token: String,
        /// What was expected instead.
        expected: String,
    },
    /// Missing right-hand side after `=` in an assignment.
    MissingRhs {
        /// Line of the key.
        line: u32,
        /// The key that had no value.
        key: String,
    },
}

impl ParseError {
    /// Line the problem was reported on.
    pub fn line(&self) -> u32 {
        match self {
            ParseError::UnexpectedEof { line }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::MissingRhs { line, .. } => *line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof { .. } => {
                write!(f, "unexpected end of file inside a group")
            }
            ParseError::UnexpectedToken {
                token, expected, ..
            } => {
                write!(f, "unexpected token '{}', expected {}", token, expected)
            }
            ParseError::MissingRhs { key, .. } => {
                write!(f, "missing right-hand side for '{}'", key)
            }
        }
    }
}

impl std::error::Error for ParseError {}
