//! Error types and position tracking for dotenv parsing
//!
//! Lexical and token-level failures abort a parse call immediately. The file
//! loader only enriches them with the path of the offending file.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::grammar::TokenKind;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
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

    /// Advances the position by one character
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // \r\n is counted once, by the \n
            '\r' => {}
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }

    /// Advances the position over a run of text
    pub fn advance_by(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
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

/// Main error type for dotenv operations
#[derive(Debug, Error)]
pub enum DotenvError {
    /// Lexical analysis error
    #[error("Lexical error: {0}")]
    Lex(#[from] LexError),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// File loading error
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Serde deserialization error
    #[error("Serde error: {0}")]
    Serde(#[from] SerdeError),
}

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No pattern of the active grammar matches at the cursor
    #[error("No {grammar} pattern matches at {position} near '{near}'")]
    NoMatch {
        grammar: &'static str,
        position: Position,
        near: String,
    },

    /// The configured token budget ran out
    #[error("Token limit of {limit} exceeded at {position}")]
    TokenLimitExceeded { limit: usize, position: Position },
}

impl LexError {
    /// Returns the position the error was raised at
    pub fn position(&self) -> Position {
        match self {
            LexError::NoMatch { position, .. } | LexError::TokenLimitExceeded { position, .. } => {
                *position
            }
        }
    }
}

/// Parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `demand` found a different token kind than required
    #[error("Unexpected {} '{lexeme}' at {position}, expected {}", .found.describe(), .expected.describe())]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        lexeme: String,
        position: Position,
    },

    /// A name was assigned twice while duplicates are rejected
    #[error("Duplicate key '{key}' at {position}")]
    DuplicateKey { key: String, position: Position },

    /// Lexical failure surfaced while scanning
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// Returns the position the error was raised at
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::DuplicateKey { position, .. } => *position,
            ParseError::Lex(err) => err.position(),
        }
    }
}

/// File loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// `require` was asked for a file that does not exist
    #[error("Failed to find dotenv file: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but cannot be read
    #[error("Failed to read dotenv file: {}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content failed to parse
    #[error("Failed to parse dotenv file \"{}\"\n{source}", .path.display())]
    SyntaxError {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Any other I/O failure while reading the file
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Returns the file path the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::FileNotFound { path }
            | LoadError::UnreadableFile { path, .. }
            | LoadError::SyntaxError { path, .. }
            | LoadError::Io { path, .. } => path,
        }
    }
}

/// Serde integration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeError {
    /// Custom serde error message
    #[error("{0}")]
    Custom(String),
}

impl serde::de::Error for DotenvError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DotenvError::Serde(SerdeError::Custom(msg.to_string()))
    }
}

impl serde::de::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_new() {
        let pos = Position::new();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_position_advance() {
        let mut pos = Position::new();

        pos.advance('a');
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 1);

        pos.advance('\n');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 2);

        pos.advance('ü'); // Multi-byte UTF-8 character
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 4);
    }

    #[test]
    fn test_position_advance_over_crlf() {
        let mut pos = Position::new();
        pos.advance_by("A=1\r\nB");

        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 6);
    }

    #[test]
    fn test_position_display() {
        let pos = Position {
            line: 42,
            column: 13,
            offset: 100,
        };
        assert_eq!(format!("{}", pos), "42:13");
    }

    #[test]
    fn test_parse_error_position_passes_through_lex_error() {
        let position = Position {
            line: 3,
            column: 5,
            offset: 20,
        };
        let err = ParseError::from(LexError::NoMatch {
            grammar: "value",
            position,
            near: " bar".to_string(),
        });
        assert_eq!(err.position(), position);
    }

    #[test]
    fn test_load_error_path() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("/tmp/.env"),
        };
        assert_eq!(err.path(), std::path::Path::new("/tmp/.env"));
        assert_eq!(err.to_string(), "Failed to find dotenv file: /tmp/.env");
    }
}
