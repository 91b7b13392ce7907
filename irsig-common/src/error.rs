//! Error handling for the IR signature lister
//!
//! This module defines the error type shared by the loader and the
//! driver. Every failure is fatal for the invocation; nothing is
//! recovered locally.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Main error type covering both load phases (lex/parse) and file I/O
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Lexical error at {location}: {message}")]
    LexError {
        location: SourceLocation,
        message: String,
    },

    #[error("Parse error at {location}: {message}")]
    ParseError {
        location: SourceLocation,
        message: String,
    },

    #[error("IO error: {path}: {message}")]
    IoError { path: String, message: String },
}

impl IrError {
    /// Create a lexer error
    pub fn lexer_error(message: String, location: SourceLocation) -> Self {
        IrError::LexError { location, message }
    }

    /// Create a parse error
    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        IrError::ParseError { location, message }
    }

    /// Create an I/O error for a path
    pub fn io_error(path: &str, err: &std::io::Error) -> Self {
        IrError::IoError {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Convert from std::io::Error (no path available at this level)
impl From<std::io::Error> for IrError {
    fn from(err: std::io::Error) -> Self {
        IrError::IoError {
            path: "<output>".to_string(),
            message: err.to_string(),
        }
    }
}
