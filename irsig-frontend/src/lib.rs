//! IR Signature Lister - Frontend
//!
//! This crate provides the loading and rendering components:
//! - Lexer: tokenizes textual IR
//! - Parser: builds the module representation from tokens
//! - Types: the IR type model with canonical textual forms
//! - Renderer: writes one signature line per non-intrinsic function

pub mod lexer;
pub mod module;
pub mod parser;
pub mod render;
pub mod types;

pub use lexer::{Lexer, Token, TokenType};
pub use module::{Function, Module, RESERVED_INTRINSIC_PREFIX};
pub use parser::{ParseError, Parser};
pub use render::{render_signatures, render_signatures_with};
pub use types::{Type, TypeTable};

use irsig_common::IrError;
use std::fs;
use std::path::Path;

/// High-level module loading interface
pub struct Loader;

impl Loader {
    /// Load and parse a textual IR module from a file
    pub fn load_file(path: &Path) -> Result<Module, IrError> {
        let display = path.display().to_string();
        let source =
            fs::read_to_string(path).map_err(|e| IrError::io_error(&display, &e))?;
        Self::parse_source(&source, &display)
    }

    /// Parse textual IR into a module; `filename` is used in
    /// diagnostics
    pub fn parse_source(source: &str, filename: &str) -> Result<Module, IrError> {
        // Tokenize
        let mut lexer = Lexer::new(source, filename);
        let tokens = lexer.tokenize()?;

        // Parse
        let mut parser = Parser::new(tokens, filename);
        parser.parse_module()
    }
}
