//! Textual IR Module Parser
//!
//! A recursive descent parser over the token stream. It records every
//! function declaration and definition with fully parsed types, and
//! skips the module content the signature listing never looks at
//! (global initializers, function bodies, attribute groups, metadata).

pub mod errors;
pub mod types;

use crate::lexer::{Token, TokenType};
use crate::module::{Function, Module};
use irsig_common::{IrError, SourceLocation, SourceSpan};
use log::trace;
use std::collections::{HashMap, VecDeque};

pub use errors::ParseError;

/// Words that may appear between `define`/`declare` and the return
/// type: linkage, preemption, visibility, DLL storage, calling
/// convention, and return attributes. All are irrelevant to the
/// signature listing and skipped.
const FUNCTION_PREFIX_ATTRS: &[&str] = &[
    // Linkage
    "private",
    "internal",
    "available_externally",
    "linkonce",
    "weak",
    "common",
    "appending",
    "extern_weak",
    "linkonce_odr",
    "weak_odr",
    "external",
    // Preemption and visibility
    "dso_local",
    "dso_preemptable",
    "default",
    "hidden",
    "protected",
    "dllimport",
    "dllexport",
    // Address significance
    "unnamed_addr",
    "local_unnamed_addr",
    // Calling conventions
    "ccc",
    "fastcc",
    "coldcc",
    "webkit_jscc",
    "anyregcc",
    "preserve_mostcc",
    "preserve_allcc",
    "cxx_fast_tlscc",
    "swiftcc",
    "swifttailcc",
    "tailcc",
    "cfguard_checkcc",
    "cc",
    // Return attributes
    "zeroext",
    "signext",
    "inreg",
    "noalias",
    "nonnull",
    "noundef",
];

/// IR module parser
pub struct Parser {
    tokens: VecDeque<Token>,
    filename: String,
    /// Named types referenced anywhere in parsed positions, with the
    /// location of their first use
    referenced_types: HashMap<String, SourceLocation>,
}

impl Parser {
    /// Create a new parser; `filename` names the module and seeds EOF
    /// diagnostics
    pub fn new(tokens: Vec<Token>, filename: &str) -> Self {
        Self {
            tokens: tokens.into(),
            filename: filename.to_string(),
            referenced_types: HashMap::new(),
        }
    }

    /// Peek at current token without consuming
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Peek `offset` tokens ahead without consuming
    pub(crate) fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(offset)
    }

    /// Get current token and advance
    pub(crate) fn advance(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Get current token and advance, treating end of input as an error
    pub(crate) fn advance_or_eof(&mut self, expected: &str) -> Result<Token, ParseError> {
        match self.advance() {
            Some(token) if !matches!(token.token_type, TokenType::EndOfFile) => Ok(token),
            Some(token) => Err(ParseError::UnexpectedEndOfFile {
                expected: expected.to_string(),
                location: token.span.start,
            }),
            None => Err(ParseError::UnexpectedEndOfFile {
                expected: expected.to_string(),
                location: self.eof_location(),
            }),
        }
    }

    /// Check if current token matches expected type
    pub(crate) fn check(&self, token_type: &TokenType) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.token_type) == std::mem::discriminant(token_type)
        } else {
            matches!(token_type, TokenType::EndOfFile)
        }
    }

    /// Check if current token is a specific bare word
    pub(crate) fn check_word(&self, word: &str) -> bool {
        matches!(
            self.peek().map(|t| &t.token_type),
            Some(TokenType::Word(w)) if w == word
        )
    }

    /// Consume token if it matches expected type
    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect and consume a specific token type
    pub(crate) fn expect(
        &mut self,
        token_type: TokenType,
        context: &str,
    ) -> Result<Token, ParseError> {
        if let Some(token) = self.advance() {
            if std::mem::discriminant(&token.token_type) == std::mem::discriminant(&token_type) {
                Ok(token)
            } else {
                Err(ParseError::UnexpectedToken {
                    expected: format!("{} in {}", token_type, context),
                    found: token,
                })
            }
        } else {
            Err(ParseError::UnexpectedEndOfFile {
                expected: format!("{} in {}", token_type, context),
                location: self.eof_location(),
            })
        }
    }

    /// Expect a specific bare word
    pub(crate) fn expect_word(&mut self, word: &str, context: &str) -> Result<(), ParseError> {
        let token = self.advance_or_eof(&format!("'{}' in {}", word, context))?;
        match token.token_type {
            TokenType::Word(ref w) if w == word => Ok(()),
            _ => Err(ParseError::UnexpectedToken {
                expected: format!("'{}' in {}", word, context),
                found: token,
            }),
        }
    }

    /// Expect a non-negative integer literal
    pub(crate) fn expect_uint(&mut self, context: &str) -> Result<u64, ParseError> {
        let token = self.expect(TokenType::IntLiteral(0), context)?;
        match token.token_type {
            TokenType::IntLiteral(n) if n >= 0 => Ok(n as u64),
            _ => Err(ParseError::InvalidType {
                message: format!("Expected a non-negative size in {}", context),
                location: token.span.start,
            }),
        }
    }

    /// Expect a string literal and return its contents
    fn expect_string(&mut self, context: &str) -> Result<String, ParseError> {
        let token = self.expect(TokenType::StringLiteral(String::new()), context)?;
        match token.token_type {
            TokenType::StringLiteral(s) => Ok(s),
            _ => unreachable!(),
        }
    }

    /// Get current location for error reporting
    pub(crate) fn current_location(&self) -> SourceLocation {
        if let Some(token) = self.peek() {
            token.span.start.clone()
        } else {
            self.eof_location()
        }
    }

    /// Fallback location when the token stream is exhausted
    fn eof_location(&self) -> SourceLocation {
        SourceLocation::new(&self.filename, 0, 0)
    }

    /// Parse a complete module
    pub fn parse_module(&mut self) -> Result<Module, IrError> {
        let mut module = Module::new(&self.filename);

        loop {
            let Some(token) = self.peek() else { break };
            match &token.token_type {
                TokenType::EndOfFile => break,

                TokenType::SourceFilename => {
                    self.advance();
                    self.expect(TokenType::Equal, "source_filename")?;
                    module.source_filename = Some(self.expect_string("source_filename")?);
                }

                // target datalayout = "..." / target triple = "..."
                TokenType::Target => {
                    self.advance();
                    let token = self.advance_or_eof("'datalayout' or 'triple'")?;
                    match token.token_type {
                        TokenType::Word(ref w) if w == "datalayout" || w == "triple" => {}
                        _ => {
                            return Err(ParseError::UnexpectedToken {
                                expected: "'datalayout' or 'triple'".to_string(),
                                found: token,
                            }
                            .into());
                        }
                    }
                    self.expect(TokenType::Equal, "target")?;
                    self.expect_string("target")?;
                }

                // %name = type <ty>
                TokenType::LocalIdent(_) => self.parse_type_definition(&mut module)?,

                // @name = <linkage...> global/constant <ty> <init>
                TokenType::GlobalIdent(_) => self.skip_global(),

                TokenType::Declare => {
                    let function = self.parse_function(false)?;
                    module.functions.push(function);
                }
                TokenType::Define => {
                    let function = self.parse_function(true)?;
                    module.functions.push(function);
                }

                // attributes #N = { ... }
                TokenType::Attributes => {
                    self.advance();
                    self.expect(TokenType::AttrGroupRef(0), "attribute group")?;
                    self.expect(TokenType::Equal, "attribute group")?;
                    self.expect(TokenType::LeftBrace, "attribute group")?;
                    self.skip_balanced_braces("attribute group")?;
                }

                // !name = !{...} and named metadata
                TokenType::MetadataIdent(_) => {
                    let line = token.span.start.line;
                    self.skip_rest_of_line(line);
                }

                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "a top-level entity".to_string(),
                        found: token.clone(),
                    }
                    .into());
                }
            }
        }

        self.check_referenced_types(&module)?;

        log::debug!(
            "parsed module '{}': {} functions, {} named types",
            module.name,
            module.functions.len(),
            module.types.len()
        );

        Ok(module)
    }

    /// Every named type used in a parsed position must be defined
    /// somewhere in the module
    fn check_referenced_types(&self, module: &Module) -> Result<(), IrError> {
        let mut undefined: Vec<_> = self
            .referenced_types
            .iter()
            .filter(|(name, _)| !module.types.contains(name))
            .collect();
        // Deterministic diagnostic when several are undefined
        undefined.sort_by(|a, b| a.0.cmp(b.0));

        if let Some((name, location)) = undefined.first() {
            return Err(IrError::parse_error(
                format!("Use of undefined type '%{}'", name),
                (*location).clone(),
            ));
        }
        Ok(())
    }

    /// Parse `%name = type <ty>`
    fn parse_type_definition(&mut self, module: &mut Module) -> Result<(), IrError> {
        let token = self.advance_or_eof("a type definition")?;
        let TokenType::LocalIdent(name) = token.token_type else {
            unreachable!("caller checked for a local identifier");
        };

        self.expect(TokenType::Equal, "type definition")?;
        self.expect(TokenType::Type, "type definition")?;

        let ty = if self.check_word("opaque") {
            self.advance();
            crate::types::Type::Opaque
        } else {
            self.parse_type()?
        };

        if !module.types.define(&name, ty) {
            return Err(IrError::parse_error(
                format!("Redefinition of type '%{}'", name),
                token.span.start,
            ));
        }

        trace!("defined type %{}", name);
        Ok(())
    }

    /// Skip a global variable or alias. In the front-end's output these
    /// are single-line entities, so everything on the line is consumed.
    fn skip_global(&mut self) {
        let Some(token) = self.advance() else { return };
        let line = token.span.start.line;
        self.skip_rest_of_line(line);
    }

    /// Skip remaining tokens on a source line
    fn skip_rest_of_line(&mut self, line: u32) {
        while let Some(token) = self.peek() {
            if matches!(token.token_type, TokenType::EndOfFile) || token.span.start.line != line {
                break;
            }
            self.advance();
        }
    }

    /// Skip a balanced `{ ... }` region; the opening brace has already
    /// been consumed
    fn skip_balanced_braces(&mut self, context: &str) -> Result<(), ParseError> {
        let mut depth: u32 = 1;
        while depth > 0 {
            let token = self.advance_or_eof(&format!("'}}' closing {}", context))?;
            match token.token_type {
                TokenType::LeftBrace => depth += 1,
                TokenType::RightBrace => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip a balanced `( ... )` region; the opening paren has already
    /// been consumed
    fn skip_balanced_parens(&mut self, context: &str) -> Result<(), ParseError> {
        let mut depth: u32 = 1;
        while depth > 0 {
            let token = self.advance_or_eof(&format!("')' closing {}", context))?;
            match token.token_type {
                TokenType::LeftParen => depth += 1,
                TokenType::RightParen => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip linkage/visibility/calling-convention/return-attribute
    /// words before the return type
    fn skip_function_prefix_attrs(&mut self) {
        loop {
            let Some(token) = self.peek() else { break };
            let TokenType::Word(word) = &token.token_type else {
                break;
            };
            if !FUNCTION_PREFIX_ATTRS.contains(&word.as_str()) {
                break;
            }
            let is_numbered_cc = word == "cc";
            self.advance();
            if is_numbered_cc {
                // `cc <n>` carries an explicit convention number
                self.match_token(&TokenType::IntLiteral(0));
            }
        }
    }

    /// Skip the attributes that may follow a declare's closing paren:
    /// attribute words, `#N` group references, string attributes with
    /// their `=` values, `align N` operands, and `!name !N` metadata
    /// attachments. The text is whitespace-insensitive, so the next
    /// top-level entity may share the line; it is left untouched.
    fn skip_declare_trailing(&mut self) {
        loop {
            let Some(token) = self.peek() else { break };
            match token.token_type {
                TokenType::AttrGroupRef(_)
                | TokenType::Word(_)
                | TokenType::StringLiteral(_)
                | TokenType::Equal
                | TokenType::IntLiteral(_) => {
                    self.advance();
                }
                TokenType::MetadataIdent(_) => {
                    // `!name = ...` opens a top-level metadata entity
                    if matches!(
                        self.peek_at(1).map(|t| &t.token_type),
                        Some(TokenType::Equal)
                    ) {
                        break;
                    }
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Skip parameter attributes and the optional value name between a
    /// parameter's type and the following `,` or `)`
    fn skip_param_trailing(&mut self) -> Result<(), ParseError> {
        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::UnexpectedEndOfFile {
                    expected: "',' or ')' in parameter list".to_string(),
                    location: self.eof_location(),
                });
            };
            match token.token_type {
                TokenType::Comma | TokenType::RightParen => return Ok(()),
                TokenType::EndOfFile => {
                    return Err(ParseError::UnexpectedEndOfFile {
                        expected: "',' or ')' in parameter list".to_string(),
                        location: token.span.start.clone(),
                    });
                }
                TokenType::LeftParen => {
                    self.advance();
                    self.skip_balanced_parens("parameter attribute")?;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Parse a `declare` or `define`, recording its signature. The body
    /// of a definition is skipped with balanced-brace matching.
    fn parse_function(&mut self, is_definition: bool) -> Result<Function, ParseError> {
        let start = self.current_location();
        let keyword = if is_definition {
            TokenType::Define
        } else {
            TokenType::Declare
        };
        self.expect(keyword, "function")?;

        self.skip_function_prefix_attrs();
        let return_type = self.parse_type()?;

        let name_token = self.advance_or_eof("a function name")?;
        let TokenType::GlobalIdent(name) = name_token.token_type else {
            return Err(ParseError::UnexpectedToken {
                expected: "a function name".to_string(),
                found: name_token,
            });
        };

        self.expect(TokenType::LeftParen, "parameter list")?;

        let mut params = Vec::new();
        let mut is_vararg = false;
        if !self.check(&TokenType::RightParen) {
            loop {
                if self.check(&TokenType::Ellipsis) {
                    self.advance();
                    is_vararg = true;
                    break;
                }
                params.push(self.parse_type()?);
                self.skip_param_trailing()?;
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
        }
        let rparen = self.expect(TokenType::RightParen, "parameter list")?;

        if is_definition {
            // Function attributes, metadata, etc. up to the body
            loop {
                let Some(token) = self.peek() else {
                    return Err(ParseError::UnexpectedEndOfFile {
                        expected: format!("'{{' opening body of '@{}'", name),
                        location: self.eof_location(),
                    });
                };
                match token.token_type {
                    TokenType::LeftBrace => break,
                    TokenType::EndOfFile => {
                        return Err(ParseError::UnexpectedEndOfFile {
                            expected: format!("'{{' opening body of '@{}'", name),
                            location: token.span.start.clone(),
                        });
                    }
                    _ => {
                        self.advance();
                    }
                }
            }
            self.advance();
            self.skip_balanced_braces(&format!("body of '@{}'", name))?;
        } else {
            self.skip_declare_trailing();
        }

        trace!(
            "parsed {} @{} with {} parameters",
            if is_definition { "define" } else { "declare" },
            name,
            params.len()
        );

        Ok(Function {
            name,
            return_type,
            params,
            is_vararg,
            is_definition,
            span: SourceSpan::new(start, rparen.span.end),
        })
    }
}
