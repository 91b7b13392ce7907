//! Type parsing for the IR module parser
//!
//! Covers the first-class type grammar: primitives, pointers, arrays,
//! vectors (including scalable), literal and packed structs, named
//! types, and function types. Named-type references are recorded so the
//! parser can reject uses of types that are never defined.

use super::{ParseError, Parser};
use crate::lexer::TokenType;
use crate::types::Type;

impl Parser {
    /// Parse a first-class type, including `*` and function-type
    /// suffixes
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let token = self.advance_or_eof("a type")?;

        let mut ty = match token.token_type {
            TokenType::Word(ref word) => Type::from_word(word).ok_or_else(|| {
                ParseError::InvalidType {
                    message: format!("Expected a type, found '{}'", word),
                    location: token.span.start.clone(),
                }
            })?,
            TokenType::LocalIdent(name) => {
                // Forward references are allowed; they are checked once
                // the whole module has been scanned.
                self.referenced_types
                    .entry(name.clone())
                    .or_insert(token.span.start);
                Type::Named(name)
            }
            TokenType::LeftBracket => {
                let size = self.expect_uint("array type")?;
                self.expect_word("x", "array type")?;
                let element = self.parse_type()?;
                self.expect(TokenType::RightBracket, "array type")?;
                Type::Array {
                    size,
                    element: Box::new(element),
                }
            }
            TokenType::Less => {
                if self.check(&TokenType::LeftBrace) {
                    self.advance();
                    let fields = self.parse_struct_fields()?;
                    self.expect(TokenType::Greater, "packed struct type")?;
                    Type::Struct {
                        fields,
                        packed: true,
                    }
                } else {
                    let scalable = if self.check_word("vscale") {
                        self.advance();
                        self.expect_word("x", "vector type")?;
                        true
                    } else {
                        false
                    };
                    let size = self.expect_uint("vector type")?;
                    self.expect_word("x", "vector type")?;
                    let element = self.parse_type()?;
                    self.expect(TokenType::Greater, "vector type")?;
                    Type::Vector {
                        size,
                        element: Box::new(element),
                        scalable,
                    }
                }
            }
            TokenType::LeftBrace => {
                let fields = self.parse_struct_fields()?;
                Type::Struct {
                    fields,
                    packed: false,
                }
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a type".to_string(),
                    found: token,
                });
            }
        };

        loop {
            if self.check(&TokenType::Star) {
                self.advance();
                ty = Type::Pointer(Box::new(ty));
            } else if self.check(&TokenType::LeftParen) {
                self.advance();
                let (params, is_vararg) = self.parse_function_type_params()?;
                ty = Type::Function {
                    return_type: Box::new(ty),
                    params,
                    is_vararg,
                };
            } else {
                break;
            }
        }

        Ok(ty)
    }

    /// Parse struct fields after the opening `{`, consuming the
    /// closing `}`
    fn parse_struct_fields(&mut self) -> Result<Vec<Type>, ParseError> {
        let mut fields = Vec::new();

        if self.check(&TokenType::RightBrace) {
            self.advance();
            return Ok(fields);
        }

        loop {
            fields.push(self.parse_type()?);
            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RightBrace, "struct type")?;

        Ok(fields)
    }

    /// Parse the parameter list of a function type after the opening
    /// `(`, consuming the closing `)`
    fn parse_function_type_params(&mut self) -> Result<(Vec<Type>, bool), ParseError> {
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
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "function type")?;

        Ok((params, is_vararg))
    }
}
