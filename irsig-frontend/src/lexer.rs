//! Textual LLVM-IR Lexer
//!
//! Tokenizes a textual IR module into a stream of tokens.
//! Handles sigiled identifiers (@global, %local, !metadata), literals,
//! the structural keywords, punctuation, and comments.

use irsig_common::{IrError, SourceLocation, SourceSpan};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// IR token types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    // Literals
    IntLiteral(i64),
    /// Floating-point and oversized hex constants, kept as raw text.
    /// These only occur inside regions the parser skips.
    FloatLiteral(String),
    StringLiteral(String),

    // Sigiled identifiers
    GlobalIdent(String),   // @name
    LocalIdent(String),    // %name
    MetadataIdent(String), // !name or bare !
    AttrGroupRef(u32),     // #0

    // Bare words (type names, linkage/attribute keywords, opcodes, ...)
    Word(String),

    // Structural keywords
    Define,
    Declare,
    Type,
    Target,
    Global,
    Constant,
    Attributes,
    SourceFilename,

    // Punctuation
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Less,         // <
    Greater,      // >
    Equal,        // =
    Star,         // *
    Comma,        // ,
    Colon,        // :
    Ellipsis,     // ...

    EndOfFile,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::IntLiteral(n) => write!(f, "{}", n),
            TokenType::FloatLiteral(s) => write!(f, "{}", s),
            TokenType::StringLiteral(s) => write!(f, "\"{}\"", s),
            TokenType::GlobalIdent(s) => write!(f, "@{}", s),
            TokenType::LocalIdent(s) => write!(f, "%{}", s),
            TokenType::MetadataIdent(s) => write!(f, "!{}", s),
            TokenType::AttrGroupRef(n) => write!(f, "#{}", n),
            TokenType::Word(s) => write!(f, "{}", s),

            TokenType::Define => write!(f, "define"),
            TokenType::Declare => write!(f, "declare"),
            TokenType::Type => write!(f, "type"),
            TokenType::Target => write!(f, "target"),
            TokenType::Global => write!(f, "global"),
            TokenType::Constant => write!(f, "constant"),
            TokenType::Attributes => write!(f, "attributes"),
            TokenType::SourceFilename => write!(f, "source_filename"),

            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::LeftBracket => write!(f, "["),
            TokenType::RightBracket => write!(f, "]"),
            TokenType::Less => write!(f, "<"),
            TokenType::Greater => write!(f, ">"),
            TokenType::Equal => write!(f, "="),
            TokenType::Star => write!(f, "*"),
            TokenType::Comma => write!(f, ","),
            TokenType::Colon => write!(f, ":"),
            TokenType::Ellipsis => write!(f, "..."),

            TokenType::EndOfFile => write!(f, "EOF"),
        }
    }
}

/// A token with location information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, span: SourceSpan) -> Self {
        Self { token_type, span }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self {
            token_type: TokenType::EndOfFile,
            span: SourceSpan::new(location.clone(), location),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.token_type, self.span.start)
    }
}

/// Textual IR lexer
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    filename: String,
    keywords: HashMap<String, TokenType>,
}

impl Lexer {
    /// Create a new lexer; `filename` is carried into token spans for
    /// diagnostics
    pub fn new(input: &str, filename: &str) -> Self {
        let mut lexer = Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            filename: filename.to_string(),
            keywords: HashMap::new(),
        };

        lexer.initialize_keywords();
        lexer
    }

    /// Initialize keyword map
    fn initialize_keywords(&mut self) {
        let keywords = [
            ("define", TokenType::Define),
            ("declare", TokenType::Declare),
            ("type", TokenType::Type),
            ("target", TokenType::Target),
            ("global", TokenType::Global),
            ("constant", TokenType::Constant),
            ("attributes", TokenType::Attributes),
            ("source_filename", TokenType::SourceFilename),
        ];

        for (keyword, token_type) in keywords {
            self.keywords.insert(keyword.to_string(), token_type);
        }
    }

    /// Get current character
    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(ch)
        } else {
            None
        }
    }

    /// Get current location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(&self.filename, self.line, self.column)
    }

    /// Skip whitespace and `;` comments
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                // Comment runs to end of line
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// First character of a bare word
    fn is_word_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$'
    }

    /// Subsequent characters of a bare word
    fn is_word_continue(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '.'
    }

    /// Characters allowed in sigiled identifiers (@x, %x, !x)
    fn is_ident_char(ch: char) -> bool {
        ch.is_alphanumeric() || matches!(ch, '_' | '$' | '.' | '-')
    }

    /// Tokenize a bare word or keyword
    fn tokenize_word(&mut self) -> TokenType {
        let mut word = String::new();

        while let Some(ch) = self.current_char() {
            if Self::is_word_continue(ch) {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(keyword_token) = self.keywords.get(&word) {
            keyword_token.clone()
        } else {
            TokenType::Word(word)
        }
    }

    /// Read the body of a `"..."` string; the opening quote has not
    /// been consumed yet. Escapes (`\5C` style) are kept as raw text:
    /// nothing downstream consumes string contents.
    fn tokenize_string(&mut self) -> Result<TokenType, IrError> {
        self.advance(); // opening quote

        let mut contents = String::new();
        loop {
            match self.current_char() {
                Some('"') => {
                    self.advance();
                    return Ok(TokenType::StringLiteral(contents));
                }
                Some(ch) => {
                    contents.push(ch);
                    self.advance();
                }
                None => {
                    return Err(IrError::lexer_error(
                        "Unterminated string literal".to_string(),
                        self.current_location(),
                    ));
                }
            }
        }
    }

    /// Tokenize the name after a `@`, `%`, or `!` sigil (the sigil has
    /// already been consumed). Quoted names are accepted; metadata
    /// references may have an empty name (`!{`, `!"..."`).
    fn tokenize_sigil_name(&mut self) -> Result<String, IrError> {
        if self.current_char() == Some('"') {
            match self.tokenize_string()? {
                TokenType::StringLiteral(s) => return Ok(s),
                _ => unreachable!(),
            }
        }

        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_ident_char(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok(name)
    }

    /// Tokenize a numeric literal. Integers that fit in i64 become
    /// `IntLiteral`; everything else (floats, hex float constants,
    /// oversized hex) is kept raw as `FloatLiteral`.
    fn tokenize_number(&mut self) -> Result<TokenType, IrError> {
        let mut text = String::new();

        if matches!(self.current_char(), Some('-') | Some('+')) {
            text.push(self.current_char().unwrap());
            self.advance();
        }

        // Hex constants, including the fp80/fp128 markers (0xK..., 0xL...)
        if self.current_char() == Some('0') && matches!(self.peek_char(1), Some('x') | Some('X')) {
            text.push_str("0x");
            self.advance();
            self.advance();

            if let Some(marker) = self.current_char() {
                if matches!(marker, 'K' | 'L' | 'M' | 'H' | 'R') {
                    text.push(marker);
                    self.advance();
                }
            }

            let digits_start = text.len();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_hexdigit() {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }

            if text.len() == digits_start {
                return Err(IrError::lexer_error(
                    format!("Invalid hex literal: {}", text),
                    self.current_location(),
                ));
            }

            // Only plain hex that fits i64 is a usable integer
            if text.starts_with("0x") && !text.starts_with("0xK") {
                if let Ok(value) = i64::from_str_radix(&text[2..], 16) {
                    return Ok(TokenType::IntLiteral(value));
                }
            }
            return Ok(TokenType::FloatLiteral(text));
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.current_char() == Some('.') && self.peek_char(1) != Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.current_char(), Some('e') | Some('E')) {
            is_float = true;
            text.push(self.current_char().unwrap());
            self.advance();
            if matches!(self.current_char(), Some('+') | Some('-')) {
                text.push(self.current_char().unwrap());
                self.advance();
            }
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if is_float {
            return Ok(TokenType::FloatLiteral(text));
        }

        let value = text.parse::<i64>().map_err(|_| {
            IrError::lexer_error(
                format!("Invalid integer literal: {}", text),
                self.current_location(),
            )
        })?;

        Ok(TokenType::IntLiteral(value))
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, IrError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            let start = self.current_location();
            let Some(ch) = self.current_char() else {
                tokens.push(Token::eof(start));
                break;
            };

            let token_type = match ch {
                // `c"..."` string constant
                'c' if self.peek_char(1) == Some('"') => {
                    self.advance();
                    self.tokenize_string()?
                }
                _ if Self::is_word_start(ch) => self.tokenize_word(),
                _ if ch.is_ascii_digit() => self.tokenize_number()?,
                '-' | '+' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.tokenize_number()?
                }
                '"' => self.tokenize_string()?,
                '@' => {
                    self.advance();
                    TokenType::GlobalIdent(self.tokenize_sigil_name()?)
                }
                '%' => {
                    self.advance();
                    TokenType::LocalIdent(self.tokenize_sigil_name()?)
                }
                '!' => {
                    self.advance();
                    TokenType::MetadataIdent(self.tokenize_sigil_name()?)
                }
                '#' => {
                    self.advance();
                    let mut digits = String::new();
                    while let Some(c) = self.current_char() {
                        if c.is_ascii_digit() {
                            digits.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let n = digits.parse::<u32>().map_err(|_| {
                        IrError::lexer_error(
                            "Invalid attribute group reference".to_string(),
                            self.current_location(),
                        )
                    })?;
                    TokenType::AttrGroupRef(n)
                }
                '.' => {
                    if self.peek_char(1) == Some('.') && self.peek_char(2) == Some('.') {
                        self.advance();
                        self.advance();
                        self.advance();
                        TokenType::Ellipsis
                    } else {
                        return Err(IrError::lexer_error(
                            "Unexpected character: .".to_string(),
                            start,
                        ));
                    }
                }
                '(' => {
                    self.advance();
                    TokenType::LeftParen
                }
                ')' => {
                    self.advance();
                    TokenType::RightParen
                }
                '{' => {
                    self.advance();
                    TokenType::LeftBrace
                }
                '}' => {
                    self.advance();
                    TokenType::RightBrace
                }
                '[' => {
                    self.advance();
                    TokenType::LeftBracket
                }
                ']' => {
                    self.advance();
                    TokenType::RightBracket
                }
                '<' => {
                    self.advance();
                    TokenType::Less
                }
                '>' => {
                    self.advance();
                    TokenType::Greater
                }
                '=' => {
                    self.advance();
                    TokenType::Equal
                }
                '*' => {
                    self.advance();
                    TokenType::Star
                }
                ',' => {
                    self.advance();
                    TokenType::Comma
                }
                ':' => {
                    self.advance();
                    TokenType::Colon
                }
                _ => {
                    return Err(IrError::lexer_error(
                        format!("Unexpected character: {}", ch),
                        start,
                    ));
                }
            };

            let end = self.current_location();
            tokens.push(Token::new(token_type, SourceSpan::new(start, end)));
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(input, "test.ll");
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_tokenize_declare_line() {
        let tokens = tokenize("declare i32 @foo(i32, i8*)");
        assert_eq!(
            tokens,
            vec![
                TokenType::Declare,
                TokenType::Word("i32".to_string()),
                TokenType::GlobalIdent("foo".to_string()),
                TokenType::LeftParen,
                TokenType::Word("i32".to_string()),
                TokenType::Comma,
                TokenType::Word("i8".to_string()),
                TokenType::Star,
                TokenType::RightParen,
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_tokenize_intrinsic_name() {
        let tokens = tokenize("@llvm.dbg.value");
        assert_eq!(
            tokens[0],
            TokenType::GlobalIdent("llvm.dbg.value".to_string())
        );
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = tokenize("; ModuleID = 'm'\ndefine ; trailing\nvoid");
        assert_eq!(
            tokens,
            vec![
                TokenType::Define,
                TokenType::Word("void".to_string()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_tokenize_ellipsis_and_punctuation() {
        let tokens = tokenize("(...) = { } [ 4 x ] <2>");
        assert_eq!(
            tokens,
            vec![
                TokenType::LeftParen,
                TokenType::Ellipsis,
                TokenType::RightParen,
                TokenType::Equal,
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::LeftBracket,
                TokenType::IntLiteral(4),
                TokenType::Word("x".to_string()),
                TokenType::RightBracket,
                TokenType::Less,
                TokenType::IntLiteral(2),
                TokenType::Greater,
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_tokenize_string_and_c_string() {
        let tokens = tokenize(r#"source_filename = "lib.rs" c"hi\00""#);
        assert_eq!(
            tokens,
            vec![
                TokenType::SourceFilename,
                TokenType::Equal,
                TokenType::StringLiteral("lib.rs".to_string()),
                TokenType::StringLiteral("hi\\00".to_string()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("42 -7 1.5 1.000000e+00 0x1F 0x402E000000000000");
        assert_eq!(
            tokens,
            vec![
                TokenType::IntLiteral(42),
                TokenType::IntLiteral(-7),
                TokenType::FloatLiteral("1.5".to_string()),
                TokenType::FloatLiteral("1.000000e+00".to_string()),
                TokenType::IntLiteral(0x1F),
                TokenType::IntLiteral(0x402E000000000000),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_tokenize_sigils() {
        let tokens = tokenize("%struct.Foo %5 @\"odd name\" !dbg !7 #0");
        assert_eq!(
            tokens,
            vec![
                TokenType::LocalIdent("struct.Foo".to_string()),
                TokenType::LocalIdent("5".to_string()),
                TokenType::GlobalIdent("odd name".to_string()),
                TokenType::MetadataIdent("dbg".to_string()),
                TokenType::MetadataIdent("7".to_string()),
                TokenType::AttrGroupRef(0),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let mut lexer = Lexer::new("define\n  declare", "input.ll");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].span.start.line, 1);
        assert_eq!(tokens[0].span.start.filename, "input.ll");
        assert_eq!(tokens[1].span.start.line, 2);
        assert_eq!(tokens[1].span.start.column, 3);
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("declare ?", "test.ll");
        let err = lexer.tokenize().unwrap_err();
        assert!(matches!(err, IrError::LexError { .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("source_filename = \"oops", "test.ll");
        let err = lexer.tokenize().unwrap_err();
        assert!(matches!(err, IrError::LexError { .. }));
    }
}
