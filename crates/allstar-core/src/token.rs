//! Tokens as the interpreter sees them.
//!
//! Token types are plain integers: user types start at [`MIN_USER_TOKEN_TYPE`],
//! and two negative values are reserved for end of input and epsilon.

use std::fmt;

/// Token type number.
pub type TokenType = i32;

/// End of input.
pub const EOF: TokenType = -1;
/// Empty lookahead marker used by lookahead sets.
pub const EPSILON: TokenType = -2;
/// Type of tokens conjured for unmatchable positions.
pub const INVALID_TYPE: TokenType = 0;
/// Smallest type a grammar can assign.
pub const MIN_USER_TOKEN_TYPE: TokenType = 1;

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub token_type: TokenType,
    pub text: Option<String>,
    /// Position in the token stream. `None` for tokens synthesized during recovery.
    pub index: Option<usize>,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(token_type: TokenType, text: impl Into<String>) -> Self {
        Self {
            token_type,
            text: Some(text.into()),
            index: None,
            line: 1,
            column: 0,
        }
    }

    pub fn eof() -> Self {
        Self {
            token_type: EOF,
            text: None,
            index: None,
            line: 1,
            column: 0,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == EOF
    }

    /// Conjured tokens have no stream position.
    pub fn is_synthetic(&self) -> bool {
        self.index.is_none()
    }

    /// Text used in parse tree rendering.
    pub fn display_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None if self.token_type == EOF => "<EOF>".to_string(),
            None => format!("<{}>", self.token_type),
        }
    }

    /// Quoted text used in error messages, with whitespace escaped.
    pub fn error_display(&self) -> String {
        let text = match &self.text {
            Some(text) => text.clone(),
            None if self.token_type == EOF => "<EOF>".to_string(),
            None => format!("<{}>", self.token_type),
        };
        escape_ws_and_quote(&text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.map_or(-1, |i| i as i64);
        write!(
            f,
            "[@{index},'{}',<{}>,{}:{}]",
            escape_ws(&self.display_text()),
            self.token_type,
            self.line,
            self.column
        )
    }
}

pub fn escape_ws(s: &str) -> String {
    s.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

pub fn escape_ws_and_quote(s: &str) -> String {
    format!("'{}'", escape_ws(s))
}
