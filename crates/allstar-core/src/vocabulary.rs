//! Token type names.

use crate::token::{EOF, TokenType};

/// Literal and symbolic names indexed by token type.
///
/// Index 0 is the invalid type and never has a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    literal_names: Vec<Option<String>>,
    symbolic_names: Vec<Option<String>>,
}

impl Vocabulary {
    pub fn new(literal_names: Vec<Option<String>>, symbolic_names: Vec<Option<String>>) -> Self {
        Self {
            literal_names,
            symbolic_names,
        }
    }

    /// Builds a vocabulary from `(symbolic, literal)` pairs for types `1..`.
    ///
    /// Literals are stored quoted, the way they appear in diagnostics.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        let mut literal_names = vec![None];
        let mut symbolic_names = vec![None];
        for (symbolic, literal) in pairs {
            symbolic_names.push(Some(symbolic.to_string()));
            literal_names.push(literal.map(|l| format!("'{l}'")));
        }
        Self::new(literal_names, symbolic_names)
    }

    /// Largest token type with a name.
    pub fn max_token_type(&self) -> TokenType {
        self.literal_names.len().max(self.symbolic_names.len()) as TokenType - 1
    }

    pub fn literal_name(&self, token_type: TokenType) -> Option<&str> {
        let idx = usize::try_from(token_type).ok()?;
        self.literal_names.get(idx)?.as_deref()
    }

    pub fn symbolic_name(&self, token_type: TokenType) -> Option<&str> {
        if token_type == EOF {
            return Some("EOF");
        }
        let idx = usize::try_from(token_type).ok()?;
        self.symbolic_names.get(idx)?.as_deref()
    }

    /// Literal name, else symbolic name, else the number.
    pub fn display_name(&self, token_type: TokenType) -> String {
        if let Some(literal) = self.literal_name(token_type) {
            return literal.to_string();
        }
        if let Some(symbolic) = self.symbolic_name(token_type) {
            return symbolic.to_string();
        }
        token_type.to_string()
    }

    /// Looks a type up by symbolic name or by quoted literal (`'+'`).
    pub fn token_type(&self, name: &str) -> Option<TokenType> {
        if name == "EOF" {
            return Some(EOF);
        }
        let by_symbol = self
            .symbolic_names
            .iter()
            .position(|n| n.as_deref() == Some(name));
        let by_literal = || {
            self.literal_names
                .iter()
                .position(|n| n.as_deref() == Some(name))
        };
        by_symbol.or_else(by_literal).map(|i| i as TokenType)
    }
}
