//! Grammar type definitions.

use serde::{Deserialize, Serialize};

use crate::token::{MIN_USER_TOKEN_TYPE, TokenType};
use crate::vocabulary::Vocabulary;

/// Byte range into the grammar source, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Complete parser grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    pub name: String,
    /// Token definitions; the definition at position `i` has type `i + 1`.
    pub tokens: Vec<TokenDef>,
    /// Parser rules, preserving definition order.
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDef {
    pub name: String,
    /// Literal text without quotes, e.g. `+` for `PLUS : '+'`.
    pub literal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub span: Option<Span>,
    /// Filled in by the left-recursion rewrite.
    #[serde(default)]
    pub left_recursive: Option<LeftRecursiveRule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Alternative {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub assoc: Assoc,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Assoc {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quantifier {
    #[default]
    One,
    Optional,
    Star,
    Plus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Token {
        name: String,
        label: Option<String>,
    },
    Rule {
        name: String,
        label: Option<String>,
        /// Argument text of a parameterized call, e.g. `[$scope]`.
        args: Option<String>,
        /// Precedence argument for calls to left-recursive rules.
        precedence: Option<i32>,
    },
    Wildcard,
    Set {
        names: Vec<String>,
    },
    NotSet {
        names: Vec<String>,
    },
    Block {
        alternatives: Vec<Alternative>,
        quantifier: Quantifier,
    },
    Action {
        index: usize,
    },
    Predicate {
        index: usize,
        ctx_dependent: bool,
    },
    PrecedencePredicate {
        precedence: i32,
    },
}

/// Shape of one alternative of a left-recursive rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltKind {
    /// No leading or trailing self reference.
    Primary,
    /// Trailing self reference only, e.g. `'-' e`.
    Prefix,
    /// Leading and trailing self reference, e.g. `e '+' e`.
    Binary,
    /// Binary with an inner self reference, e.g. `e '?' e ':' e`.
    Ternary,
    /// Leading self reference only, e.g. `e '++'`.
    Suffix,
}

impl AltKind {
    /// Operator alternatives live in the precedence loop.
    pub fn is_operator(self) -> bool {
        matches!(self, Self::Binary | Self::Ternary | Self::Suffix)
    }
}

/// Record kept for each original alternative of a rewritten rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftRecursiveAltInfo {
    pub kind: AltKind,
    /// 1-based position among the original alternatives.
    pub alt_number: usize,
    /// Zero for primary alternatives.
    pub precedence: i32,
    /// Precedence passed to the trailing self reference.
    pub next_precedence: Option<i32>,
    pub original: Alternative,
    pub rewritten: Alternative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftRecursiveRule {
    pub original_alternatives: Vec<Alternative>,
    pub alts: Vec<LeftRecursiveAltInfo>,
}

impl LeftRecursiveRule {
    /// Original alternative numbers of the primary block, in block order.
    pub fn primary_alts(&self) -> Vec<usize> {
        self.alts
            .iter()
            .filter(|a| !a.kind.is_operator())
            .map(|a| a.alt_number)
            .collect()
    }

    /// Original alternative numbers of the operator loop, in loop order.
    pub fn op_alts(&self) -> Vec<usize> {
        self.alts
            .iter()
            .filter(|a| a.kind.is_operator())
            .map(|a| a.alt_number)
            .collect()
    }
}

impl Grammar {
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name.clone()).collect()
    }

    /// Type of a token by name or by literal text (`'+'` or `+`).
    pub fn token_type(&self, name: &str) -> Option<TokenType> {
        if name == "EOF" {
            return Some(crate::token::EOF);
        }
        let unquoted = name
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(name);
        let by_name = self.tokens.iter().position(|t| t.name == name);
        let by_literal = || {
            self.tokens
                .iter()
                .position(|t| t.literal.as_deref() == Some(unquoted))
        };
        by_name
            .or_else(by_literal)
            .map(|i| i as TokenType + MIN_USER_TOKEN_TYPE)
    }

    pub fn max_token_type(&self) -> TokenType {
        self.tokens.len() as TokenType
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::from_pairs(
            self.tokens
                .iter()
                .map(|t| (t.name.as_str(), t.literal.as_deref())),
        )
    }
}
