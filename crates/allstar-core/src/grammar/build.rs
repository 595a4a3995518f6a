//! Programmatic grammar construction.
//!
//! ```
//! use allstar_core::grammar::{Grammar, alt, rule_ref, token};
//!
//! let g = Grammar::new("T")
//!     .token("A", Some("a"))
//!     .rule("s", vec![alt([token("A")])]);
//! assert_eq!(g.rules[0].alternatives[0].elements, vec![token("A")]);
//! # let _ = rule_ref("s");
//! ```

use super::types::{Alternative, Assoc, Element, Grammar, Quantifier, Rule, Span, TokenDef};

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokens: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Defines the next token type.
    pub fn token(mut self, name: impl Into<String>, literal: Option<&str>) -> Self {
        self.tokens.push(TokenDef {
            name: name.into(),
            literal: literal.map(str::to_string),
        });
        self
    }

    pub fn rule(mut self, name: impl Into<String>, alternatives: Vec<Alternative>) -> Self {
        self.rules.push(Rule {
            name: name.into(),
            alternatives,
            span: None,
            left_recursive: None,
        });
        self
    }
}

impl Alternative {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            ..Default::default()
        }
    }

    pub fn right_assoc(mut self) -> Self {
        self.assoc = Assoc::Right;
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

pub fn alt(elements: impl IntoIterator<Item = Element>) -> Alternative {
    Alternative::new(elements.into_iter().collect())
}

pub fn token(name: &str) -> Element {
    Element::Token {
        name: name.to_string(),
        label: None,
    }
}

pub fn rule_ref(name: &str) -> Element {
    Element::Rule {
        name: name.to_string(),
        label: None,
        args: None,
        precedence: None,
    }
}

/// Rule reference with an argument list, e.g. `dval[1]`.
pub fn rule_call(name: &str, args: &str) -> Element {
    Element::Rule {
        name: name.to_string(),
        label: None,
        args: Some(args.to_string()),
        precedence: None,
    }
}

/// Attaches `label` to a token or rule reference.
pub fn labeled(label: &str, element: Element) -> Element {
    match element {
        Element::Token { name, .. } => Element::Token {
            name,
            label: Some(label.to_string()),
        },
        Element::Rule {
            name,
            args,
            precedence,
            ..
        } => Element::Rule {
            name,
            label: Some(label.to_string()),
            args,
            precedence,
        },
        other => other,
    }
}

pub fn wildcard() -> Element {
    Element::Wildcard
}

pub fn set(names: &[&str]) -> Element {
    Element::Set {
        names: names.iter().map(|n| n.to_string()).collect(),
    }
}

pub fn not_set(names: &[&str]) -> Element {
    Element::NotSet {
        names: names.iter().map(|n| n.to_string()).collect(),
    }
}

pub fn block(alternatives: Vec<Alternative>) -> Element {
    Element::Block {
        alternatives,
        quantifier: Quantifier::One,
    }
}

pub fn optional(alternatives: Vec<Alternative>) -> Element {
    Element::Block {
        alternatives,
        quantifier: Quantifier::Optional,
    }
}

pub fn star(alternatives: Vec<Alternative>) -> Element {
    Element::Block {
        alternatives,
        quantifier: Quantifier::Star,
    }
}

pub fn plus(alternatives: Vec<Alternative>) -> Element {
    Element::Block {
        alternatives,
        quantifier: Quantifier::Plus,
    }
}

pub fn action(index: usize) -> Element {
    Element::Action { index }
}

pub fn predicate(index: usize) -> Element {
    Element::Predicate {
        index,
        ctx_dependent: false,
    }
}

pub fn precpred(precedence: i32) -> Element {
    Element::PrecedencePredicate { precedence }
}
