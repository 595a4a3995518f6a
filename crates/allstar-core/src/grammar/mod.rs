//! Grammar model: tokens, rules, alternatives and elements.
//!
//! Grammars come from JSON ([`Grammar::from_json`]) or from the builder
//! functions in this module. Left-recursive rules are rewritten in place by
//! the compiler, which records the original alternatives alongside.

mod build;
mod display;
mod json;
mod types;

#[cfg(test)]
mod display_tests;

pub use build::{
    action, alt, block, labeled, not_set, optional, plus, precpred, predicate, rule_call,
    rule_ref, set, star, token, wildcard,
};
pub use json::GrammarError;
pub use types::{
    AltKind, Alternative, Assoc, Element, Grammar, LeftRecursiveAltInfo, LeftRecursiveRule,
    Quantifier, Rule, Span, TokenDef,
};
