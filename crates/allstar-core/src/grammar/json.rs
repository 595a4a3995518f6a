//! JSON deserialization for grammar files.
//!
//! Rule bodies use internally tagged objects with a `type` field, in the
//! spirit of tree-sitter's `grammar.json`:
//!
//! ```json
//! {
//!   "name": "Expr",
//!   "tokens": { "INT": null, "PLUS": "+" },
//!   "rules": {
//!     "e": { "type": "CHOICE", "members": [
//!       { "type": "SEQ", "members": [
//!         { "type": "RULE", "name": "e" },
//!         { "type": "TOKEN", "name": "PLUS" },
//!         { "type": "RULE", "name": "e" }
//!       ]},
//!       { "type": "TOKEN", "name": "INT" }
//!     ]}
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Alternative, Assoc, Element, Grammar, Quantifier, Rule, Span, TokenDef};

/// Error during grammar loading.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rule `{rule}`: {message}")]
    Shape { rule: String, message: String },
}

impl Grammar {
    /// Parse grammar from JSON string.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json)?;
        raw.try_into()
    }
}

#[derive(Debug, Deserialize)]
struct RawGrammar {
    name: String,
    /// Token name to optional literal, in type order.
    #[serde(default)]
    tokens: IndexMap<String, Option<String>>,
    rules: IndexMap<String, RawNode>,
}

impl TryFrom<RawGrammar> for Grammar {
    type Error = GrammarError;

    fn try_from(raw: RawGrammar) -> Result<Self, Self::Error> {
        let tokens = raw
            .tokens
            .into_iter()
            .map(|(name, literal)| TokenDef { name, literal })
            .collect();

        // IndexMap preserves definition order; the first rule is the usual entry.
        let rules = raw
            .rules
            .into_iter()
            .map(|(name, body)| {
                let span = body.span();
                let alternatives = body.into_alternatives().map_err(|message| {
                    GrammarError::Shape {
                        rule: name.clone(),
                        message,
                    }
                })?;
                Ok(Rule {
                    name,
                    alternatives,
                    span,
                    left_recursive: None,
                })
            })
            .collect::<Result<_, GrammarError>>()?;

        Ok(Grammar {
            name: raw.name,
            tokens,
            rules,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
enum RawNode {
    BLANK,
    TOKEN {
        name: String,
        #[serde(default)]
        label: Option<String>,
    },
    RULE {
        name: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        args: Option<String>,
        #[serde(default)]
        precedence: Option<i32>,
    },
    WILDCARD,
    SET {
        members: Vec<String>,
    },
    NOT_SET {
        members: Vec<String>,
    },
    SEQ {
        members: Vec<RawNode>,
    },
    CHOICE {
        members: Vec<RawNode>,
        #[serde(default)]
        span: Option<Span>,
    },
    ALT {
        content: Box<RawNode>,
        #[serde(default)]
        assoc: Option<String>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        span: Option<Span>,
    },
    OPTIONAL {
        content: Box<RawNode>,
    },
    REPEAT {
        content: Box<RawNode>,
    },
    REPEAT1 {
        content: Box<RawNode>,
    },
    ACTION {
        index: usize,
    },
    PREDICATE {
        index: usize,
        #[serde(default)]
        ctx_dependent: bool,
    },
    PRECEDENCE {
        value: i32,
    },
}

impl RawNode {
    fn span(&self) -> Option<Span> {
        match self {
            RawNode::CHOICE { span, .. } | RawNode::ALT { span, .. } => *span,
            _ => None,
        }
    }

    /// A rule body or block content: a `CHOICE` yields one alternative per
    /// member, anything else is a single alternative.
    fn into_alternatives(self) -> Result<Vec<Alternative>, String> {
        match self {
            RawNode::CHOICE { members, .. } => {
                members.into_iter().map(RawNode::into_alternative).collect()
            }
            other => Ok(vec![other.into_alternative()?]),
        }
    }

    fn into_alternative(self) -> Result<Alternative, String> {
        match self {
            RawNode::ALT {
                content,
                assoc,
                label,
                span,
            } => {
                let assoc = match assoc.as_deref() {
                    None | Some("left") => Assoc::Left,
                    Some("right") => Assoc::Right,
                    Some(other) => return Err(format!("unknown associativity `{other}`")),
                };
                let inner = content.into_alternative()?;
                Ok(Alternative {
                    elements: inner.elements,
                    assoc,
                    label,
                    span,
                })
            }
            RawNode::SEQ { members } => {
                let mut elements = Vec::with_capacity(members.len());
                for member in members {
                    if let Some(element) = member.into_element()? {
                        elements.push(element);
                    }
                }
                Ok(Alternative {
                    elements,
                    ..Default::default()
                })
            }
            other => Ok(Alternative {
                elements: other.into_element()?.into_iter().collect(),
                ..Default::default()
            }),
        }
    }

    fn into_element(self) -> Result<Option<Element>, String> {
        let block = |content: Box<RawNode>, quantifier| -> Result<Option<Element>, String> {
            Ok(Some(Element::Block {
                alternatives: content.into_alternatives()?,
                quantifier,
            }))
        };

        let element = match self {
            RawNode::BLANK => return Ok(None),
            RawNode::TOKEN { name, label } => Element::Token { name, label },
            RawNode::RULE {
                name,
                label,
                args,
                precedence,
            } => Element::Rule {
                name,
                label,
                args,
                precedence,
            },
            RawNode::WILDCARD => Element::Wildcard,
            RawNode::SET { members } => Element::Set { names: members },
            RawNode::NOT_SET { members } => Element::NotSet { names: members },
            RawNode::SEQ { .. } => {
                return Ok(Some(Element::Block {
                    alternatives: vec![self.into_alternative()?],
                    quantifier: Quantifier::One,
                }));
            }
            RawNode::CHOICE { members, .. } => Element::Block {
                alternatives: members
                    .into_iter()
                    .map(RawNode::into_alternative)
                    .collect::<Result<_, _>>()?,
                quantifier: Quantifier::One,
            },
            RawNode::ALT { .. } => return Err("`ALT` is only allowed inside `CHOICE`".into()),
            RawNode::OPTIONAL { content } => return block(content, Quantifier::Optional),
            RawNode::REPEAT { content } => return block(content, Quantifier::Star),
            RawNode::REPEAT1 { content } => return block(content, Quantifier::Plus),
            RawNode::ACTION { index } => Element::Action { index },
            RawNode::PREDICATE {
                index,
                ctx_dependent,
            } => Element::Predicate {
                index,
                ctx_dependent,
            },
            RawNode::PRECEDENCE { value } => Element::PrecedencePredicate { precedence: value },
        };
        Ok(Some(element))
    }
}
