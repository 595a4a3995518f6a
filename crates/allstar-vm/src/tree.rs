//! Parse tree arena.
//!
//! Rule contexts live in a flat arena and refer to each other by
//! [`ContextId`]. A context's `parent` is the context that invoked it, which
//! for left-recursive rules can change after the fact when the interpreter
//! wraps a finished operand in a new recursion context.

use std::sync::Arc;

use allstar_core::atn::StateId;
use allstar_core::token::escape_ws;
use allstar_core::{Interval, Token, TokenType};
use serde::Serialize;

use crate::error::RecognitionError;

/// Handle of a rule context in a [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Token(Token),
    /// A token consumed or conjured during error recovery.
    Error(Token),
    Rule(ContextId),
}

#[derive(Debug, Clone)]
pub struct RuleNode {
    pub rule_index: usize,
    /// State that invoked this rule; `None` for the outermost context.
    pub invoking_state: Option<StateId>,
    pub parent: Option<ContextId>,
    pub children: Vec<Child>,
    pub start: Option<Token>,
    pub stop: Option<Token>,
    /// Original outer alternative the rule matched, 1-based.
    pub alt_number: usize,
    /// Recognition error that ended this rule early.
    pub exception: Option<RecognitionError>,
}

impl RuleNode {
    fn new(rule_index: usize, parent: Option<ContextId>, invoking_state: Option<StateId>) -> Self {
        Self {
            rule_index,
            invoking_state,
            parent,
            children: Vec::new(),
            start: None,
            stop: None,
            alt_number: 1,
            exception: None,
        }
    }
}

/// Serializable view of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeValue {
    Rule {
        rule: String,
        alt: usize,
        children: Vec<TreeValue>,
    },
    Token {
        #[serde(rename = "type")]
        token_type: TokenType,
        text: String,
    },
    Error {
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    rule_names: Arc<[String]>,
    nodes: Vec<RuleNode>,
}

impl ParseTree {
    pub fn new(rule_names: Arc<[String]>) -> Self {
        Self {
            rule_names,
            nodes: Vec::new(),
        }
    }

    /// Allocates a context without attaching it to its parent's children.
    pub fn create(
        &mut self,
        rule_index: usize,
        parent: Option<ContextId>,
        invoking_state: Option<StateId>,
    ) -> ContextId {
        let id = ContextId(self.nodes.len() as u32);
        self.nodes
            .push(RuleNode::new(rule_index, parent, invoking_state));
        id
    }

    pub fn node(&self, id: ContextId) -> &RuleNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: ContextId) -> &mut RuleNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn rule_names(&self) -> &[String] {
        &self.rule_names
    }

    pub fn rule_name(&self, id: ContextId) -> &str {
        let rule = self.node(id).rule_index;
        self.rule_names.get(rule).map_or("?", String::as_str)
    }

    pub fn add_child(&mut self, parent: ContextId, child: Child) {
        self.node_mut(parent).children.push(child);
    }

    /// Token range covered by `id`.
    ///
    /// `(-1, -2)` when the rule never saw a token; `(start, start - 1)` when it
    /// matched nothing.
    pub fn source_interval(&self, id: ContextId) -> Interval {
        let node = self.node(id);
        let Some(start) = node.start.as_ref().and_then(|t| t.index) else {
            return Interval::new(-1, -2);
        };
        let start = start as i32;
        match node.stop.as_ref().and_then(|t| t.index) {
            Some(stop) if stop as i32 >= start => Interval::new(start, stop as i32),
            _ => Interval::new(start, start - 1),
        }
    }

    /// Text of every token under `id`, EOF excluded.
    pub fn text(&self, id: ContextId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: ContextId, out: &mut String) {
        for child in &self.node(id).children {
            match child {
                Child::Token(t) | Child::Error(t) => {
                    if !t.is_eof()
                        && let Some(text) = &t.text
                    {
                        out.push_str(text);
                    }
                }
                Child::Rule(c) => self.collect_text(*c, out),
            }
        }
    }

    /// Whether `t` is a proper ancestor of `u`.
    ///
    /// A context without a parent is never reported as an ancestor, so the
    /// outermost context answers `false` for everything below it.
    pub fn is_ancestor_of(&self, t: ContextId, u: ContextId) -> bool {
        if self.node(t).parent.is_none() {
            return false;
        }
        let mut p = self.node(u).parent;
        while let Some(id) = p {
            if id == t {
                return true;
            }
            p = self.node(id).parent;
        }
        false
    }

    /// Deepest context under `t` whose tokens cover `start..=stop`.
    pub fn root_of_subtree_enclosing_region(
        &self,
        t: ContextId,
        start: usize,
        stop: usize,
    ) -> Option<ContextId> {
        for child in &self.node(t).children {
            if let Child::Rule(c) = child
                && let Some(found) = self.root_of_subtree_enclosing_region(*c, start, stop)
            {
                return Some(found);
            }
        }
        let node = self.node(t);
        let start_index = node.start.as_ref().and_then(|tok| tok.index)?;
        let covers_stop = match node.stop.as_ref().and_then(|tok| tok.index) {
            None => true,
            Some(stop_index) => stop <= stop_index,
        };
        (start >= start_index && covers_stop).then_some(t)
    }

    /// LISP-style rendering: `(s a (x b) c)`.
    pub fn to_string_tree(&self, id: ContextId) -> String {
        let mut out = String::new();
        self.render(id, false, &mut out);
        out
    }

    /// Like [`to_string_tree`](Self::to_string_tree) with outer alternative
    /// numbers: `(s:1 a (x:1 b) c)`.
    pub fn to_string_tree_with_alts(&self, id: ContextId) -> String {
        let mut out = String::new();
        self.render(id, true, &mut out);
        out
    }

    fn render(&self, id: ContextId, alts: bool, out: &mut String) {
        let node = self.node(id);
        let mut label = escape_ws(self.rule_name(id));
        if alts {
            label = format!("{label}:{}", node.alt_number);
        }
        if node.children.is_empty() {
            out.push_str(&label);
            return;
        }
        out.push('(');
        out.push_str(&label);
        for child in &node.children {
            out.push(' ');
            match child {
                Child::Token(t) | Child::Error(t) => out.push_str(&escape_ws(&t.display_text())),
                Child::Rule(c) => self.render(*c, alts, out),
            }
        }
        out.push(')');
    }

    pub fn to_value(&self, id: ContextId) -> TreeValue {
        let node = self.node(id);
        let children = node
            .children
            .iter()
            .map(|child| match child {
                Child::Token(t) => TreeValue::Token {
                    token_type: t.token_type,
                    text: t.display_text(),
                },
                Child::Error(t) => TreeValue::Error {
                    text: t.display_text(),
                },
                Child::Rule(c) => self.to_value(*c),
            })
            .collect();
        TreeValue::Rule {
            rule: self.rule_name(id).to_string(),
            alt: node.alt_number,
            children,
        }
    }
}
