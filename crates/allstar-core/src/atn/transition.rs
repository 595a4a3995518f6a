//! ATN transitions.

use crate::interval_set::IntervalSet;
use crate::token::TokenType;

use super::state::StateId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: StateId,
    pub kind: TransitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    Epsilon {
        /// Rule index when this edge leaves the stop state of a left-recursive
        /// rule invoked at precedence 0.
        outermost_precedence_return: Option<usize>,
    },
    Atom(TokenType),
    Range(TokenType, TokenType),
    Set(IntervalSet),
    NotSet(IntervalSet),
    Wildcard,
    Rule {
        follow: StateId,
        rule_index: usize,
        precedence: i32,
    },
    Action {
        rule_index: usize,
        action_index: usize,
    },
    Predicate {
        rule_index: usize,
        pred_index: usize,
        ctx_dependent: bool,
    },
    Precedence {
        precedence: i32,
    },
}

impl Transition {
    pub fn new(target: StateId, kind: TransitionKind) -> Self {
        Self { target, kind }
    }

    pub fn epsilon(target: StateId) -> Self {
        Self::new(
            target,
            TransitionKind::Epsilon {
                outermost_precedence_return: None,
            },
        )
    }

    /// Epsilon-like transitions consume no input.
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self.kind,
            TransitionKind::Epsilon { .. }
                | TransitionKind::Rule { .. }
                | TransitionKind::Action { .. }
                | TransitionKind::Predicate { .. }
                | TransitionKind::Precedence { .. }
        )
    }

    pub fn matches(&self, symbol: TokenType, min: TokenType, max: TokenType) -> bool {
        match &self.kind {
            TransitionKind::Atom(t) => *t == symbol,
            TransitionKind::Range(a, b) => (*a..=*b).contains(&symbol),
            TransitionKind::Set(set) => set.contains(symbol),
            TransitionKind::NotSet(set) => {
                symbol >= min && symbol <= max && !set.contains(symbol)
            }
            TransitionKind::Wildcard => symbol >= min && symbol <= max,
            _ => false,
        }
    }

    /// Symbols matched by a labeled transition. Not-set transitions return the
    /// excluded set.
    pub fn label(&self) -> Option<IntervalSet> {
        match &self.kind {
            TransitionKind::Atom(t) => Some(IntervalSet::of(*t)),
            TransitionKind::Range(a, b) => Some(IntervalSet::of_range(*a, *b)),
            TransitionKind::Set(set) | TransitionKind::NotSet(set) => Some(set.clone()),
            _ => None,
        }
    }

    pub fn outermost_precedence_return(&self) -> Option<usize> {
        match self.kind {
            TransitionKind::Epsilon {
                outermost_precedence_return,
            } => outermost_precedence_return,
            _ => None,
        }
    }
}
