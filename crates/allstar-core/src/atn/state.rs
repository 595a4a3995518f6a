//! ATN states.

use std::fmt;

use super::transition::Transition;

/// Index of a state in [`super::Atn::states`].
pub type StateId = usize;

/// Which kind of block a [`StateKind::BlockStart`] opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `( ... )` or `( ... )?`
    Basic,
    /// The body of a `( ... )*` loop.
    Star,
    /// The body of a `( ... )+` loop.
    Plus { loopback: StateId },
}

/// State kind with the payload only that kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateKind {
    Basic,
    RuleStart {
        stop: StateId,
        left_recursive: bool,
    },
    RuleStop,
    BlockStart {
        end: StateId,
        block: BlockKind,
        decision: Option<usize>,
    },
    BlockEnd {
        start: StateId,
    },
    StarLoopEntry {
        loopback: StateId,
        /// Set only on the operator loop of a rewritten left-recursive rule.
        precedence_decision: bool,
        decision: Option<usize>,
    },
    StarLoopback,
    PlusLoopback {
        decision: Option<usize>,
    },
    LoopEnd {
        loopback: StateId,
    },
}

#[derive(Debug, Clone)]
pub struct AtnState {
    pub number: StateId,
    pub rule_index: usize,
    pub kind: StateKind,
    pub transitions: Vec<Transition>,
}

impl AtnState {
    pub fn new(number: StateId, rule_index: usize, kind: StateKind) -> Self {
        Self {
            number,
            rule_index,
            kind,
            transitions: Vec::new(),
        }
    }

    pub fn transition(&self, i: usize) -> &Transition {
        &self.transitions[i]
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// False for a state without transitions, such as the stop state of a
    /// rule nobody calls.
    pub fn only_has_epsilon_transitions(&self) -> bool {
        !self.transitions.is_empty() && self.transitions.iter().all(Transition::is_epsilon)
    }

    /// Block starts, loop entries and plus loopbacks are decision-shaped even
    /// when they have a single alternative.
    pub fn is_decision_state(&self) -> bool {
        matches!(
            self.kind,
            StateKind::BlockStart { .. }
                | StateKind::StarLoopEntry { .. }
                | StateKind::PlusLoopback { .. }
        )
    }

    /// Decision number, present when the state has more than one alternative.
    pub fn decision(&self) -> Option<usize> {
        match self.kind {
            StateKind::BlockStart { decision, .. }
            | StateKind::StarLoopEntry { decision, .. }
            | StateKind::PlusLoopback { decision } => decision,
            _ => None,
        }
    }

    pub fn is_rule_stop(&self) -> bool {
        matches!(self.kind, StateKind::RuleStop)
    }

    pub fn is_precedence_decision(&self) -> bool {
        matches!(
            self.kind,
            StateKind::StarLoopEntry {
                precedence_decision: true,
                ..
            }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StateKind::Basic => "BASIC",
            StateKind::RuleStart { .. } => "RULE_START",
            StateKind::RuleStop => "RULE_STOP",
            StateKind::BlockStart {
                block: BlockKind::Basic,
                ..
            } => "BLOCK_START",
            StateKind::BlockStart {
                block: BlockKind::Star,
                ..
            } => "STAR_BLOCK_START",
            StateKind::BlockStart {
                block: BlockKind::Plus { .. },
                ..
            } => "PLUS_BLOCK_START",
            StateKind::BlockEnd { .. } => "BLOCK_END",
            StateKind::StarLoopEntry { .. } => "STAR_LOOP_ENTRY",
            StateKind::StarLoopback => "STAR_LOOP_BACK",
            StateKind::PlusLoopback { .. } => "PLUS_LOOP_BACK",
            StateKind::LoopEnd { .. } => "LOOP_END",
        }
    }
}

impl fmt::Display for AtnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}
