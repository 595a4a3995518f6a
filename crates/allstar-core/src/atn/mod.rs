//! Augmented transition network: the grammar compiled to a state graph.
//!
//! The graph is built once per grammar and is read-only afterwards. It is
//! `Sync` and shared by every interpreter parsing with that grammar.

mod context;
mod ll1;
mod state;
mod transition;

#[cfg(test)]
mod atn_tests;

use std::sync::{Arc, OnceLock};

pub use context::PredictionContext;
pub use ll1::{HIT_PRED, Ll1Analyzer};
pub use state::{AtnState, BlockKind, StateId, StateKind};
pub use transition::{Transition, TransitionKind};

use crate::interval_set::IntervalSet;
use crate::token::{EOF, EPSILON, TokenType};

/// Original alternative numbers of a rewritten left-recursive rule.
///
/// `primary_alts[i]` is the original alternative matched by alternative
/// `i + 1` of the primary block; `op_alts[i]` likewise for the operator loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeftRecursiveRuleInfo {
    pub primary_alts: Vec<usize>,
    pub op_alts: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct Atn {
    pub states: Vec<AtnState>,
    pub decision_to_state: Vec<StateId>,
    pub rule_to_start: Vec<StateId>,
    pub rule_to_stop: Vec<StateId>,
    pub rule_names: Vec<String>,
    pub max_token_type: TokenType,
    pub left_recursive_rules: Vec<Option<LeftRecursiveRuleInfo>>,
    next_tokens_within_rule: Vec<OnceLock<IntervalSet>>,
}

impl Atn {
    pub fn new(rule_names: Vec<String>, max_token_type: TokenType) -> Self {
        let rules = rule_names.len();
        Self {
            rule_names,
            max_token_type,
            rule_to_start: Vec::with_capacity(rules),
            rule_to_stop: Vec::with_capacity(rules),
            left_recursive_rules: vec![None; rules],
            ..Default::default()
        }
    }

    pub fn add_state(&mut self, rule_index: usize, kind: StateKind) -> StateId {
        let number = self.states.len();
        self.states.push(AtnState::new(number, rule_index, kind));
        self.next_tokens_within_rule.push(OnceLock::new());
        number
    }

    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.states[from].transitions.push(transition);
    }

    /// Assigns the next decision number to `s`.
    pub fn define_decision(&mut self, s: StateId) -> usize {
        let decision = self.decision_to_state.len();
        self.decision_to_state.push(s);
        match &mut self.states[s].kind {
            StateKind::BlockStart { decision: d, .. }
            | StateKind::StarLoopEntry { decision: d, .. }
            | StateKind::PlusLoopback { decision: d } => *d = Some(decision),
            _ => {}
        }
        decision
    }

    pub fn state(&self, s: StateId) -> &AtnState {
        &self.states[s]
    }

    pub fn state_mut(&mut self, s: StateId) -> &mut AtnState {
        &mut self.states[s]
    }

    pub fn num_decisions(&self) -> usize {
        self.decision_to_state.len()
    }

    pub fn decision_state(&self, decision: usize) -> &AtnState {
        &self.states[self.decision_to_state[decision]]
    }

    pub fn rule_start(&self, rule_index: usize) -> &AtnState {
        &self.states[self.rule_to_start[rule_index]]
    }

    pub fn is_left_recursive(&self, rule_index: usize) -> bool {
        matches!(
            self.rule_start(rule_index).kind,
            StateKind::RuleStart {
                left_recursive: true,
                ..
            }
        )
    }

    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rule_names.iter().position(|n| n == name)
    }

    /// Tokens that can follow `s` within its rule; [`EPSILON`] marks that the
    /// end of the rule is reachable. Computed once per state.
    pub fn next_tokens(&self, s: StateId) -> &IntervalSet {
        self.next_tokens_within_rule[s].get_or_init(|| Ll1Analyzer::new(self).look(s, None, None))
    }

    /// Tokens that can follow `s` given the caller stack `ctx`.
    pub fn next_tokens_in_context(&self, s: StateId, ctx: &Arc<PredictionContext>) -> IntervalSet {
        Ll1Analyzer::new(self).look(s, None, Some(ctx))
    }

    /// Tokens expected at `s` when the active rule invocations were made from
    /// `invoking_states` (innermost first).
    ///
    /// Adds [`EOF`] when the end of the outermost rule is reachable.
    pub fn expected_tokens(
        &self,
        s: StateId,
        invoking_states: impl IntoIterator<Item = StateId>,
    ) -> IntervalSet {
        let mut following = self.next_tokens(s).clone();
        if !following.contains(EPSILON) {
            return following;
        }

        let mut expected = following.clone();
        expected.remove(EPSILON);
        for invoking in invoking_states {
            if !following.contains(EPSILON) {
                break;
            }
            let TransitionKind::Rule { follow, .. } = self.state(invoking).transition(0).kind
            else {
                break;
            };
            following = self.next_tokens(follow).clone();
            expected.add_all(&following);
            expected.remove(EPSILON);
        }

        if following.contains(EPSILON) {
            expected.add(EOF);
        }
        expected
    }
}
