//! Per-decision DFA cache.
//!
//! Each decision gets a DFA whose states are sets of ATN configurations.
//! Prediction walks the DFA first and only simulates the ATN on a miss, then
//! publishes what it computed. Published states and edges are never removed
//! or changed (except [`DfaCache::clear`]), so concurrent parsers sharing a
//! cache can only race to publish the same thing; the first writer wins.
//!
//! A precedence DFA serves the operator loop of a left-recursive rule. Its
//! start state depends on the precedence of the current invocation, so it
//! keeps one start state per precedence instead of a single `s0`.

mod serializer;
mod state;


use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use allstar_core::atn::{Atn, StateId};

use crate::prediction::AtnConfigSet;

pub use state::{DfaState, DfaStateId, Edge, PredPrediction};

#[derive(Debug)]
pub struct Dfa {
    pub decision: usize,
    /// Decision state this DFA predicts for.
    pub atn_start_state: StateId,
    pub rule_index: usize,
    precedence_dfa: bool,
    /// Published states keyed by their configurations; a state's number is its
    /// position.
    states: RwLock<IndexMap<AtnConfigSet, Arc<DfaState>>>,
    s0: RwLock<Option<DfaStateId>>,
    precedence_starts: RwLock<Vec<Option<DfaStateId>>>,
}

impl Dfa {
    pub fn new(atn: &Atn, decision: usize) -> Self {
        let state = atn.decision_state(decision);
        Self {
            decision,
            atn_start_state: state.number,
            rule_index: state.rule_index,
            precedence_dfa: state.is_precedence_decision(),
            states: RwLock::new(IndexMap::new()),
            s0: RwLock::new(None),
            precedence_starts: RwLock::new(Vec::new()),
        }
    }

    pub fn is_precedence_dfa(&self) -> bool {
        self.precedence_dfa
    }

    pub fn len(&self) -> usize {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self, id: DfaStateId) -> Option<Arc<DfaState>> {
        let states = self.states.read().unwrap_or_else(PoisonError::into_inner);
        states.get_index(id).map(|(_, s)| Arc::clone(s))
    }

    /// Published states in number order.
    pub fn states(&self) -> Vec<Arc<DfaState>> {
        let states = self.states.read().unwrap_or_else(PoisonError::into_inner);
        states.values().cloned().collect()
    }

    /// Publishes `state`, or returns the already published state with the
    /// same configurations.
    pub fn add_state(&self, mut state: DfaState) -> Arc<DfaState> {
        if let Some(existing) = self.existing(&state) {
            return existing;
        }
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = states.get(&state.configs) {
            if state.requires_full_context() {
                existing.escalate_full_context();
            }
            return Arc::clone(existing);
        }
        state.number = states.len();
        let state = Arc::new(state);
        states.insert(state.configs.clone(), Arc::clone(&state));
        state
    }

    fn existing(&self, state: &DfaState) -> Option<Arc<DfaState>> {
        let states = self.states.read().unwrap_or_else(PoisonError::into_inner);
        let existing = states.get(&state.configs)?;
        if state.requires_full_context() {
            existing.escalate_full_context();
        }
        Some(Arc::clone(existing))
    }

    /// Start state of a non-precedence DFA.
    pub fn start_state(&self) -> Option<DfaStateId> {
        *self.s0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the start state unless one is already set; returns the one that
    /// stays.
    pub fn set_start_state(&self, id: DfaStateId) -> DfaStateId {
        let mut s0 = self.s0.write().unwrap_or_else(PoisonError::into_inner);
        *s0.get_or_insert(id)
    }

    /// Start state for `precedence`. Always `None` for a non-precedence DFA
    /// and for negative precedences.
    pub fn precedence_start_state(&self, precedence: i32) -> Option<DfaStateId> {
        if !self.precedence_dfa {
            return None;
        }
        let slot = usize::try_from(precedence).ok()?;
        let starts = self
            .precedence_starts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        starts.get(slot).copied().flatten()
    }

    /// Every recorded precedence start state, lowest precedence first.
    pub fn precedence_start_states(&self) -> Vec<(usize, DfaStateId)> {
        let starts = self
            .precedence_starts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        starts
            .iter()
            .enumerate()
            .filter_map(|(precedence, id)| id.map(|id| (precedence, id)))
            .collect()
    }

    /// Records the start state for `precedence`, growing the table as needed.
    /// An existing entry is kept. Returns the entry that stays, or `None` when
    /// nothing can be stored.
    pub fn set_precedence_start_state(
        &self,
        precedence: i32,
        id: DfaStateId,
    ) -> Option<DfaStateId> {
        if !self.precedence_dfa {
            return None;
        }
        let slot = usize::try_from(precedence).ok()?;
        let mut starts = self
            .precedence_starts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if starts.len() <= slot {
            starts.resize(slot + 1, None);
        }
        Some(*starts[slot].get_or_insert(id))
    }

    /// Drops every state and start state.
    pub fn clear(&self) {
        self.states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.s0.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.precedence_starts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// One [`Dfa`] per decision of an ATN.
///
/// Owned by the caller and shared by reference; parsers using the same ATN
/// can share one cache across threads.
#[derive(Debug)]
pub struct DfaCache {
    dfas: Vec<Dfa>,
}

impl DfaCache {
    pub fn new(atn: &Atn) -> Self {
        Self {
            dfas: (0..atn.num_decisions()).map(|d| Dfa::new(atn, d)).collect(),
        }
    }

    pub fn dfa(&self, decision: usize) -> &Dfa {
        &self.dfas[decision]
    }

    pub fn len(&self) -> usize {
        self.dfas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dfas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dfa> {
        self.dfas.iter()
    }

    pub fn clear(&self) {
        for dfa in &self.dfas {
            dfa.clear();
        }
    }
}
