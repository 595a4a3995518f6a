use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use allstar_core::TokenType;

use crate::prediction::{AtnConfigSet, SemanticContext};

/// Index of a state in its [`super::Dfa`].
pub type DfaStateId = usize;

/// A cached transition out of a DFA state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The symbol was computed to lead nowhere.
    Error,
    Target(DfaStateId),
}

/// A predicate guarding one alternative of a predicated accept state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredPrediction {
    pub pred: SemanticContext,
    pub alt: usize,
}

impl fmt::Display for PredPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pred, self.alt)
    }
}

/// A set of ATN configurations reached after some lookahead.
///
/// Everything except the edge table is fixed before the state is
/// published to its DFA.
#[derive(Debug)]
pub struct DfaState {
    pub number: DfaStateId,
    pub configs: AtnConfigSet,
    pub is_accept: bool,
    /// Predicted alternative of an accept state without predicates.
    pub prediction: Option<usize>,
    /// Predicate per alternative, evaluated in order when accepting.
    pub predicates: Option<Vec<PredPrediction>>,
    requires_full_context: AtomicBool,
    edges: RwLock<Vec<Option<Edge>>>,
}

impl DfaState {
    pub fn new(configs: AtnConfigSet) -> Self {
        Self {
            number: 0,
            configs,
            is_accept: false,
            prediction: None,
            predicates: None,
            requires_full_context: AtomicBool::new(false),
            edges: RwLock::new(Vec::new()),
        }
    }

    /// SLL conflicted here; LL prediction decides instead.
    pub fn requires_full_context(&self) -> bool {
        self.requires_full_context.load(Ordering::Acquire)
    }

    /// Marks the state as needing full context. There is no way back.
    pub fn escalate_full_context(&self) {
        self.requires_full_context.store(true, Ordering::Release);
    }

    /// Cached edge on `symbol`, `None` when not computed yet.
    pub fn edge(&self, symbol: TokenType) -> Option<Edge> {
        let slot = usize::try_from(symbol + 1).ok()?;
        let edges = self.edges.read().unwrap_or_else(PoisonError::into_inner);
        edges.get(slot).copied().flatten()
    }

    /// Caches `edge` on `symbol` unless another edge got there first; returns
    /// the edge that stays.
    pub fn set_edge(&self, symbol: TokenType, edge: Edge, max_token_type: TokenType) -> Edge {
        let Ok(slot) = usize::try_from(symbol + 1) else {
            return edge;
        };
        if symbol > max_token_type {
            return edge;
        }
        let mut edges = self.edges.write().unwrap_or_else(PoisonError::into_inner);
        if edges.is_empty() {
            edges.resize(max_token_type as usize + 2, None);
        }
        *edges[slot].get_or_insert(edge)
    }

    /// Cached edges as `(symbol, edge)` pairs in symbol order.
    pub fn edges(&self) -> Vec<(TokenType, Edge)> {
        let edges = self.edges.read().unwrap_or_else(PoisonError::into_inner);
        edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (i as TokenType - 1, e)))
            .collect()
    }
}

impl PartialEq for DfaState {
    fn eq(&self, other: &Self) -> bool {
        self.configs == other.configs
    }
}

impl Eq for DfaState {}
