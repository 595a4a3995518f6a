//! Return-state stacks used while simulating the ATN.
//!
//! Stacks are immutable and share their tails through `Arc`. Configurations
//! never merge stacks, so a node is either the empty stack or a single frame.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use super::Atn;
use super::state::StateId;
use super::transition::TransitionKind;

static EMPTY: LazyLock<Arc<PredictionContext>> =
    LazyLock::new(|| Arc::new(PredictionContext::Empty));

#[derive(Debug)]
pub enum PredictionContext {
    /// `$`: either the bottom of a full-context stack or "any caller" in SLL.
    Empty,
    Singleton {
        parent: Arc<PredictionContext>,
        return_state: StateId,
    },
}

impl PredictionContext {
    pub fn empty() -> Arc<Self> {
        Arc::clone(&EMPTY)
    }

    pub fn singleton(parent: Arc<Self>, return_state: StateId) -> Arc<Self> {
        Arc::new(Self::Singleton {
            parent,
            return_state,
        })
    }

    /// Builds the stack for a chain of rule invocations.
    ///
    /// `invoking_states` lists the invoking state of each active rule context,
    /// innermost first, excluding the outermost context.
    pub fn from_invocation_chain(
        atn: &Atn,
        invoking_states: impl IntoIterator<Item = StateId>,
    ) -> Arc<Self> {
        let chain: Vec<StateId> = invoking_states.into_iter().collect();
        let mut ctx = Self::empty();
        for &invoking in chain.iter().rev() {
            let transition = atn.state(invoking).transition(0);
            if let TransitionKind::Rule { follow, .. } = transition.kind {
                ctx = Self::singleton(ctx, follow);
            }
        }
        ctx
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether popping this stack can reach the outermost context.
    pub fn has_empty_path(&self) -> bool {
        self.is_empty()
    }

    pub fn return_state(&self) -> Option<StateId> {
        match self {
            Self::Empty => None,
            Self::Singleton { return_state, .. } => Some(*return_state),
        }
    }

    pub fn parent(&self) -> Option<&Arc<Self>> {
        match self {
            Self::Empty => None,
            Self::Singleton { parent, .. } => Some(parent),
        }
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self;
        while let Self::Singleton { parent, .. } = cur {
            depth += 1;
            cur = parent;
        }
        depth
    }
}

impl PartialEq for PredictionContext {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (
                Self::Singleton {
                    parent: p1,
                    return_state: r1,
                },
                Self::Singleton {
                    parent: p2,
                    return_state: r2,
                },
            ) => r1 == r2 && (Arc::ptr_eq(p1, p2) || p1 == p2),
            _ => false,
        }
    }
}

impl Eq for PredictionContext {}

impl Hash for PredictionContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut cur = self;
        while let Self::Singleton {
            parent,
            return_state,
        } = cur
        {
            return_state.hash(state);
            cur = parent;
        }
        usize::MAX.hash(state);
    }
}

impl fmt::Display for PredictionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        let mut cur = self;
        while let Self::Singleton {
            parent,
            return_state,
        } = cur
        {
            write!(f, "{return_state} ")?;
            cur = parent;
        }
        write!(f, "$]")
    }
}
