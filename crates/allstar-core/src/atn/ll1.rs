//! LL(1) lookahead sets over the ATN.

use std::collections::HashSet;
use std::sync::Arc;

use crate::interval_set::IntervalSet;
use crate::token::{EOF, EPSILON, INVALID_TYPE, MIN_USER_TOKEN_TYPE};

use super::Atn;
use super::context::PredictionContext;
use super::state::StateId;
use super::transition::TransitionKind;

/// Marker added to a lookahead set when a predicate blocks the walk.
pub const HIT_PRED: i32 = INVALID_TYPE;

type BusyKey = (StateId, Vec<StateId>, Option<Arc<PredictionContext>>);

pub struct Ll1Analyzer<'a> {
    atn: &'a Atn,
}

struct Walk {
    look: IntervalSet,
    busy: HashSet<BusyKey>,
    called: Vec<bool>,
    /// Follow states of rules entered during this walk, innermost last.
    frames: Vec<StateId>,
    see_thru_preds: bool,
    add_eof: bool,
}

impl<'a> Ll1Analyzer<'a> {
    pub fn new(atn: &'a Atn) -> Self {
        Self { atn }
    }

    /// Lookahead per alternative of a decision state. An alternative whose
    /// lookahead is empty or blocked by a predicate yields `None`.
    pub fn decision_lookahead(&self, s: StateId) -> Vec<Option<IntervalSet>> {
        let state = self.atn.state(s);
        state
            .transitions
            .iter()
            .map(|t| {
                let mut walk = self.walk(false, false);
                self.look_from(t.target, None, &None, &mut walk);
                let look = walk.look;
                if look.is_empty() || look.contains(HIT_PRED) {
                    None
                } else {
                    Some(look)
                }
            })
            .collect()
    }

    /// Tokens that can follow `s`, stopping at `stop` when given.
    ///
    /// Without a context, reaching the end of the rule adds [`EPSILON`]. With a
    /// context, the walk continues into the callers and adds [`EOF`] when the
    /// outermost context is exhausted.
    pub fn look(
        &self,
        s: StateId,
        stop: Option<StateId>,
        ctx: Option<&Arc<PredictionContext>>,
    ) -> IntervalSet {
        let mut walk = self.walk(true, true);
        self.look_from(s, stop, &ctx.cloned(), &mut walk);
        walk.look
    }

    fn walk(&self, see_thru_preds: bool, add_eof: bool) -> Walk {
        Walk {
            look: IntervalSet::new(),
            busy: HashSet::new(),
            called: vec![false; self.atn.rule_names.len()],
            frames: Vec::new(),
            see_thru_preds,
            add_eof,
        }
    }

    fn look_from(
        &self,
        s: StateId,
        stop: Option<StateId>,
        ctx: &Option<Arc<PredictionContext>>,
        walk: &mut Walk,
    ) {
        if !walk.busy.insert((s, walk.frames.clone(), ctx.clone())) {
            return;
        }

        let state = self.atn.state(s);
        let at_stop = stop == Some(s);

        if (at_stop || state.is_rule_stop()) && walk.frames.is_empty() {
            match ctx {
                None => {
                    walk.look.add(EPSILON);
                    return;
                }
                Some(c) if c.is_empty() && walk.add_eof => {
                    walk.look.add(EOF);
                    return;
                }
                _ => {}
            }
        }

        if state.is_rule_stop() {
            if let Some(follow) = walk.frames.pop() {
                let rule = state.rule_index;
                let removed = std::mem::replace(&mut walk.called[rule], false);
                self.look_from(follow, stop, ctx, walk);
                walk.called[rule] = removed;
                walk.frames.push(follow);
                return;
            }
            if let Some(PredictionContext::Singleton {
                parent,
                return_state,
            }) = ctx.as_deref()
            {
                let rule = state.rule_index;
                let removed = std::mem::replace(&mut walk.called[rule], false);
                self.look_from(*return_state, stop, &Some(Arc::clone(parent)), walk);
                walk.called[rule] = removed;
                return;
            }
        }

        for t in &state.transitions {
            match &t.kind {
                TransitionKind::Rule { follow, .. } => {
                    let callee = self.atn.state(t.target).rule_index;
                    if walk.called[callee] {
                        continue;
                    }
                    walk.called[callee] = true;
                    walk.frames.push(*follow);
                    self.look_from(t.target, stop, ctx, walk);
                    walk.frames.pop();
                    walk.called[callee] = false;
                }
                TransitionKind::Predicate { .. } | TransitionKind::Precedence { .. } => {
                    if walk.see_thru_preds {
                        self.look_from(t.target, stop, ctx, walk);
                    } else {
                        walk.look.add(HIT_PRED);
                    }
                }
                _ if t.is_epsilon() => self.look_from(t.target, stop, ctx, walk),
                TransitionKind::Wildcard => {
                    walk.look
                        .add_range(MIN_USER_TOKEN_TYPE, self.atn.max_token_type);
                }
                TransitionKind::NotSet(set) => {
                    walk.look
                        .add_all(&set.complement(MIN_USER_TOKEN_TYPE, self.atn.max_token_type));
                }
                _ => {
                    if let Some(set) = t.label() {
                        walk.look.add_all(&set);
                    }
                }
            }
        }
    }
}
