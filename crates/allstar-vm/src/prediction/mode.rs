//! Prediction modes and the conflict analysis that drives them.
//!
//! SLL prediction stops at the first conflict. LL prediction retries such
//! conflicts with the full invocation stack and only reports an ambiguity
//! when the stack cannot tell the alternatives apart either.

use indexmap::IndexMap;

use allstar_core::atn::{Atn, PredictionContext, StateId};

use super::alt_set::AltSet;
use super::config::{AtnConfig, AtnConfigSet};
use super::semantic::SemanticContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PredictionMode {
    /// Never falls back to full-context prediction. A conflict resolves to
    /// the minimum alternative.
    Sll,
    /// Falls back to full-context prediction when SLL conflicts.
    #[default]
    Ll,
    /// Like [`Ll`](Self::Ll) but keeps consuming input until the conflict is
    /// known to be a true ambiguity.
    LlExactAmbigDetection,
}

/// Whether SLL prediction can stop at `configs` and fall back to LL.
pub fn has_sll_conflict_terminating_prediction(
    mode: PredictionMode,
    atn: &Atn,
    configs: &AtnConfigSet,
) -> bool {
    if all_configs_in_rule_stop_states(atn, configs) {
        return true;
    }

    let stripped;
    let mut configs = configs;
    if mode == PredictionMode::Sll && configs.has_semantic_context {
        let mut dup = AtnConfigSet::new(configs.full_ctx);
        for c in configs {
            dup.add(AtnConfig {
                semantic: SemanticContext::None,
                ..c.clone()
            });
        }
        stripped = dup;
        configs = &stripped;
    }

    let subsets = conflicting_alt_subsets(configs);
    has_conflicting_alt_set(&subsets) && !has_state_associated_with_one_alt(configs)
}

pub fn has_config_in_rule_stop_state(atn: &Atn, configs: &AtnConfigSet) -> bool {
    configs.iter().any(|c| atn.state(c.state).is_rule_stop())
}

pub fn all_configs_in_rule_stop_states(atn: &Atn, configs: &AtnConfigSet) -> bool {
    configs.iter().all(|c| atn.state(c.state).is_rule_stop())
}

/// Alternatives of configs grouped by `(state, stack)`, in first-seen order.
pub fn conflicting_alt_subsets(configs: &AtnConfigSet) -> Vec<AltSet> {
    let mut groups: IndexMap<(StateId, &PredictionContext), AltSet> = IndexMap::new();
    for c in configs {
        groups
            .entry((c.state, c.context.as_ref()))
            .or_default()
            .insert(c.alt);
    }
    groups.into_values().collect()
}

/// Alternatives of configs grouped by state.
pub fn state_to_alt_map(configs: &AtnConfigSet) -> IndexMap<StateId, AltSet> {
    let mut map: IndexMap<StateId, AltSet> = IndexMap::new();
    for c in configs {
        map.entry(c.state).or_default().insert(c.alt);
    }
    map
}

pub fn has_state_associated_with_one_alt(configs: &AtnConfigSet) -> bool {
    state_to_alt_map(configs).values().any(|alts| alts.len() == 1)
}

pub fn has_conflicting_alt_set(subsets: &[AltSet]) -> bool {
    subsets.iter().any(|alts| alts.len() > 1)
}

pub fn has_non_conflicting_alt_set(subsets: &[AltSet]) -> bool {
    subsets.iter().any(|alts| alts.len() == 1)
}

pub fn all_subsets_conflict(subsets: &[AltSet]) -> bool {
    !has_non_conflicting_alt_set(subsets)
}

pub fn all_subsets_equal(subsets: &[AltSet]) -> bool {
    subsets.windows(2).all(|w| w[0] == w[1])
}

pub fn union_of(subsets: &[AltSet]) -> AltSet {
    let mut all = AltSet::new();
    for alts in subsets {
        all.union_with(alts);
    }
    all
}

/// The alternative every subset agrees on, if only one remains.
pub fn unique_alt(subsets: &[AltSet]) -> Option<usize> {
    let all = union_of(subsets);
    if all.len() == 1 { all.min() } else { None }
}

/// The alternative picked when each subset resolves to its minimum and all
/// those minimums agree.
pub fn single_viable_alt(subsets: &[AltSet]) -> Option<usize> {
    let mut viable = AltSet::new();
    for alts in subsets {
        viable.insert(alts.min()?);
        if viable.len() > 1 {
            return None;
        }
    }
    viable.min()
}

pub fn resolves_to_just_one_viable_alt(subsets: &[AltSet]) -> Option<usize> {
    single_viable_alt(subsets)
}

/// Alternative shared by every config, if there is exactly one.
pub fn unique_config_alt(configs: &AtnConfigSet) -> Option<usize> {
    let mut iter = configs.iter();
    let alt = iter.next()?.alt;
    iter.all(|c| c.alt == alt).then_some(alt)
}
