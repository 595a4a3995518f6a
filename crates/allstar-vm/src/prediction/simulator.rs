//! ALL(*) prediction: walks the DFA cache and simulates the ATN on misses.
//!
//! Prediction first runs SLL: closures start from an empty stack, so a
//! config reaching the end of the decision rule may continue into any caller.
//! SLL results are cached in the decision's DFA. When SLL conflicts, LL
//! prediction reruns the decision with the real invocation stack; LL results
//! are not cached.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use allstar_core::atn::{Atn, PredictionContext, StateId, StateKind, Transition, TransitionKind};
use allstar_core::{EOF, EPSILON, Token, TokenType};

use crate::dfa::{Dfa, DfaState, Edge, PredPrediction};
use crate::engine::{ParserHooks, Recognizer};
use crate::error::RecognitionError;
use crate::trace::{PredictionSource, Tracer};
use crate::tree::{ContextId, ParseTree};

use super::alt_set::AltSet;
use super::config::{AtnConfig, AtnConfigSet};
use super::mode::{
    PredictionMode, all_configs_in_rule_stop_states, all_subsets_conflict, all_subsets_equal,
    conflicting_alt_subsets, has_config_in_rule_stop_state,
    has_sll_conflict_terminating_prediction, resolves_to_just_one_viable_alt, single_viable_alt,
    union_of, unique_config_alt,
};
use super::semantic::{PredicateEvaluator, SemanticContext};

/// Predicate evaluation against the parse in progress.
struct Evaluator<'a> {
    tree: &'a ParseTree,
    hooks: &'a mut dyn ParserHooks,
    precedence: Option<i32>,
}

impl PredicateEvaluator for Evaluator<'_> {
    fn sempred(&mut self, ctx: Option<ContextId>, rule_index: usize, pred_index: usize) -> bool {
        self.hooks.sempred(self.tree, ctx, rule_index, pred_index)
    }

    fn precpred(&mut self, precedence: i32) -> bool {
        self.precedence.is_none_or(|top| precedence >= top)
    }
}

/// One adaptive prediction for one decision.
pub(crate) struct Simulation<'p, 'i, T: Tracer> {
    atn: &'p Atn,
    dfa: &'p Dfa,
    mode: PredictionMode,
    recognizer: &'p mut Recognizer<'i>,
    hooks: &'p mut dyn ParserHooks,
    tracer: &'p mut T,
    outer_context: ContextId,
    start_index: usize,
    full_context_used: bool,
}

impl<'p, 'i, T: Tracer> Simulation<'p, 'i, T> {
    pub(crate) fn new(
        atn: &'p Atn,
        dfa: &'p Dfa,
        mode: PredictionMode,
        recognizer: &'p mut Recognizer<'i>,
        hooks: &'p mut dyn ParserHooks,
        tracer: &'p mut T,
        outer_context: ContextId,
    ) -> Self {
        Self {
            atn,
            dfa,
            mode,
            recognizer,
            hooks,
            tracer,
            outer_context,
            start_index: 0,
            full_context_used: false,
        }
    }

    /// Predicts the alternative to take at the DFA's decision. The input is
    /// left where it was.
    pub(crate) fn adaptive_predict(&mut self) -> Result<usize, RecognitionError> {
        self.start_index = self.index();
        self.tracer
            .trace_predict_start(self.dfa.decision, self.start_index);
        let marker = self.recognizer.input.mark();
        let result = self.predict();
        self.seek(self.start_index);
        self.recognizer.input.release(marker);
        if let Ok(alt) = result {
            let source = if self.full_context_used {
                PredictionSource::Ll
            } else {
                PredictionSource::Sll
            };
            self.tracer
                .trace_prediction(self.dfa.decision, alt, source);
        }
        result
    }

    fn predict(&mut self) -> Result<usize, RecognitionError> {
        let existing = if self.dfa.is_precedence_dfa() {
            self.dfa
                .precedence_start_state(self.recognizer.precedence())
        } else {
            self.dfa.start_state()
        };
        let s0 = match existing.and_then(|id| self.dfa.state(id)) {
            Some(s0) => s0,
            None => self.start_dfa_state(),
        };
        self.exec_atn(s0)
    }

    fn start_dfa_state(&mut self) -> Arc<DfaState> {
        let closure = self.compute_start_state(self.dfa.atn_start_state, None, false);
        if self.dfa.is_precedence_dfa() {
            let filtered = self.apply_precedence_filter(&closure);
            let s0 = self.dfa.add_state(DfaState::new(filtered));
            let kept = self
                .dfa
                .set_precedence_start_state(self.recognizer.precedence(), s0.number);
            return self.published(kept, s0);
        }
        let s0 = self.dfa.add_state(DfaState::new(closure));
        let kept = self.dfa.set_start_state(s0.number);
        self.published(Some(kept), s0)
    }

    /// The state another writer published first, if any, else `ours`.
    fn published(&self, kept: Option<usize>, ours: Arc<DfaState>) -> Arc<DfaState> {
        match kept {
            Some(id) if id != ours.number => self.dfa.state(id).unwrap_or(ours),
            _ => ours,
        }
    }

    fn exec_atn(&mut self, s0: Arc<DfaState>) -> Result<usize, RecognitionError> {
        let decision = self.dfa.decision;
        let mut previous = s0;
        let mut t = self.la(1);
        loop {
            let target = match previous.edge(t) {
                Some(edge) => {
                    let target = self.resolve(edge);
                    let to = target.as_ref().map(|s| s.number);
                    self.tracer.trace_dfa_hit(decision, previous.number, to);
                    target
                }
                None => self.compute_target_state(&previous, t),
            };

            let Some(d) = target else {
                let error = self.no_viable_alt();
                self.seek(self.start_index);
                return match self.syn_valid_or_sem_invalid_alt(&previous.configs) {
                    Some(alt) => Ok(alt),
                    None => Err(error),
                };
            };

            if d.requires_full_context() && self.mode != PredictionMode::Sll {
                let mut conflicting = d.configs.conflicting_alts.clone();
                if let Some(preds) = &d.predicates {
                    let conflict_index = self.index();
                    if conflict_index != self.start_index {
                        self.seek(self.start_index);
                    }
                    let alts = self.eval_semantic_context(preds, true);
                    if alts.len() == 1
                        && let Some(alt) = alts.min()
                    {
                        return Ok(alt);
                    }
                    if conflict_index != self.start_index {
                        self.seek(conflict_index);
                    }
                    conflicting = Some(alts);
                }

                self.tracer.trace_full_context(decision);
                self.full_context_used = true;
                let s0_closure =
                    self.compute_start_state(self.dfa.atn_start_state, Some(self.outer_context), true);
                let stop = self.index();
                self.recognizer.report_attempting_full_context(
                    self.dfa,
                    self.start_index,
                    stop,
                    conflicting.as_ref(),
                    &d.configs,
                );
                return self.exec_atn_with_full_context(s0_closure);
            }

            if d.is_accept {
                let Some(preds) = &d.predicates else {
                    return match d.prediction {
                        Some(alt) => Ok(alt),
                        None => Err(self.no_viable_alt()),
                    };
                };
                let stop_index = self.index();
                self.seek(self.start_index);
                let alts = self.eval_semantic_context(preds, true);
                let Some(alt) = alts.min() else {
                    return Err(self.no_viable_alt());
                };
                if alts.len() > 1 {
                    self.recognizer.report_ambiguity(
                        self.dfa,
                        self.start_index,
                        stop_index,
                        false,
                        Some(&alts),
                        &d.configs,
                    );
                }
                return Ok(alt);
            }

            previous = d;
            if t != EOF {
                self.recognizer.input.consume();
                t = self.la(1);
            }
        }
    }

    fn resolve(&self, edge: Edge) -> Option<Arc<DfaState>> {
        match edge {
            Edge::Error => None,
            Edge::Target(id) => self.dfa.state(id),
        }
    }

    /// Computes, caches and returns the DFA state reached from `previous` on
    /// `t`. `None` means no alternative survives `t`.
    fn compute_target_state(&mut self, previous: &DfaState, t: TokenType) -> Option<Arc<DfaState>> {
        let max = self.atn.max_token_type;
        let decision = self.dfa.decision;
        let Some(reach) = self.compute_reach_set(&previous.configs, t, false) else {
            previous.set_edge(t, Edge::Error, max);
            self.tracer.trace_dfa_miss(decision, previous.number, None);
            return None;
        };

        let mut d = DfaState::new(reach);
        if let Some(alt) = unique_config_alt(&d.configs) {
            d.is_accept = true;
            d.configs.unique_alt = Some(alt);
            d.prediction = Some(alt);
        } else if has_sll_conflict_terminating_prediction(self.mode, self.atn, &d.configs) {
            let conflicting = union_of(&conflicting_alt_subsets(&d.configs));
            d.prediction = conflicting.min();
            d.configs.conflicting_alts = Some(conflicting);
            d.escalate_full_context();
            d.is_accept = true;
        }
        if d.is_accept && d.configs.has_semantic_context {
            self.predicate_dfa_state(&mut d);
        }

        let d = self.dfa.add_state(d);
        let d = match previous.set_edge(t, Edge::Target(d.number), max) {
            Edge::Target(id) if id != d.number => self.dfa.state(id).unwrap_or(d),
            Edge::Error => return None,
            _ => d,
        };
        self.tracer
            .trace_dfa_miss(decision, previous.number, Some(d.number));
        Some(d)
    }

    fn predicate_dfa_state(&self, d: &mut DfaState) {
        let n_alts = self.atn.state(self.dfa.atn_start_state).num_transitions();
        let alts = match d.configs.unique_alt {
            Some(alt) => AltSet::of(alt),
            None => d.configs.conflicting_alts.clone().unwrap_or_default(),
        };
        let predicates = preds_for_ambig_alts(&alts, &d.configs, n_alts)
            .and_then(|alt_to_pred| predicate_predictions(&alts, &alt_to_pred));
        match predicates {
            Some(preds) => {
                d.predicates = Some(preds);
                d.prediction = None;
            }
            None => d.prediction = alts.min(),
        }
    }

    fn exec_atn_with_full_context(&mut self, s0: AtnConfigSet) -> Result<usize, RecognitionError> {
        let mut previous = s0;
        self.seek(self.start_index);
        let mut t = self.la(1);
        let mut found_exact = false;

        let (reach, predicted) = loop {
            let Some(mut reach) = self.compute_reach_set(&previous, t, true) else {
                let error = self.no_viable_alt();
                self.seek(self.start_index);
                return match self.syn_valid_or_sem_invalid_alt(&previous) {
                    Some(alt) => Ok(alt),
                    None => Err(error),
                };
            };

            let subsets = conflicting_alt_subsets(&reach);
            reach.unique_alt = unique_config_alt(&reach);
            if let Some(alt) = reach.unique_alt {
                break (reach, alt);
            }
            if self.mode != PredictionMode::LlExactAmbigDetection {
                if let Some(alt) = resolves_to_just_one_viable_alt(&subsets) {
                    break (reach, alt);
                }
            } else if all_subsets_conflict(&subsets)
                && all_subsets_equal(&subsets)
                && let Some(alt) = single_viable_alt(&subsets)
            {
                found_exact = true;
                break (reach, alt);
            }

            previous = reach;
            if t != EOF {
                self.recognizer.input.consume();
                t = self.la(1);
            }
        };

        let stop = self.index();
        if reach.unique_alt.is_some() {
            self.recognizer.report_context_sensitivity(
                self.dfa,
                self.start_index,
                stop,
                predicted,
                &reach,
            );
            return Ok(predicted);
        }

        // An ambiguity LL cannot resolve: take the minimum alternative.
        self.recognizer.report_ambiguity(
            self.dfa,
            self.start_index,
            stop,
            found_exact,
            Some(&reach.alts()),
            &reach,
        );
        Ok(predicted)
    }

    fn compute_reach_set(
        &mut self,
        closure: &AtnConfigSet,
        t: TokenType,
        full_ctx: bool,
    ) -> Option<AtnConfigSet> {
        let atn = self.atn;
        let mut intermediate = AtnConfigSet::new(full_ctx);
        let mut skipped_stop_states = Vec::new();

        for c in closure {
            let state = atn.state(c.state);
            if state.is_rule_stop() {
                if full_ctx || t == EOF {
                    skipped_stop_states.push(c.clone());
                }
                continue;
            }
            for transition in &state.transitions {
                if transition.matches(t, 0, atn.max_token_type) {
                    intermediate.add(c.with_state(transition.target));
                }
            }
        }

        // A single config, or configs that all predict the same alternative,
        // need no closure: the next step decides anyway.
        let shortcut = skipped_stop_states.is_empty()
            && t != EOF
            && (intermediate.len() == 1 || unique_config_alt(&intermediate).is_some());

        let mut reach = if shortcut {
            intermediate
        } else {
            let mut reach = AtnConfigSet::new(full_ctx);
            let mut busy = HashSet::new();
            let treat_eof_as_epsilon = t == EOF;
            for c in &intermediate {
                self.closure(c.clone(), &mut reach, &mut busy, false, full_ctx, treat_eof_as_epsilon);
            }
            reach
        };

        if t == EOF {
            reach = self.remove_all_configs_not_in_rule_stop_state(reach, shortcut);
        }

        if !skipped_stop_states.is_empty()
            && (!full_ctx || !has_config_in_rule_stop_state(atn, &reach))
        {
            for c in skipped_stop_states {
                reach.add(c);
            }
        }

        (!reach.is_empty()).then_some(reach)
    }

    fn remove_all_configs_not_in_rule_stop_state(
        &self,
        configs: AtnConfigSet,
        look_to_end_of_rule: bool,
    ) -> AtnConfigSet {
        let atn = self.atn;
        if all_configs_in_rule_stop_states(atn, &configs) {
            return configs;
        }
        let mut result = AtnConfigSet::new(configs.full_ctx);
        for c in &configs {
            let state = atn.state(c.state);
            if state.is_rule_stop() {
                result.add(c.clone());
                continue;
            }
            if look_to_end_of_rule
                && state.only_has_epsilon_transitions()
                && atn.next_tokens(c.state).contains(EPSILON)
            {
                result.add(c.with_state(atn.rule_to_stop[state.rule_index]));
            }
        }
        result
    }

    fn compute_start_state(
        &mut self,
        p: StateId,
        ctx: Option<ContextId>,
        full_ctx: bool,
    ) -> AtnConfigSet {
        let atn = self.atn;
        let initial = match ctx {
            Some(ctx) => self.recognizer.prediction_context(Some(ctx)),
            None => PredictionContext::empty(),
        };
        let mut configs = AtnConfigSet::new(full_ctx);
        for (i, t) in atn.state(p).transitions.iter().enumerate() {
            let c = AtnConfig::new(t.target, i + 1, Arc::clone(&initial));
            let mut busy = HashSet::new();
            self.closure(c, &mut configs, &mut busy, true, full_ctx, false);
        }
        configs
    }

    /// Keeps the configs the current precedence allows.
    ///
    /// Alternative 1 of a precedence decision takes another operator
    /// iteration; any other alternative reaching the same state with the same
    /// stack is dropped in its favor, unless it got there by returning from a
    /// precedence-0 invocation of the rule.
    fn apply_precedence_filter(&mut self, configs: &AtnConfigSet) -> AtnConfigSet {
        let mut states_from_alt1: HashMap<StateId, Arc<PredictionContext>> = HashMap::new();
        let mut out = AtnConfigSet::new(configs.full_ctx);
        let mut evaluator = self.evaluator();

        for c in configs.iter().filter(|c| c.alt == 1) {
            let Some(updated) = c.semantic.eval_precedence(&mut evaluator) else {
                continue;
            };
            states_from_alt1.insert(c.state, Arc::clone(&c.context));
            if updated != c.semantic {
                out.add(AtnConfig {
                    semantic: updated,
                    ..c.clone()
                });
            } else {
                out.add(c.clone());
            }
        }

        for c in configs.iter().filter(|c| c.alt != 1) {
            if !c.precedence_filter_suppressed
                && states_from_alt1
                    .get(&c.state)
                    .is_some_and(|ctx| **ctx == *c.context)
            {
                continue;
            }
            out.add(c.clone());
        }
        out
    }

    fn closure(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut HashSet<AtnConfig>,
        collect_predicates: bool,
        full_ctx: bool,
        treat_eof_as_epsilon: bool,
    ) {
        self.closure_checking_stop_state(
            config,
            configs,
            busy,
            collect_predicates,
            full_ctx,
            0,
            treat_eof_as_epsilon,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn closure_checking_stop_state(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut HashSet<AtnConfig>,
        collect_predicates: bool,
        full_ctx: bool,
        depth: i32,
        treat_eof_as_epsilon: bool,
    ) {
        if self.atn.state(config.state).is_rule_stop() {
            if let (Some(return_state), Some(parent)) =
                (config.context.return_state(), config.context.parent())
            {
                let popped = AtnConfig {
                    state: return_state,
                    context: Arc::clone(parent),
                    ..config
                };
                self.closure_checking_stop_state(
                    popped,
                    configs,
                    busy,
                    collect_predicates,
                    full_ctx,
                    depth - 1,
                    treat_eof_as_epsilon,
                );
                return;
            }
            if full_ctx {
                configs.add(config);
                return;
            }
            // SLL with no stack: fall through and follow every caller.
        }
        self.closure_inner(
            config,
            configs,
            busy,
            collect_predicates,
            full_ctx,
            depth,
            treat_eof_as_epsilon,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn closure_inner(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut HashSet<AtnConfig>,
        collect_predicates: bool,
        full_ctx: bool,
        depth: i32,
        treat_eof_as_epsilon: bool,
    ) {
        let atn = self.atn;
        let p = atn.state(config.state);
        if !p.only_has_epsilon_transitions() {
            configs.add(config.clone());
        }

        for (i, t) in p.transitions.iter().enumerate() {
            if i == 0 && self.can_drop_loop_entry_edge(&config) {
                continue;
            }
            let continue_collecting =
                collect_predicates && !matches!(t.kind, TransitionKind::Action { .. });
            let Some(mut c) = self.epsilon_target(
                &config,
                t,
                continue_collecting,
                depth == 0,
                full_ctx,
                treat_eof_as_epsilon,
            ) else {
                continue;
            };

            let mut new_depth = depth;
            if p.is_rule_stop() {
                // Leaving the decision rule with an empty stack: into any caller.
                if self.dfa.is_precedence_dfa()
                    && t.outermost_precedence_return() == Some(self.dfa.rule_index)
                {
                    c.precedence_filter_suppressed = true;
                }
                c.reaches_into_outer_context += 1;
                if !busy.insert(c.clone()) {
                    continue;
                }
                configs.dips_into_outer_context = true;
                new_depth -= 1;
            } else {
                if !t.is_epsilon() && !busy.insert(c.clone()) {
                    continue;
                }
                if matches!(t.kind, TransitionKind::Rule { .. }) && new_depth >= 0 {
                    new_depth += 1;
                }
            }

            self.closure_checking_stop_state(
                c,
                configs,
                busy,
                continue_collecting,
                full_ctx,
                new_depth,
                treat_eof_as_epsilon,
            );
        }
    }

    /// Whether closure can skip the loop-entry edge of a precedence decision
    /// because every return address of `config` lands back at the loop.
    fn can_drop_loop_entry_edge(&self, config: &AtnConfig) -> bool {
        let atn = self.atn;
        let p = atn.state(config.state);
        if !p.is_precedence_decision() {
            return false;
        }
        let Some(return_state) = config.context.return_state() else {
            return false;
        };
        let rs = atn.state(return_state);
        if rs.rule_index != p.rule_index {
            return false;
        }

        let Some(entry) = p.transitions.first() else {
            return false;
        };
        let StateKind::BlockStart { end: block_end, .. } = atn.state(entry.target).kind else {
            return false;
        };

        if rs.num_transitions() != 1 || !rs.transition(0).is_epsilon() {
            return false;
        }
        let rs_target = rs.transition(0).target;

        // Prefix operator: `'-' e`.
        if matches!(rs.kind, StateKind::BlockEnd { .. }) && rs_target == p.number {
            return true;
        }
        // Binary operator: `e '+' e`.
        if rs.number == block_end {
            return true;
        }
        // Ternary: `e '?' e ':' e`.
        if rs_target == block_end {
            return true;
        }
        let target = atn.state(rs_target);
        matches!(target.kind, StateKind::BlockEnd { .. })
            && target.num_transitions() == 1
            && target.transition(0).is_epsilon()
            && target.transition(0).target == p.number
    }

    fn epsilon_target(
        &mut self,
        config: &AtnConfig,
        t: &Transition,
        collect_predicates: bool,
        in_context: bool,
        full_ctx: bool,
        treat_eof_as_epsilon: bool,
    ) -> Option<AtnConfig> {
        match &t.kind {
            TransitionKind::Rule { follow, .. } => {
                let context = PredictionContext::singleton(Arc::clone(&config.context), *follow);
                Some(config.with_context(t.target, context))
            }
            TransitionKind::Precedence { precedence } => self.predicate_target(
                config,
                t.target,
                SemanticContext::Precedence(*precedence),
                collect_predicates && in_context,
                full_ctx,
            ),
            TransitionKind::Predicate {
                rule_index,
                pred_index,
                ctx_dependent,
            } => self.predicate_target(
                config,
                t.target,
                SemanticContext::Predicate {
                    rule_index: *rule_index,
                    pred_index: *pred_index,
                    ctx_dependent: *ctx_dependent,
                },
                collect_predicates && (!ctx_dependent || in_context),
                full_ctx,
            ),
            TransitionKind::Action { .. } | TransitionKind::Epsilon { .. } => {
                Some(config.with_state(t.target))
            }
            TransitionKind::Atom(_) | TransitionKind::Range(..) | TransitionKind::Set(_) => {
                (treat_eof_as_epsilon && t.matches(EOF, 0, 1)).then(|| config.with_state(t.target))
            }
            TransitionKind::NotSet(_) | TransitionKind::Wildcard => None,
        }
    }

    /// Crosses a predicate edge. While collecting, SLL attaches the predicate
    /// to the config and LL evaluates it on the spot.
    fn predicate_target(
        &mut self,
        config: &AtnConfig,
        target: StateId,
        pred: SemanticContext,
        collect: bool,
        full_ctx: bool,
    ) -> Option<AtnConfig> {
        if !collect {
            return Some(config.with_state(target));
        }
        if full_ctx {
            let current = self.index();
            self.seek(self.start_index);
            let outer = self.outer_context;
            let passed = pred.eval(&mut self.evaluator(), outer);
            self.seek(current);
            return passed.then(|| config.with_state(target));
        }
        let semantic = SemanticContext::and(&config.semantic, &pred);
        Some(config.with_semantic(target, semantic))
    }

    fn eval_semantic_context(&mut self, preds: &[PredPrediction], complete: bool) -> AltSet {
        let outer = self.outer_context;
        let mut evaluator = self.evaluator();
        let mut alts = AltSet::new();
        for p in preds {
            if p.pred.is_none() || p.pred.eval(&mut evaluator, outer) {
                alts.insert(p.alt);
                if !complete {
                    break;
                }
            }
        }
        alts
    }

    /// When prediction fails, the alternative that finished the decision rule
    /// (or reached past it) still parses the input seen so far. Configs whose
    /// predicates pass are preferred.
    fn syn_valid_or_sem_invalid_alt(&mut self, configs: &AtnConfigSet) -> Option<usize> {
        let (valid, invalid) = self.split_according_to_semantic_validity(configs);
        self.alt_that_finished_decision_entry_rule(&valid)
            .or_else(|| self.alt_that_finished_decision_entry_rule(&invalid))
    }

    fn alt_that_finished_decision_entry_rule(&self, configs: &AtnConfigSet) -> Option<usize> {
        configs
            .iter()
            .filter(|c| {
                c.reaches_into_outer_context > 0
                    || (self.atn.state(c.state).is_rule_stop() && c.context.has_empty_path())
            })
            .map(|c| c.alt)
            .min()
    }

    fn split_according_to_semantic_validity(
        &mut self,
        configs: &AtnConfigSet,
    ) -> (AtnConfigSet, AtnConfigSet) {
        let outer = self.outer_context;
        let mut evaluator = self.evaluator();
        let mut succeeded = AtnConfigSet::new(configs.full_ctx);
        let mut failed = AtnConfigSet::new(configs.full_ctx);
        for c in configs {
            if c.semantic.is_none() || c.semantic.eval(&mut evaluator, outer) {
                succeeded.add(c.clone());
            } else {
                failed.add(c.clone());
            }
        }
        (succeeded, failed)
    }

    fn no_viable_alt(&self) -> RecognitionError {
        let start_token = self
            .recognizer
            .input
            .get(self.start_index)
            .cloned()
            .unwrap_or_else(Token::eof);
        RecognitionError::NoViableAlt {
            start_token,
            offending_token: self.recognizer.current_token(),
            state: self.recognizer.state,
            ctx: Some(self.outer_context),
        }
    }

    fn evaluator(&mut self) -> Evaluator<'_> {
        Evaluator {
            tree: &self.recognizer.tree,
            hooks: &mut *self.hooks,
            precedence: self.recognizer.precedence_stack.last().copied(),
        }
    }

    fn index(&self) -> usize {
        self.recognizer.input.index()
    }

    fn seek(&mut self, index: usize) {
        self.recognizer.input.seek(index);
    }

    fn la(&self, i: isize) -> TokenType {
        self.recognizer.input.la(i)
    }
}

/// Predicate per alternative `1..=n_alts` for the alternatives in `ambig`,
/// or `None` when none of them is predicated.
fn preds_for_ambig_alts(
    ambig: &AltSet,
    configs: &AtnConfigSet,
    n_alts: usize,
) -> Option<Vec<SemanticContext>> {
    let mut alt_to_pred: Vec<Option<SemanticContext>> = vec![None; n_alts + 1];
    for c in configs {
        if !ambig.contains(c.alt) || c.alt > n_alts {
            continue;
        }
        let slot = &mut alt_to_pred[c.alt];
        *slot = Some(match slot.take() {
            None => c.semantic.clone(),
            Some(p) => SemanticContext::or(&p, &c.semantic),
        });
    }

    let preds: Vec<SemanticContext> = alt_to_pred
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    preds
        .iter()
        .skip(1)
        .any(|p| !p.is_none())
        .then_some(preds)
}

fn predicate_predictions(
    ambig: &AltSet,
    alt_to_pred: &[SemanticContext],
) -> Option<Vec<PredPrediction>> {
    let mut pairs = Vec::new();
    let mut contains_predicate = false;
    for (alt, pred) in alt_to_pred.iter().enumerate().skip(1) {
        if ambig.contains(alt) {
            pairs.push(PredPrediction {
                pred: pred.clone(),
                alt,
            });
        }
        if !pred.is_none() {
            contains_predicate = true;
        }
    }
    contains_predicate.then_some(pairs)
}
