//! Grammar interpreter.
//!
//! Walks the ATN from a start rule, asking adaptive prediction at every
//! decision with more than one alternative, and builds the parse tree as it
//! goes. Left-recursive rules are handled with a parent-context stack: each
//! iteration of the operator loop wraps the context built so far in a fresh
//! context of the same rule.

use std::sync::Arc;

use allstar_core::atn::{Atn, AtnState, BlockKind, StateId, StateKind, TransitionKind};
use allstar_core::{EOF, INVALID_TYPE, MIN_USER_TOKEN_TYPE, Token, TokenType, Vocabulary};

use crate::dfa::DfaCache;
use crate::error::{Interrupt, ParseError, RecognitionError};
use crate::listener::{ConsoleErrorListener, ErrorListener, ErrorListeners};
use crate::prediction::PredictionMode;
use crate::prediction::simulator::Simulation;
use crate::strategy::{DefaultErrorStrategy, ErrorStrategy};
use crate::token_stream::TokenStream;
use crate::trace::{NoopTracer, PredictionSource, Tracer};
use crate::tree::{Child, ContextId, ParseTree};

use super::hooks::{DefaultHooks, ParserHooks};
use super::recognizer::Recognizer;

/// A forced prediction: at `decision`, with the input at `input_index`,
/// take `alt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DecisionOverride {
    decision: usize,
    input_index: usize,
    alt: usize,
}

/// Builder for [`Interpreter`] instances.
pub struct InterpreterBuilder {
    atn: Arc<Atn>,
    vocabulary: Vocabulary,
    cache: Option<Arc<DfaCache>>,
    mode: PredictionMode,
    strategy: Box<dyn ErrorStrategy>,
    listeners: ErrorListeners,
    hooks: Box<dyn ParserHooks>,
}

impl InterpreterBuilder {
    /// Starts with the default error strategy, a console listener, LL
    /// prediction and a private DFA cache.
    pub fn new(atn: Arc<Atn>, vocabulary: Vocabulary) -> Self {
        let mut listeners = ErrorListeners::new();
        listeners.add(Box::new(ConsoleErrorListener));
        Self {
            atn,
            vocabulary,
            cache: None,
            mode: PredictionMode::default(),
            strategy: Box::new(DefaultErrorStrategy::new()),
            listeners,
            hooks: Box::new(DefaultHooks),
        }
    }

    /// Share a DFA cache with other interpreters over the same ATN.
    pub fn cache(mut self, cache: Arc<DfaCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn prediction_mode(mut self, mode: PredictionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn error_strategy(mut self, strategy: impl ErrorStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn listener(mut self, listener: impl ErrorListener + 'static) -> Self {
        self.listeners.add(Box::new(listener));
        self
    }

    /// Drop every listener added so far, including the console listener.
    pub fn remove_listeners(mut self) -> Self {
        self.listeners.clear();
        self
    }

    pub fn hooks(mut self, hooks: impl ParserHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn build<'i>(self, input: &'i mut dyn TokenStream) -> Interpreter<'i> {
        let atn = self.atn;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(DfaCache::new(&atn)));
        let outer_alt_states = outer_alt_states(&atn);
        Interpreter {
            recognizer: Recognizer::new(Arc::clone(&atn), self.vocabulary, input, self.listeners),
            strategy: self.strategy,
            hooks: self.hooks,
            cache,
            mode: self.mode,
            parent_context_stack: Vec::new(),
            override_decision: None,
            override_reached: false,
            override_root: None,
            root_context: None,
            outer_alt_states,
        }
    }
}

/// Decision states whose prediction is the outer alternative of their rule:
/// the first decision of a rule body, and the operator block of a
/// left-recursive rule.
fn outer_alt_states(atn: &Atn) -> Vec<bool> {
    let mut track = vec![false; atn.states.len()];
    for s in atn.states.iter().filter(|s| s.is_decision_state()) {
        if s.is_precedence_decision() {
            if let Some(t) = s.transitions.first() {
                track[t.target] = true;
            }
            continue;
        }
        let start = atn.rule_start(s.rule_index);
        if start.transitions.first().is_some_and(|t| t.target == s.number) {
            track[s.number] = true;
        }
    }
    track
}

/// Interprets a grammar's ATN over a token stream.
pub struct Interpreter<'i> {
    recognizer: Recognizer<'i>,
    strategy: Box<dyn ErrorStrategy>,
    hooks: Box<dyn ParserHooks>,
    cache: Arc<DfaCache>,
    mode: PredictionMode,
    /// For each active left-recursive invocation: the context and invoking
    /// state the invocation was made with.
    parent_context_stack: Vec<(Option<ContextId>, Option<StateId>)>,
    override_decision: Option<DecisionOverride>,
    override_reached: bool,
    override_root: Option<ContextId>,
    root_context: Option<ContextId>,
    outer_alt_states: Vec<bool>,
}

impl<'i> Interpreter<'i> {
    pub fn builder(atn: Arc<Atn>, vocabulary: Vocabulary) -> InterpreterBuilder {
        InterpreterBuilder::new(atn, vocabulary)
    }

    /// Index of the rule named `name`.
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.recognizer.atn.rule_index(name)
    }

    pub fn tree(&self) -> &ParseTree {
        &self.recognizer.tree
    }

    /// Takes the tree built by the last parse, leaving an empty one.
    pub fn take_tree(&mut self) -> ParseTree {
        let empty = ParseTree::new(self.recognizer.tree.rule_names().into());
        std::mem::replace(&mut self.recognizer.tree, empty)
    }

    pub fn dfa_cache(&self) -> &Arc<DfaCache> {
        &self.cache
    }

    pub fn syntax_errors(&self) -> usize {
        self.recognizer.syntax_errors
    }

    pub fn prediction_mode(&self) -> PredictionMode {
        self.mode
    }

    pub fn set_prediction_mode(&mut self, mode: PredictionMode) {
        self.mode = mode;
    }

    /// Outermost context of the last parse. For a left-recursive start rule
    /// this is the context the rule was entered with, not the one returned.
    pub fn root_context(&self) -> Option<ContextId> {
        self.root_context
    }

    /// Context that was current when the overridden decision was reached.
    pub fn override_root(&self) -> Option<ContextId> {
        self.override_root
    }

    /// Forces the prediction of `decision` to `alt` the first time the
    /// decision is reached with the input at `input_index`.
    ///
    /// The override fires at most once until [`Interpreter::reset`]. An `alt`
    /// the decision does not have is ignored and prediction runs as usual.
    pub fn add_decision_override(&mut self, decision: usize, input_index: usize, alt: usize) {
        self.override_decision = Some(DecisionOverride {
            decision,
            input_index,
            alt,
        });
    }

    /// Rewinds the input and clears error state, for parsing the same input
    /// again. The DFA cache is kept.
    pub fn reset(&mut self) {
        self.recognizer.input.seek(0);
        self.strategy.reset(&mut self.recognizer);
        self.recognizer.ctx = None;
        self.recognizer.syntax_errors = 0;
        self.recognizer.matched_eof = false;
        self.recognizer.precedence_stack = vec![0];
        self.parent_context_stack.clear();
        self.override_reached = false;
        self.override_root = None;
        self.root_context = None;
    }

    /// Parses from the rule with index `rule_index`.
    ///
    /// This is a convenience method that uses `NoopTracer`, which gets
    /// completely optimized away at compile time.
    pub fn parse(&mut self, rule_index: usize) -> Result<ContextId, ParseError> {
        self.parse_with(rule_index, &mut NoopTracer)
    }

    /// Parses with a tracer for debugging.
    ///
    /// Returns the context of the start rule. Syntax errors are reported to
    /// the listeners and recovered from; only the error strategy can end the
    /// parse early.
    pub fn parse_with<T: Tracer>(
        &mut self,
        rule_index: usize,
        tracer: &mut T,
    ) -> Result<ContextId, ParseError> {
        let atn = Arc::clone(&self.recognizer.atn);
        let Some(&start_state) = atn.rule_to_start.get(rule_index) else {
            return Err(ParseError::InvalidStartRule(rule_index));
        };

        self.recognizer.tree = ParseTree::new(atn.rule_names.clone().into());
        self.recognizer.ctx = None;
        self.recognizer.matched_eof = false;
        self.recognizer.precedence_stack = vec![0];
        self.parent_context_stack.clear();
        self.strategy.reset(&mut self.recognizer);

        let root = self.recognizer.tree.create(rule_index, None, None);
        self.root_context = Some(root);
        if atn.is_left_recursive(rule_index) {
            self.enter_recursion_rule(root, start_state, rule_index, 0, tracer);
        } else {
            self.enter_rule(root, start_state, rule_index, tracer);
        }

        loop {
            let p = atn.state(self.recognizer.state);
            let Some(ctx) = self.recognizer.ctx else {
                return Ok(root);
            };

            if p.is_rule_stop() && self.recognizer.tree.node(ctx).invoking_state.is_none() {
                if atn.is_left_recursive(rule_index) {
                    let (parent, _) = self.parent_context_stack.pop().unwrap_or((None, None));
                    self.unroll_recursion_contexts(parent, tracer);
                    return Ok(ctx);
                }
                self.exit_rule(tracer);
                return Ok(root);
            }

            if p.is_rule_stop() {
                self.visit_rule_stop_state(p, tracer);
                continue;
            }

            tracer.trace_state(p);
            match self.visit_state(p, tracer) {
                Ok(()) => {}
                Err(Interrupt::Recognition(error)) => {
                    tracer.trace_error(&error);
                    self.recognizer.state = atn.rule_to_stop[p.rule_index];
                    self.recognizer.tree.node_mut(ctx).exception = Some(error.clone());
                    self.strategy.report_error(&mut self.recognizer, &error);
                    self.recover(&error)?;
                }
                Err(Interrupt::Parse(error)) => return Err(error),
            }
        }
    }

    /// Resynchronizes after `error`. When recovery consumed nothing, an error
    /// node records where the rule gave up.
    fn recover(&mut self, error: &RecognitionError) -> Result<(), ParseError> {
        let index = self.recognizer.index();
        match self.strategy.recover(&mut self.recognizer, error) {
            Ok(()) => {}
            Err(Interrupt::Parse(e)) => return Err(e),
            Err(Interrupt::Recognition(_)) => {}
        }
        if self.recognizer.index() != index {
            return Ok(());
        }

        let offending = error.offending_token();
        let token_type: TokenType = match error {
            RecognitionError::InputMismatch { expected, .. } => {
                expected.min_element().unwrap_or(INVALID_TYPE)
            }
            _ => INVALID_TYPE,
        };
        let token = Token {
            token_type,
            text: offending.text.clone(),
            index: None,
            line: offending.line,
            column: offending.column,
        };
        if let Some(ctx) = self.recognizer.ctx {
            self.recognizer.tree.add_child(ctx, Child::Error(token));
        }
        Ok(())
    }

    fn visit_state<T: Tracer>(&mut self, p: &AtnState, tracer: &mut T) -> Result<(), Interrupt> {
        let atn = Arc::clone(&self.recognizer.atn);
        let predicted = if p.is_decision_state() {
            self.visit_decision_state(p, tracer)?
        } else {
            1
        };

        let transition = p.transition(predicted - 1);
        match &transition.kind {
            TransitionKind::Epsilon { .. } => {
                if p.is_precedence_decision()
                    && !matches!(atn.state(transition.target).kind, StateKind::LoopEnd { .. })
                {
                    // Another trip around the operator loop: the context so
                    // far becomes the left operand.
                    let (parent, invoking) =
                        self.parent_context_stack.last().copied().unwrap_or((None, None));
                    let local = self.recognizer.tree.create(p.rule_index, parent, invoking);
                    self.push_new_recursion_context(local, atn.rule_to_start[p.rule_index]);
                }
            }
            TransitionKind::Atom(ttype) => self.match_token(*ttype, tracer)?,
            TransitionKind::Range(..) | TransitionKind::Set(_) | TransitionKind::NotSet(_) => {
                if !transition.matches(self.recognizer.la(1), MIN_USER_TOKEN_TYPE, atn.max_token_type)
                {
                    self.strategy.recover_inline(&mut self.recognizer)?;
                }
                self.match_wildcard(tracer)?;
            }
            TransitionKind::Wildcard => self.match_wildcard(tracer)?,
            TransitionKind::Rule {
                rule_index,
                precedence,
                ..
            } => {
                let ctx = self.recognizer.ctx;
                let new = self
                    .recognizer
                    .tree
                    .create(*rule_index, ctx, Some(p.number));
                if atn.is_left_recursive(*rule_index) {
                    self.enter_recursion_rule(new, transition.target, *rule_index, *precedence, tracer);
                } else {
                    self.enter_rule(new, transition.target, *rule_index, tracer);
                }
            }
            TransitionKind::Predicate {
                rule_index,
                pred_index,
                ..
            } => {
                let ctx = self.recognizer.ctx;
                if !self
                    .hooks
                    .sempred(&self.recognizer.tree, ctx, *rule_index, *pred_index)
                {
                    return Err(self.failed_predicate(
                        *rule_index,
                        format!("sempred(_ctx, {rule_index}, {pred_index})"),
                    ));
                }
            }
            TransitionKind::Action {
                rule_index,
                action_index,
            } => {
                if let Some(ctx) = self.recognizer.ctx {
                    self.hooks
                        .action(&self.recognizer.tree, ctx, *rule_index, *action_index);
                }
            }
            TransitionKind::Precedence { precedence } => {
                if !self.recognizer.precpred(*precedence) {
                    return Err(
                        self.failed_predicate(p.rule_index, format!("precpred(_ctx, {precedence})"))
                    );
                }
            }
        }

        self.recognizer.state = transition.target;
        Ok(())
    }

    fn failed_predicate(&self, rule_index: usize, predicate: String) -> Interrupt {
        RecognitionError::failed_predicate(
            self.recognizer.current_token(),
            rule_index,
            predicate,
            self.recognizer.state,
            self.recognizer.ctx,
        )
        .into()
    }

    fn visit_decision_state<T: Tracer>(
        &mut self,
        p: &AtnState,
        tracer: &mut T,
    ) -> Result<usize, Interrupt> {
        let mut predicted = 1;
        if p.num_transitions() > 1 {
            self.strategy.sync(&mut self.recognizer)?;
            if let Some(decision) = p.decision() {
                let index = self.recognizer.index();
                let forced = self
                    .override_decision
                    .filter(|o| o.decision == decision && o.input_index == index)
                    .filter(|o| (1..=p.num_transitions()).contains(&o.alt));
                predicted = match forced {
                    Some(o) if !self.override_reached => {
                        self.override_reached = true;
                        self.override_root = self.recognizer.ctx;
                        tracer.trace_prediction(decision, o.alt, PredictionSource::Override);
                        o.alt
                    }
                    _ => self.adaptive_predict(decision, tracer)?,
                };
            }
        }

        if self.outer_alt_states[p.number]
            && let Some(ctx) = self.recognizer.ctx
        {
            let atn = &self.recognizer.atn;
            let lr = atn.left_recursive_rules.get(p.rule_index).and_then(Option::as_ref);
            let alt_number = match (lr, &p.kind) {
                (Some(info), StateKind::BlockStart { block: BlockKind::Basic, .. }) => {
                    info.primary_alts.get(predicted - 1).copied()
                }
                (Some(info), StateKind::BlockStart { block: BlockKind::Star, .. }) => {
                    info.op_alts.get(predicted - 1).copied()
                }
                _ => None,
            };
            self.recognizer.tree.node_mut(ctx).alt_number = alt_number.unwrap_or(predicted);
        }
        Ok(predicted)
    }

    fn adaptive_predict<T: Tracer>(
        &mut self,
        decision: usize,
        tracer: &mut T,
    ) -> Result<usize, RecognitionError> {
        let atn = Arc::clone(&self.recognizer.atn);
        let cache = Arc::clone(&self.cache);
        let Some(outer) = self.recognizer.ctx else {
            return Ok(1);
        };
        Simulation::new(
            &atn,
            cache.dfa(decision),
            self.mode,
            &mut self.recognizer,
            &mut *self.hooks,
            tracer,
            outer,
        )
        .adaptive_predict()
    }

    fn match_token<T: Tracer>(&mut self, ttype: TokenType, tracer: &mut T) -> Result<(), Interrupt> {
        if self.recognizer.la(1) == ttype {
            if ttype == EOF {
                self.recognizer.matched_eof = true;
            }
            self.strategy.report_match(&mut self.recognizer);
            let token = self
                .recognizer
                .consume(self.strategy.in_error_recovery_mode());
            tracer.trace_match(&token);
            return Ok(());
        }
        let token = self.strategy.recover_inline(&mut self.recognizer)?;
        self.add_conjured(token);
        Ok(())
    }

    fn match_wildcard<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), Interrupt> {
        if self.recognizer.la(1) > 0 {
            self.strategy.report_match(&mut self.recognizer);
            let token = self
                .recognizer
                .consume(self.strategy.in_error_recovery_mode());
            tracer.trace_match(&token);
            return Ok(());
        }
        let token = self.strategy.recover_inline(&mut self.recognizer)?;
        self.add_conjured(token);
        Ok(())
    }

    /// Records a token invented by inline recovery as an error node.
    fn add_conjured(&mut self, token: Token) {
        if token.is_synthetic()
            && let Some(ctx) = self.recognizer.ctx
        {
            self.recognizer.tree.add_child(ctx, Child::Error(token));
        }
    }

    fn enter_rule<T: Tracer>(
        &mut self,
        local: ContextId,
        state: StateId,
        rule_index: usize,
        tracer: &mut T,
    ) {
        let start = self.recognizer.lt(1).cloned();
        let tree = &mut self.recognizer.tree;
        tree.node_mut(local).start = start;
        if let Some(parent) = tree.node(local).parent {
            tree.add_child(parent, Child::Rule(local));
        }
        self.recognizer.state = state;
        self.recognizer.ctx = Some(local);
        tracer.trace_enter_rule(rule_index, state);
    }

    fn exit_rule<T: Tracer>(&mut self, tracer: &mut T) {
        let Some(ctx) = self.recognizer.ctx else {
            return;
        };
        let stop = if self.recognizer.matched_eof {
            self.recognizer.lt(1).cloned()
        } else {
            self.recognizer.lt(-1).cloned()
        };
        let node = self.recognizer.tree.node_mut(ctx);
        node.stop = stop;
        let (rule_index, invoking, parent) = (node.rule_index, node.invoking_state, node.parent);
        if let Some(invoking) = invoking {
            self.recognizer.state = invoking;
        }
        self.recognizer.ctx = parent;
        tracer.trace_exit_rule(rule_index);
    }

    fn enter_recursion_rule<T: Tracer>(
        &mut self,
        local: ContextId,
        state: StateId,
        rule_index: usize,
        precedence: i32,
        tracer: &mut T,
    ) {
        let node = self.recognizer.tree.node(local);
        self.parent_context_stack
            .push((node.parent, node.invoking_state));
        self.recognizer.state = state;
        self.recognizer.precedence_stack.push(precedence);
        self.recognizer.ctx = Some(local);
        let start = self.recognizer.lt(1).cloned();
        self.recognizer.tree.node_mut(local).start = start;
        tracer.trace_enter_rule(rule_index, state);
    }

    /// Makes `local` the new current context, with the current one as its
    /// first child.
    fn push_new_recursion_context(&mut self, local: ContextId, state: StateId) {
        let Some(previous) = self.recognizer.ctx else {
            return;
        };
        let stop = self.recognizer.lt(-1).cloned();
        let tree = &mut self.recognizer.tree;
        let start = {
            let prev = tree.node_mut(previous);
            prev.parent = Some(local);
            prev.invoking_state = Some(state);
            prev.stop = stop;
            prev.start.clone()
        };
        tree.node_mut(local).start = start;
        tree.add_child(local, Child::Rule(previous));
        self.recognizer.ctx = Some(local);
    }

    /// Leaves a left-recursive invocation, attaching its outermost context
    /// to `parent`.
    fn unroll_recursion_contexts<T: Tracer>(&mut self, parent: Option<ContextId>, tracer: &mut T) {
        self.recognizer.precedence_stack.pop();
        let Some(ret) = self.recognizer.ctx else {
            return;
        };
        let stop = self.recognizer.lt(-1).cloned();
        let tree = &mut self.recognizer.tree;
        let node = tree.node_mut(ret);
        node.stop = stop;
        node.parent = parent;
        let rule_index = node.rule_index;
        if let Some(parent) = parent {
            tree.add_child(parent, Child::Rule(ret));
        }
        self.recognizer.ctx = parent;
        tracer.trace_exit_rule(rule_index);
    }

    fn visit_rule_stop_state<T: Tracer>(&mut self, p: &AtnState, tracer: &mut T) {
        let atn = Arc::clone(&self.recognizer.atn);
        if atn.is_left_recursive(p.rule_index) {
            let (parent, invoking) = self.parent_context_stack.pop().unwrap_or((None, None));
            self.unroll_recursion_contexts(parent, tracer);
            if let Some(invoking) = invoking {
                self.recognizer.state = invoking;
            }
        } else {
            self.exit_rule(tracer);
        }

        let invoking = atn.state(self.recognizer.state);
        if let Some(TransitionKind::Rule { follow, .. }) = invoking.transitions.first().map(|t| &t.kind) {
            self.recognizer.state = *follow;
        }
    }
}
