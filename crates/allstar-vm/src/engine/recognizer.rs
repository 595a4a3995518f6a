//! Parse state shared between the interpreter and its error strategy.

use std::sync::Arc;

use allstar_core::atn::{Atn, PredictionContext, StateId, TransitionKind};
use allstar_core::{IntervalSet, Token, TokenType, Vocabulary};

use crate::dfa::Dfa;
use crate::error::RecognitionError;
use crate::listener::{ErrorListeners, Report};
use crate::prediction::{AltSet, AtnConfigSet};
use crate::token_stream::TokenStream;
use crate::tree::{Child, ContextId, ParseTree};

/// Input, tree and position of a parse in progress.
///
/// Error strategies receive this rather than the interpreter, so they can
/// inspect and consume input and add nodes without reaching into prediction.
pub struct Recognizer<'i> {
    pub(crate) atn: Arc<Atn>,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) input: &'i mut dyn TokenStream,
    pub(crate) tree: ParseTree,
    pub(crate) ctx: Option<ContextId>,
    pub(crate) state: StateId,
    /// Precedence of each active left-recursive invocation; starts as `[0]`.
    pub(crate) precedence_stack: Vec<i32>,
    pub(crate) listeners: ErrorListeners,
    pub(crate) syntax_errors: usize,
    pub(crate) matched_eof: bool,
}

impl<'i> Recognizer<'i> {
    pub(crate) fn new(
        atn: Arc<Atn>,
        vocabulary: Vocabulary,
        input: &'i mut dyn TokenStream,
        listeners: ErrorListeners,
    ) -> Self {
        let tree = ParseTree::new(atn.rule_names.clone().into());
        Self {
            atn,
            vocabulary,
            input,
            tree,
            ctx: None,
            state: 0,
            precedence_stack: vec![0],
            listeners,
            syntax_errors: 0,
            matched_eof: false,
        }
    }

    pub fn atn(&self) -> &Atn {
        &self.atn
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn rule_names(&self) -> &[String] {
        &self.atn.rule_names
    }

    pub fn input(&self) -> &dyn TokenStream {
        &*self.input
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ParseTree {
        &mut self.tree
    }

    pub fn context(&self) -> Option<ContextId> {
        self.ctx
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn la(&self, i: isize) -> TokenType {
        self.input.la(i)
    }

    pub fn lt(&self, i: isize) -> Option<&Token> {
        self.input.lt(i)
    }

    pub fn current_token(&self) -> Token {
        self.input.lt(1).cloned().unwrap_or_else(Token::eof)
    }

    pub fn index(&self) -> usize {
        self.input.index()
    }

    /// Precedence of the innermost left-recursive invocation, `-1` outside
    /// of one.
    pub fn precedence(&self) -> i32 {
        self.precedence_stack.last().copied().unwrap_or(-1)
    }

    pub fn precpred(&self, precedence: i32) -> bool {
        self.precedence_stack
            .last()
            .is_none_or(|&top| precedence >= top)
    }

    pub fn syntax_errors(&self) -> usize {
        self.syntax_errors
    }

    /// Consumes the current token and records it in the current context, as
    /// an error node when `as_error`. EOF is recorded but not consumed.
    pub fn consume(&mut self, as_error: bool) -> Token {
        let token = self.current_token();
        if !token.is_eof() {
            self.input.consume();
        }
        if let Some(ctx) = self.ctx {
            let child = if as_error {
                Child::Error(token.clone())
            } else {
                Child::Token(token.clone())
            };
            self.tree.add_child(ctx, child);
        }
        token
    }

    /// Invoking states of the contexts from `ctx` up, innermost first,
    /// excluding the outermost context.
    pub fn invoking_states(&self, ctx: Option<ContextId>) -> Vec<StateId> {
        let mut states = Vec::new();
        let mut cur = ctx;
        while let Some(id) = cur {
            let node = self.tree.node(id);
            let Some(parent) = node.parent else {
                break;
            };
            if let Some(invoking) = node.invoking_state {
                states.push(invoking);
            }
            cur = Some(parent);
        }
        states
    }

    /// Full-context stack for the rule invocations active at `ctx`.
    pub fn prediction_context(&self, ctx: Option<ContextId>) -> Arc<PredictionContext> {
        PredictionContext::from_invocation_chain(&self.atn, self.invoking_states(ctx))
    }

    /// Tokens that can follow the current state given the active invocations.
    pub fn expected_tokens(&self) -> IntervalSet {
        self.expected_tokens_at(self.state, self.ctx)
    }

    pub fn expected_tokens_at(&self, state: StateId, ctx: Option<ContextId>) -> IntervalSet {
        let mut invoking = Vec::new();
        let mut cur = ctx;
        while let Some(id) = cur {
            let node = self.tree.node(id);
            let Some(state) = node.invoking_state else {
                break;
            };
            invoking.push(state);
            cur = node.parent;
        }
        self.atn.expected_tokens(state, invoking)
    }

    pub fn next_tokens_in_context(&self, state: StateId) -> IntervalSet {
        let ctx = self.prediction_context(self.ctx);
        self.atn.next_tokens_in_context(state, &ctx)
    }

    /// Union of what can follow each active invocation, used to resync.
    pub fn error_recovery_set(&self) -> IntervalSet {
        let mut set = IntervalSet::new();
        let mut cur = self.ctx;
        while let Some(id) = cur {
            let node = self.tree.node(id);
            let Some(invoking) = node.invoking_state else {
                break;
            };
            if let TransitionKind::Rule { follow, .. } = self.atn.state(invoking).transition(0).kind
            {
                set.add_all(self.atn.next_tokens(follow));
            }
            cur = node.parent;
        }
        set.remove(allstar_core::EPSILON);
        set
    }

    pub fn notify_error_listeners(
        &mut self,
        offending: &Token,
        message: &str,
        error: Option<&RecognitionError>,
    ) {
        self.syntax_errors += 1;
        self.listeners.syntax_error(offending, message, error);
    }

    pub(crate) fn report_ambiguity(
        &mut self,
        dfa: &Dfa,
        start_index: usize,
        stop_index: usize,
        exact: bool,
        ambig_alts: Option<&AltSet>,
        configs: &AtnConfigSet,
    ) {
        if self.listeners.is_empty() {
            return;
        }
        let atn = Arc::clone(&self.atn);
        let text = self.input.text(start_index, stop_index);
        let mut report = Report::new(dfa, start_index, stop_index, configs, &atn.rule_names, text);
        self.listeners
            .report_ambiguity(&mut report, exact, ambig_alts);
        self.deliver(start_index, report.into_notices());
    }

    pub(crate) fn report_attempting_full_context(
        &mut self,
        dfa: &Dfa,
        start_index: usize,
        stop_index: usize,
        conflicting_alts: Option<&AltSet>,
        configs: &AtnConfigSet,
    ) {
        if self.listeners.is_empty() {
            return;
        }
        let atn = Arc::clone(&self.atn);
        let text = self.input.text(start_index, stop_index);
        let mut report = Report::new(dfa, start_index, stop_index, configs, &atn.rule_names, text);
        self.listeners
            .report_attempting_full_context(&mut report, conflicting_alts);
        self.deliver(start_index, report.into_notices());
    }

    pub(crate) fn report_context_sensitivity(
        &mut self,
        dfa: &Dfa,
        start_index: usize,
        stop_index: usize,
        prediction: usize,
        configs: &AtnConfigSet,
    ) {
        if self.listeners.is_empty() {
            return;
        }
        let atn = Arc::clone(&self.atn);
        let text = self.input.text(start_index, stop_index);
        let mut report = Report::new(dfa, start_index, stop_index, configs, &atn.rule_names, text);
        self.listeners
            .report_context_sensitivity(&mut report, prediction);
        self.deliver(start_index, report.into_notices());
    }

    fn deliver(&mut self, start_index: usize, notices: Vec<String>) {
        if notices.is_empty() {
            return;
        }
        let token = self
            .input
            .get(start_index)
            .cloned()
            .unwrap_or_else(Token::eof);
        for message in notices {
            self.notify_error_listeners(&token, &message, None);
        }
    }
}
