//! Error reporting and recovery strategies.
//!
//! [`DefaultErrorStrategy`] reports each error once, then resynchronizes by
//! single-token deletion or insertion where that repairs the input, or by
//! skipping to a token some active rule can continue with.
//! [`BailErrorStrategy`] gives up at the first error instead.

use std::sync::Arc;

use allstar_core::atn::{StateId, StateKind};
use allstar_core::token::escape_ws_and_quote;
use allstar_core::{EOF, EPSILON, INVALID_TYPE, IntervalSet, Token};

use crate::engine::Recognizer;
use crate::error::{Interrupt, ParseError, RecognitionError};
use crate::tree::ContextId;

pub trait ErrorStrategy {
    /// Forgets any recovery in progress.
    fn reset(&mut self, recognizer: &mut Recognizer<'_>);

    /// Checks the input before a decision or loop iteration, consuming
    /// tokens that cannot start anything the state expects.
    fn sync(&mut self, recognizer: &mut Recognizer<'_>) -> Result<(), Interrupt>;

    /// Resynchronizes after `error` ended the current rule.
    fn recover(
        &mut self,
        recognizer: &mut Recognizer<'_>,
        error: &RecognitionError,
    ) -> Result<(), Interrupt>;

    /// Repairs a failed token match in place. Returns the token to use as
    /// matched; a token without an index was conjured.
    fn recover_inline(&mut self, recognizer: &mut Recognizer<'_>) -> Result<Token, Interrupt>;

    fn report_error(&mut self, recognizer: &mut Recognizer<'_>, error: &RecognitionError);

    /// Called after a token matched; ends recovery mode.
    fn report_match(&mut self, recognizer: &mut Recognizer<'_>);

    fn in_error_recovery_mode(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct DefaultErrorStrategy {
    /// Set after an error is reported and cleared by the next match; further
    /// errors are not reported meanwhile.
    error_recovery_mode: bool,
    last_error_index: Option<usize>,
    last_error_states: Vec<StateId>,
    /// Where `sync` last saw a state that could fall off the end of its rule.
    next_tokens_ctx: Option<ContextId>,
    next_tokens_state: Option<StateId>,
}

impl DefaultErrorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_error_condition(&mut self) {
        self.error_recovery_mode = true;
    }

    fn end_error_condition(&mut self) {
        self.error_recovery_mode = false;
        self.last_error_states.clear();
        self.last_error_index = None;
    }

    fn consume_until(&mut self, recognizer: &mut Recognizer<'_>, set: &IntervalSet) {
        let mut ttype = recognizer.la(1);
        while ttype != EOF && !set.contains(ttype) {
            recognizer.consume(self.error_recovery_mode);
            ttype = recognizer.la(1);
        }
    }

    fn report_unwanted_token(&mut self, recognizer: &mut Recognizer<'_>) {
        if self.error_recovery_mode {
            return;
        }
        self.begin_error_condition();
        let token = recognizer.current_token();
        let expecting = recognizer.expected_tokens();
        let message = format!(
            "extraneous input {} expecting {}",
            token.error_display(),
            expecting.to_string_with(recognizer.vocabulary())
        );
        recognizer.notify_error_listeners(&token, &message, None);
    }

    fn report_missing_token(&mut self, recognizer: &mut Recognizer<'_>) {
        if self.error_recovery_mode {
            return;
        }
        self.begin_error_condition();
        let token = recognizer.current_token();
        let expecting = recognizer.expected_tokens();
        let message = format!(
            "missing {} at {}",
            expecting.to_string_with(recognizer.vocabulary()),
            token.error_display()
        );
        recognizer.notify_error_listeners(&token, &message, None);
    }

    /// If the token after the current one is expected, reports the current
    /// token as extraneous, drops it and returns the expected token.
    fn single_token_deletion(&mut self, recognizer: &mut Recognizer<'_>) -> Option<Token> {
        let next_type = recognizer.la(2);
        if !recognizer.expected_tokens().contains(next_type) {
            return None;
        }
        self.report_unwanted_token(recognizer);
        recognizer.consume(self.error_recovery_mode);
        let matched = recognizer.current_token();
        self.report_match(recognizer);
        Some(matched)
    }

    /// Whether the current token could follow the expected one, so that
    /// conjuring the expected token repairs the input.
    fn single_token_insertion(&mut self, recognizer: &mut Recognizer<'_>) -> bool {
        let current = recognizer.la(1);
        let state = recognizer.atn().state(recognizer.state());
        let Some(transition) = state.transitions.first() else {
            return false;
        };
        let next = transition.target;
        if recognizer.next_tokens_in_context(next).contains(current) {
            self.report_missing_token(recognizer);
            return true;
        }
        false
    }

    fn missing_symbol(&self, recognizer: &Recognizer<'_>) -> Token {
        let current = recognizer.current_token();
        let expected_type = recognizer
            .expected_tokens()
            .min_element()
            .unwrap_or(INVALID_TYPE);
        let text = if expected_type == EOF {
            "<missing EOF>".to_string()
        } else {
            format!(
                "<missing {}>",
                recognizer.vocabulary().display_name(expected_type)
            )
        };
        let position = match recognizer.lt(-1) {
            Some(previous) if current.is_eof() => previous,
            _ => &current,
        };
        Token {
            token_type: expected_type,
            text: Some(text),
            index: None,
            line: position.line,
            column: position.column,
        }
    }

    fn input_mismatch(&self, recognizer: &Recognizer<'_>) -> RecognitionError {
        let (state, ctx) = match self.next_tokens_ctx {
            Some(ctx) => (
                self.next_tokens_state.unwrap_or(recognizer.state()),
                Some(ctx),
            ),
            None => (recognizer.state(), recognizer.context()),
        };
        RecognitionError::InputMismatch {
            offending_token: recognizer.current_token(),
            expected: recognizer.expected_tokens_at(state, ctx),
            state,
            ctx,
        }
    }
}

impl ErrorStrategy for DefaultErrorStrategy {
    fn reset(&mut self, _recognizer: &mut Recognizer<'_>) {
        self.end_error_condition();
        self.next_tokens_ctx = None;
        self.next_tokens_state = None;
    }

    fn sync(&mut self, recognizer: &mut Recognizer<'_>) -> Result<(), Interrupt> {
        if self.error_recovery_mode {
            return Ok(());
        }
        let atn = Arc::clone(&recognizer.atn);
        let state = atn.state(recognizer.state());
        let la = recognizer.la(1);
        let next = atn.next_tokens(state.number);
        if next.contains(la) {
            self.next_tokens_ctx = None;
            self.next_tokens_state = None;
            return Ok(());
        }
        if next.contains(EPSILON) {
            if self.next_tokens_ctx.is_none() {
                self.next_tokens_ctx = recognizer.context();
                self.next_tokens_state = Some(recognizer.state());
            }
            return Ok(());
        }
        match state.kind {
            StateKind::BlockStart { .. } | StateKind::StarLoopEntry { .. } => {
                if self.single_token_deletion(recognizer).is_some() {
                    return Ok(());
                }
                Err(RecognitionError::InputMismatch {
                    offending_token: recognizer.current_token(),
                    expected: recognizer.expected_tokens(),
                    state: recognizer.state(),
                    ctx: recognizer.context(),
                }
                .into())
            }
            StateKind::PlusLoopback { .. } | StateKind::StarLoopback => {
                self.report_unwanted_token(recognizer);
                let mut what = recognizer.expected_tokens();
                what.add_all(&recognizer.error_recovery_set());
                self.consume_until(recognizer, &what);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn recover(
        &mut self,
        recognizer: &mut Recognizer<'_>,
        _error: &RecognitionError,
    ) -> Result<(), Interrupt> {
        let index = recognizer.index();
        if self.last_error_index == Some(index)
            && self.last_error_states.contains(&recognizer.state())
        {
            // Stuck at the same spot: make progress by dropping a token.
            recognizer.consume(self.error_recovery_mode);
        }
        self.last_error_index = Some(recognizer.index());
        self.last_error_states.push(recognizer.state());
        let follow = recognizer.error_recovery_set();
        self.consume_until(recognizer, &follow);
        Ok(())
    }

    fn recover_inline(&mut self, recognizer: &mut Recognizer<'_>) -> Result<Token, Interrupt> {
        if let Some(matched) = self.single_token_deletion(recognizer) {
            recognizer.consume(self.error_recovery_mode);
            return Ok(matched);
        }
        if self.single_token_insertion(recognizer) {
            return Ok(self.missing_symbol(recognizer));
        }
        Err(self.input_mismatch(recognizer).into())
    }

    fn report_error(&mut self, recognizer: &mut Recognizer<'_>, error: &RecognitionError) {
        if self.error_recovery_mode {
            return;
        }
        self.begin_error_condition();
        let message = match error {
            RecognitionError::NoViableAlt {
                start_token,
                offending_token,
                ..
            } => {
                let input = if start_token.is_eof() {
                    "<EOF>".to_string()
                } else {
                    let start = start_token.index.unwrap_or(0);
                    let stop = offending_token.index.unwrap_or(start);
                    recognizer.input().text(start, stop)
                };
                format!("no viable alternative at input {}", escape_ws_and_quote(&input))
            }
            RecognitionError::InputMismatch {
                offending_token,
                expected,
                ..
            } => format!(
                "mismatched input {} expecting {}",
                offending_token.error_display(),
                expected.to_string_with(recognizer.vocabulary())
            ),
            RecognitionError::FailedPredicate {
                rule_index,
                message,
                ..
            } => {
                let rule = recognizer
                    .rule_names()
                    .get(*rule_index)
                    .map_or("?", String::as_str);
                format!("rule {rule} {message}")
            }
        };
        recognizer.notify_error_listeners(error.offending_token(), &message, Some(error));
    }

    fn report_match(&mut self, _recognizer: &mut Recognizer<'_>) {
        self.end_error_condition();
    }

    fn in_error_recovery_mode(&self) -> bool {
        self.error_recovery_mode
    }
}

/// Cancels the parse at the first syntax error.
///
/// Every context from the failing rule up records the error before the parse
/// ends with [`ParseError::Cancelled`].
#[derive(Debug, Default)]
pub struct BailErrorStrategy {
    inner: DefaultErrorStrategy,
}

impl BailErrorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn cancel(recognizer: &mut Recognizer<'_>, error: RecognitionError) -> Interrupt {
        let mut cur = recognizer.context();
        while let Some(id) = cur {
            let node = recognizer.tree_mut().node_mut(id);
            node.exception = Some(error.clone());
            cur = node.parent;
        }
        ParseError::Cancelled(error).into()
    }
}

impl ErrorStrategy for BailErrorStrategy {
    fn reset(&mut self, recognizer: &mut Recognizer<'_>) {
        self.inner.reset(recognizer);
    }

    fn sync(&mut self, _recognizer: &mut Recognizer<'_>) -> Result<(), Interrupt> {
        Ok(())
    }

    fn recover(
        &mut self,
        recognizer: &mut Recognizer<'_>,
        error: &RecognitionError,
    ) -> Result<(), Interrupt> {
        Err(Self::cancel(recognizer, error.clone()))
    }

    fn recover_inline(&mut self, recognizer: &mut Recognizer<'_>) -> Result<Token, Interrupt> {
        let error = RecognitionError::InputMismatch {
            offending_token: recognizer.current_token(),
            expected: recognizer.expected_tokens(),
            state: recognizer.state(),
            ctx: recognizer.context(),
        };
        Err(Self::cancel(recognizer, error))
    }

    fn report_error(&mut self, recognizer: &mut Recognizer<'_>, error: &RecognitionError) {
        self.inner.report_error(recognizer, error);
    }

    fn report_match(&mut self, recognizer: &mut Recognizer<'_>) {
        self.inner.report_match(recognizer);
    }

    fn in_error_recovery_mode(&self) -> bool {
        self.inner.in_error_recovery_mode()
    }
}
