//! Errors raised while parsing.

use allstar_core::atn::StateId;
use allstar_core::{IntervalSet, Token};

use crate::tree::ContextId;

/// A recognition failure at one input position.
///
/// These are recoverable: the error strategy reports them and resynchronizes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// Prediction found no alternative that matches the input.
    #[error("no viable alternative at input {}", offending_token.error_display())]
    NoViableAlt {
        /// Where the decision started.
        start_token: Token,
        offending_token: Token,
        state: StateId,
        ctx: Option<ContextId>,
    },

    /// The current token is not one the state accepts.
    #[error("mismatched input {}", offending_token.error_display())]
    InputMismatch {
        offending_token: Token,
        expected: IntervalSet,
        state: StateId,
        ctx: Option<ContextId>,
    },

    /// A semantic or precedence predicate evaluated to false.
    #[error("{message}")]
    FailedPredicate {
        offending_token: Token,
        rule_index: usize,
        /// Predicate text, e.g. `precpred(_ctx, 2)`.
        predicate: String,
        message: String,
        state: StateId,
        ctx: Option<ContextId>,
    },
}

impl RecognitionError {
    pub fn offending_token(&self) -> &Token {
        match self {
            Self::NoViableAlt {
                offending_token, ..
            }
            | Self::InputMismatch {
                offending_token, ..
            }
            | Self::FailedPredicate {
                offending_token, ..
            } => offending_token,
        }
    }

    pub fn state(&self) -> StateId {
        match self {
            Self::NoViableAlt { state, .. }
            | Self::InputMismatch { state, .. }
            | Self::FailedPredicate { state, .. } => *state,
        }
    }

    pub fn ctx(&self) -> Option<ContextId> {
        match self {
            Self::NoViableAlt { ctx, .. }
            | Self::InputMismatch { ctx, .. }
            | Self::FailedPredicate { ctx, .. } => *ctx,
        }
    }

    pub(crate) fn failed_predicate(
        offending_token: Token,
        rule_index: usize,
        predicate: String,
        state: StateId,
        ctx: Option<ContextId>,
    ) -> Self {
        let message = format!("failed predicate: {{{predicate}}}?");
        Self::FailedPredicate {
            offending_token,
            rule_index,
            predicate,
            message,
            state,
            ctx,
        }
    }
}

/// Errors that end a parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A bail-out strategy gave up at the first recognition error.
    #[error("parse cancelled: {0}")]
    Cancelled(RecognitionError),

    #[error("no rule with index {0}")]
    InvalidStartRule(usize),
}

/// Why an error-strategy step did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Interrupt {
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
