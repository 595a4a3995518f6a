//! Error and diagnostic listeners.
//!
//! Listeners observe syntax errors and the advisory prediction events
//! (ambiguities, full-context retries, context sensitivity). Diagnostic
//! listeners turn the advisory events into messages by calling
//! [`Report::notify`]; the interpreter then delivers each message to every
//! listener's [`ErrorListener::syntax_error`] at the token where the decision
//! started.

use allstar_core::Token;

use crate::dfa::Dfa;
use crate::error::RecognitionError;
use crate::prediction::{AltSet, AtnConfigSet};

/// Context of a prediction event.
pub struct Report<'a> {
    pub dfa: &'a Dfa,
    /// Input index where the decision started.
    pub start_index: usize,
    /// Input index where the decision was resolved.
    pub stop_index: usize,
    pub configs: &'a AtnConfigSet,
    rule_names: &'a [String],
    text: String,
    notices: Vec<String>,
}

impl<'a> Report<'a> {
    pub fn new(
        dfa: &'a Dfa,
        start_index: usize,
        stop_index: usize,
        configs: &'a AtnConfigSet,
        rule_names: &'a [String],
        text: String,
    ) -> Self {
        Self {
            dfa,
            start_index,
            stop_index,
            configs,
            rule_names,
            text,
            notices: Vec::new(),
        }
    }

    /// `"<decision> (<rule>)"`, or the bare decision number when the rule
    /// has no name.
    pub fn decision_description(&self) -> String {
        let decision = self.dfa.decision;
        match self.rule_names.get(self.dfa.rule_index) {
            Some(name) if !name.is_empty() => format!("{decision} ({name})"),
            _ => decision.to_string(),
        }
    }

    /// Input text of the decision region.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Queues a message for delivery as a syntax error.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub(crate) fn into_notices(self) -> Vec<String> {
        self.notices
    }
}

pub trait ErrorListener {
    fn syntax_error(
        &mut self,
        _offending: &Token,
        _line: u32,
        _column: u32,
        _message: &str,
        _error: Option<&RecognitionError>,
    ) {
    }

    /// A decision matched the same input through more than one alternative.
    /// `exact` is true only when the ambiguity is known to be real.
    fn report_ambiguity(
        &mut self,
        _report: &mut Report<'_>,
        _exact: bool,
        _ambig_alts: Option<&AltSet>,
    ) {
    }

    /// SLL prediction conflicted and LL prediction is about to run.
    fn report_attempting_full_context(
        &mut self,
        _report: &mut Report<'_>,
        _conflicting_alts: Option<&AltSet>,
    ) {
    }

    /// LL prediction resolved a decision SLL could not.
    fn report_context_sensitivity(&mut self, _report: &mut Report<'_>, _prediction: usize) {}
}

/// Prints syntax errors to stderr as `line L:C message`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleErrorListener;

impl ErrorListener for ConsoleErrorListener {
    fn syntax_error(
        &mut self,
        _offending: &Token,
        line: u32,
        column: u32,
        message: &str,
        _error: Option<&RecognitionError>,
    ) {
        eprintln!("line {line}:{column} {message}");
    }
}

/// Reports prediction events as syntax errors.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticErrorListener {
    /// Report only ambiguities known to be exact.
    pub exact_only: bool,
}

impl Default for DiagnosticErrorListener {
    fn default() -> Self {
        Self { exact_only: true }
    }
}

impl DiagnosticErrorListener {
    pub fn new(exact_only: bool) -> Self {
        Self { exact_only }
    }
}

impl ErrorListener for DiagnosticErrorListener {
    fn report_ambiguity(
        &mut self,
        report: &mut Report<'_>,
        exact: bool,
        ambig_alts: Option<&AltSet>,
    ) {
        if self.exact_only && !exact {
            return;
        }
        let alts = ambig_alts
            .cloned()
            .unwrap_or_else(|| report.configs.alts());
        let message = format!(
            "reportAmbiguity d={}: ambigAlts={alts}, input='{}'",
            report.decision_description(),
            report.text()
        );
        report.notify(message);
    }

    fn report_attempting_full_context(
        &mut self,
        report: &mut Report<'_>,
        _conflicting_alts: Option<&AltSet>,
    ) {
        let message = format!(
            "reportAttemptingFullContext d={}, input='{}'",
            report.decision_description(),
            report.text()
        );
        report.notify(message);
    }

    fn report_context_sensitivity(&mut self, report: &mut Report<'_>, _prediction: usize) {
        let message = format!(
            "reportContextSensitivity d={}, input='{}'",
            report.decision_description(),
            report.text()
        );
        report.notify(message);
    }
}

/// The listeners attached to one interpreter.
#[derive(Default)]
pub struct ErrorListeners {
    listeners: Vec<Box<dyn ErrorListener>>,
}

impl ErrorListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn ErrorListener>) {
        self.listeners.push(listener);
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn syntax_error(
        &mut self,
        offending: &Token,
        message: &str,
        error: Option<&RecognitionError>,
    ) {
        for l in &mut self.listeners {
            l.syntax_error(offending, offending.line, offending.column, message, error);
        }
    }

    pub fn report_ambiguity(&mut self, report: &mut Report<'_>, exact: bool, alts: Option<&AltSet>) {
        for l in &mut self.listeners {
            l.report_ambiguity(report, exact, alts);
        }
    }

    pub fn report_attempting_full_context(
        &mut self,
        report: &mut Report<'_>,
        conflicting: Option<&AltSet>,
    ) {
        for l in &mut self.listeners {
            l.report_attempting_full_context(report, conflicting);
        }
    }

    pub fn report_context_sensitivity(&mut self, report: &mut Report<'_>, prediction: usize) {
        for l in &mut self.listeners {
            l.report_context_sensitivity(report, prediction);
        }
    }
}
