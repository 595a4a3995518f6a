//! Grammar diagnostics: collection, builder and rendering.

mod message;
mod printer;

#[cfg(test)]
mod diagnostics_tests;

use allstar_core::grammar::Span;

pub use message::{DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic with the given kind and optional source span.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(&mut self, kind: DiagnosticKind, span: Option<Span>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::with_default_message(kind, span),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.messages.iter().map(|d| d.kind).collect()
    }

    /// Whether a diagnostic of `kind` was reported for `rule`.
    pub fn has(&self, kind: DiagnosticKind, rule: &str) -> bool {
        self.messages
            .iter()
            .any(|d| d.kind == kind && d.rule.as_deref() == Some(rule))
    }

    /// Diagnostics with lower-priority messages about an already reported
    /// rule removed.
    pub fn filtered(&self) -> Vec<DiagnosticMessage> {
        self.messages
            .iter()
            .filter(|b| {
                !self.messages.iter().any(|a| {
                    a.rule.is_some() && a.rule == b.rule && a.kind.suppresses(&b.kind)
                })
            })
            .cloned()
            .collect()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<DiagnosticMessage> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = DiagnosticMessage>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Names the rule this diagnostic is about and uses it as the message detail.
    pub fn rule(mut self, name: &str) -> Self {
        self.message.rule = Some(name.to_string());
        self.message(name)
    }

    /// Attaches the diagnostic to `name` without changing the message.
    pub fn in_rule(mut self, name: &str) -> Self {
        self.message.rule = Some(name.to_string());
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, span: Span) -> Self {
        self.message.related.push(RelatedInfo::new(span, msg));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
