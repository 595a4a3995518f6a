//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use allstar_core::grammar::Span;
use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::Diagnostics;
use super::message::Severity;

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }

            let Some(span) = diag.span else {
                write!(w, "{}", diag)?;
                continue;
            };
            let range = adjust_range(span, source.len());

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(range)
                    .label(&diag.message),
            );

            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            for related in &diag.related {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(related.span, source.len()))
                        .label(&related.message),
                );
            }

            let level = severity_to_level(diag.severity());
            let mut report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];
            for hint in &diag.hints {
                report.push(Group::with_title(Level::HELP.secondary_title(hint)));
            }

            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", diag)?;
        }
        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(span: Span, limit: usize) -> std::ops::Range<usize> {
    if span.start == span.end {
        return span.start..(span.start + 1).min(limit);
    }
    span.start..span.end.min(limit)
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
