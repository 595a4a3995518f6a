use allstar_core::grammar::Span;

use super::*;

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedRule, Some(Span::new(0, 5)))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.printer().render(), @"error at 0..5: undefined rule");
}

#[test]
fn report_for_rule() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EpsilonClosure, None)
        .rule("a")
        .emit();

    assert!(diagnostics.has(DiagnosticKind::EpsilonClosure, "a"));
    assert!(!diagnostics.has(DiagnosticKind::EpsilonClosure, "b"));
    insta::assert_snapshot!(
        diagnostics.printer().render(),
        @"error: rule `a` contains a closure with at least one alternative that can match an empty string"
    );
}

#[test]
fn optional_block_is_warning() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EpsilonOptional, None)
        .rule("s")
        .emit();

    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 0);
}

#[test]
fn default_hint_is_attached() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::NoNonLeftRecursiveAlts, None)
        .rule("a")
        .emit();

    insta::assert_snapshot!(
        diagnostics.printer().render(),
        @"error: left-recursive rule `a` must contain an alternative which is not left recursive (hint: add a primary alternative, e.g. `e : e '+' e | INT`)"
    );
}

#[test]
fn filtered_keeps_highest_priority_per_rule() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EpsilonClosure, None)
        .rule("a")
        .emit();
    diagnostics
        .report(DiagnosticKind::UndefinedToken, None)
        .message("X")
        .emit();
    diagnostics
        .report(DiagnosticKind::NonconformingLeftRecursion, None)
        .rule("a")
        .emit();

    let kinds: Vec<_> = diagnostics.filtered().iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::UndefinedToken,
            DiagnosticKind::NonconformingLeftRecursion
        ]
    );
}

#[test]
fn render_with_source() {
    let source = "a : a ;";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedToken, Some(Span::new(4, 5)))
        .message("X")
        .emit();

    insta::assert_snapshot!(diagnostics.printer().source(source).render(), @r"
    error: token `X` is not defined
      |
    1 | a : a ;
      |     ^ token `X` is not defined
    ");
}

#[test]
fn render_without_span_falls_back_to_plain() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::LeftRecursionCycles, None)
        .message("[a, b]")
        .emit();

    insta::assert_snapshot!(
        diagnostics.printer().source("a : b ;").render(),
        @"error: the following sets of rules are mutually left-recursive [a, b] (hint: indirect left recursion is not rewritten; inline the called rules)"
    );
}
