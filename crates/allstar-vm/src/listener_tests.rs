use allstar_core::grammar::{Grammar, alt, optional, rule_ref, token};

use crate::listener::{DiagnosticErrorListener, ErrorListener, Report};
use crate::prediction::{AltSet, PredictionMode};
use crate::test_utils::Harness;

/// `s` is ambiguous on `a b c`: `b` is either `x` or a plain token.
fn ambiguous() -> Harness {
    Harness::new(
        Grammar::new("T")
            .token("A", Some("a"))
            .token("B", Some("b"))
            .token("C", Some("c"))
            .rule(
                "s",
                vec![
                    alt([token("A"), rule_ref("x"), token("C")]),
                    alt([token("A"), token("B"), token("C")]),
                ],
            )
            .rule("x", vec![alt([token("B")])]),
    )
}

/// The decision in `e` conflicts under SLL but the caller's follow resolves it.
fn context_sensitive() -> Harness {
    Harness::new(
        Grammar::new("T")
            .token("A", Some("a"))
            .token("B", Some("b"))
            .token("C", Some("c"))
            .token("ID", None)
            .rule(
                "s",
                vec![
                    alt([token("A"), rule_ref("e"), token("B")]),
                    alt([token("C"), rule_ref("e")]),
                ],
            )
            .rule(
                "e",
                vec![alt([token("ID"), token("B")]), alt([token("ID")])],
            ),
    )
}

#[test]
fn exact_ambiguity_is_reported() {
    let h = ambiguous();

    let parsed = h.parse_configured("s", "a b c", |b| {
        b.prediction_mode(PredictionMode::LlExactAmbigDetection)
            .listener(DiagnosticErrorListener::new(true))
    });

    assert_eq!(parsed.render_alts(), "(s:1 a (x:1 b) c)");
    insta::assert_debug_snapshot!(parsed.errors, @r#"
    [
        "line 1:0 reportAttemptingFullContext d=0 (s), input='abc'",
        "line 1:0 reportAmbiguity d=0 (s): ambigAlts={1, 2}, input='abc'",
    ]
    "#);
}

#[test]
fn inexact_ambiguity_needs_opt_in() {
    let h = ambiguous();

    let exact_only = h.parse_configured("s", "a b c", |b| {
        b.listener(DiagnosticErrorListener::new(true))
    });
    let all = h.parse_configured("s", "a b c", |b| {
        b.listener(DiagnosticErrorListener::new(false))
    });

    insta::assert_debug_snapshot!(exact_only.errors, @r#"
    [
        "line 1:0 reportAttemptingFullContext d=0 (s), input='abc'",
    ]
    "#);
    insta::assert_debug_snapshot!(all.errors, @r#"
    [
        "line 1:0 reportAttemptingFullContext d=0 (s), input='abc'",
        "line 1:0 reportAmbiguity d=0 (s): ambigAlts={1, 2}, input='abc'",
    ]
    "#);
}

#[test]
fn sll_mode_never_retries_with_full_context() {
    let h = ambiguous();

    let parsed = h.parse_configured("s", "a b c", |b| {
        b.prediction_mode(PredictionMode::Sll)
            .listener(DiagnosticErrorListener::new(false))
    });

    assert_eq!(parsed.render_alts(), "(s:1 a (x:1 b) c)");
    assert!(parsed.errors.is_empty());
}

#[test]
fn context_sensitivity_is_reported() {
    let h = context_sensitive();

    let parsed = h.parse_configured("s", "a x b", |b| {
        b.listener(DiagnosticErrorListener::default())
    });

    assert_eq!(parsed.render_alts(), "(s:1 a (e:2 x) b)");
    insta::assert_debug_snapshot!(parsed.errors, @r#"
    [
        "line 1:2 reportAttemptingFullContext d=1 (e), input='xb'",
        "line 1:2 reportContextSensitivity d=1 (e), input='xb'",
    ]
    "#);
}

#[test]
fn full_context_result_is_not_cached_as_sll() {
    let h = context_sensitive();

    let first = h.parse("s", "a x b");
    let second = h.parse("s", "c x b");

    assert_eq!(first.render_alts(), "(s:1 a (e:2 x) b)");
    assert_eq!(second.render_alts(), "(s:2 c (e:1 x b))");
    assert!(first.errors.is_empty() && second.errors.is_empty());
}

#[test]
fn diagnostics_count_as_syntax_errors() {
    let h = ambiguous();

    let parsed = h.parse_configured("s", "a b c", |b| {
        b.listener(DiagnosticErrorListener::new(false))
    });

    assert_eq!(parsed.syntax_errors, 2);
}

/// Records the alternatives of every ambiguity.
struct AltsOnly(std::rc::Rc<std::cell::RefCell<Vec<String>>>);

impl ErrorListener for AltsOnly {
    fn report_ambiguity(&mut self, report: &mut Report<'_>, exact: bool, alts: Option<&AltSet>) {
        let alts = alts.cloned().unwrap_or_else(|| report.configs.alts());
        self.0.borrow_mut().push(format!(
            "{} {alts} exact={exact} [{}..={}]",
            report.decision_description(),
            report.start_index,
            report.stop_index
        ));
    }
}

#[test]
fn listener_sees_report_details() {
    let h = ambiguous();
    let seen = std::rc::Rc::default();

    h.parse_configured("s", "a b c", |b| b.listener(AltsOnly(std::rc::Rc::clone(&seen))));

    assert_eq!(*seen.borrow(), vec!["0 (s) {1, 2} exact=false [0..=2]"]);
}

#[test]
fn optional_block_without_conflict_is_silent() {
    let h = Harness::new(
        Grammar::new("T")
            .token("A", Some("a"))
            .token("B", Some("b"))
            .rule("s", vec![alt([optional(vec![alt([token("A")])]), token("B")])]),
    );

    let parsed = h.parse_configured("s", "a b", |b| {
        b.listener(DiagnosticErrorListener::new(false))
    });

    assert_eq!(parsed.render(), "(s a b)");
    assert!(parsed.errors.is_empty());
}
