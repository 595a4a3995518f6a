use allstar_core::grammar::{Grammar, alt, rule_ref, token};

use crate::test_utils::Harness;

fn tokens() -> Grammar {
    Grammar::new("T")
        .token("A", Some("a"))
        .token("B", Some("b"))
        .token("C", Some("c"))
        .token("D", Some("d"))
}

#[test]
fn missing_token_is_conjured() {
    let h = Harness::new(tokens().rule("s", vec![alt([token("A"), token("B")])]));

    let parsed = h.parse("s", "a");

    insta::assert_snapshot!(parsed.render(), @"(s a <missing 'b'>)");
    insta::assert_debug_snapshot!(parsed.errors, @r#"
    [
        "line 1:1 missing 'b' at '<EOF>'",
    ]
    "#);
    assert_eq!(parsed.syntax_errors, 1);
}

#[test]
fn extraneous_token_is_skipped() {
    let h = Harness::new(tokens().rule("s", vec![alt([token("A"), token("B")])]));

    let parsed = h.parse("s", "a c b");

    insta::assert_snapshot!(parsed.render(), @"(s a c b)");
    insta::assert_debug_snapshot!(parsed.errors, @r#"
    [
        "line 1:2 extraneous input 'c' expecting 'b'",
    ]
    "#);
}

#[test]
fn no_viable_alternative() {
    let h = Harness::new(tokens().rule(
        "s",
        vec![
            alt([token("A"), token("B")]),
            alt([token("A"), token("C")]),
        ],
    ));

    let parsed = h.parse("s", "a d");

    insta::assert_snapshot!(parsed.render(), @"(s a d)");
    insta::assert_debug_snapshot!(parsed.errors, @r#"
    [
        "line 1:2 no viable alternative at input 'ad'",
    ]
    "#);
}

#[test]
fn recovery_without_progress_adds_error_node() {
    let h = Harness::new(
        tokens()
            .rule("s", vec![alt([rule_ref("x"), token("C")])])
            .rule("x", vec![alt([token("A"), token("B"), token("D")])]),
    );

    let parsed = h.parse("s", "a c");

    insta::assert_snapshot!(parsed.render(), @"(s (x a c) c)");
    insta::assert_debug_snapshot!(parsed.errors, @r#"
    [
        "line 1:2 mismatched input 'c' expecting 'b'",
    ]
    "#);
    assert_eq!(parsed.syntax_errors, 1);
}

#[test]
fn valid_input_after_error_parses_normally() {
    let h = Harness::new(tokens().rule("s", vec![alt([token("A"), token("B")])]));

    let broken = h.parse("s", "a");
    let fine = h.parse("s", "a b");

    assert_eq!(broken.syntax_errors, 1);
    assert_eq!(fine.render(), "(s a b)");
    assert!(fine.errors.is_empty());
}
