use allstar_core::grammar::{Grammar, alt, optional, plus, rule_ref, star, token};

use super::*;
use crate::atn::AtnBuilder;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::rewrite::rewrite_left_recursion;
use crate::{CompiledGrammar, shot_error};

fn tokens() -> Grammar {
    Grammar::new("T")
        .token("A", None)
        .token("B", None)
        .token("ID", None)
}

fn cycle_names(g: &Grammar) -> Vec<Vec<String>> {
    let mut diagnostics = Diagnostics::new();
    let built = AtnBuilder::new(g, &mut diagnostics).build(&[]);
    LeftRecursionDetector::new(&built.atn)
        .detect()
        .into_iter()
        .map(|cycle| cycle.iter().map(|&r| g.rules[r].name.clone()).collect())
        .collect()
}

#[test]
fn mutual_left_recursion() {
    let g = tokens()
        .rule("a", vec![alt([rule_ref("b"), token("A")])])
        .rule("b", vec![alt([rule_ref("a"), token("B")]), alt([token("ID")])]);

    assert_eq!(cycle_names(&g), vec![vec!["a", "b"]]);
}

#[test]
fn separate_cycles_reported_together() {
    let g = tokens()
        .rule("a", vec![alt([rule_ref("b")])])
        .rule("b", vec![alt([rule_ref("a")])])
        .rule("c", vec![alt([rule_ref("d")])])
        .rule("d", vec![alt([rule_ref("c")])]);

    shot_error!(g, @"error: the following sets of rules are mutually left-recursive [a, b] and [c, d] (hint: indirect left recursion is not rewritten; inline the called rules)");
}

#[test]
fn cycle_through_nullable_prefix() {
    let g = tokens()
        .rule("a", vec![alt([rule_ref("n"), rule_ref("a"), token("A")]), alt([token("B")])])
        .rule("n", vec![alt([optional(vec![alt([token("ID")])])])]);

    assert_eq!(cycle_names(&g), vec![vec!["a"]]);
}

#[test]
fn consuming_prefix_breaks_cycle() {
    let g = tokens()
        .rule("a", vec![alt([token("A"), rule_ref("b")])])
        .rule("b", vec![alt([rule_ref("a")]), alt([token("B")])]);

    assert!(cycle_names(&g).is_empty());
}

#[test]
fn closure_matching_empty() {
    let g = tokens().rule("a", vec![alt([star(vec![alt([token("A")]), alt([])])])]);

    let diagnostics = CompiledGrammar::expect_invalid(g);
    assert_eq!(diagnostics.kinds(), vec![DiagnosticKind::EpsilonClosure]);
    assert!(diagnostics.has(DiagnosticKind::EpsilonClosure, "a"));
}

#[test]
fn plus_of_optional_matches_empty() {
    let g = tokens().rule(
        "a",
        vec![alt([plus(vec![alt([optional(vec![alt([token("B")])])])])])],
    );

    let diagnostics = CompiledGrammar::expect_invalid(g);
    assert!(diagnostics.has(DiagnosticKind::EpsilonClosure, "a"));
}

#[test]
fn left_recursive_follow_matching_empty() {
    let g = tokens().rule(
        "a",
        vec![
            alt([rule_ref("a"), optional(vec![alt([token("ID")])])]),
            alt([token("ID")]),
        ],
    );

    shot_error!(g, @"error: left-recursive rule `a` contains a left-recursive alternative which can be followed by the empty string");
}

#[test]
fn primary_closure_in_left_recursive_rule_is_plain_closure_error() {
    let g = tokens().rule(
        "e",
        vec![
            alt([rule_ref("e"), token("A"), rule_ref("e")]),
            alt([token("ID"), star(vec![alt([token("B")]), alt([])])]),
        ],
    );

    let diagnostics = CompiledGrammar::expect_invalid(g);
    assert_eq!(diagnostics.kinds(), vec![DiagnosticKind::EpsilonClosure]);
    assert!(diagnostics.has(DiagnosticKind::EpsilonClosure, "e"));
}

#[test]
fn optional_with_empty_alternative_warns() {
    let g = tokens().rule(
        "a",
        vec![alt([optional(vec![alt([token("A")]), alt([])]), token("B")])],
    );

    let compiled = CompiledGrammar::expect_valid(g);
    assert_eq!(compiled.diagnostics.warning_count(), 1);
    assert!(
        compiled
            .diagnostics
            .has(DiagnosticKind::EpsilonOptional, "a")
    );
}

#[test]
fn nested_optional_warns_once() {
    let g = tokens().rule(
        "a",
        vec![alt([optional(vec![alt([optional(vec![alt([token("A")])])])])])],
    );

    let compiled = CompiledGrammar::expect_valid(g);
    assert_eq!(compiled.diagnostics.warning_count(), 1);
}

#[test]
fn loops_that_consume_are_clean() {
    let g = tokens().rule(
        "a",
        vec![alt([
            star(vec![alt([token("A")])]),
            plus(vec![alt([token("B")]), alt([token("ID")])]),
        ])],
    );

    let compiled = CompiledGrammar::expect_valid(g);
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn rewritten_rules_pass_checks() {
    let mut g = tokens().rule(
        "e",
        vec![
            alt([rule_ref("e"), token("A"), rule_ref("e")]),
            alt([token("ID")]),
        ],
    );
    let mut diagnostics = Diagnostics::new();
    let undefined = rewrite_left_recursion(&mut g, &mut diagnostics);
    let built = AtnBuilder::new(&g, &mut diagnostics).build(&undefined);
    check_left_recursion_cycles(&built.atn, &mut diagnostics);
    check_epsilon_blocks(&built.atn, &g, &built.blocks, &mut diagnostics);

    assert!(diagnostics.is_empty());
}
