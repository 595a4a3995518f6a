use allstar_core::grammar::{
    AltKind, Grammar, Rule, alt, labeled, rule_call, rule_ref, token,
};

use super::*;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

fn arithmetic() -> Grammar {
    Grammar::new("Expr")
        .token("MUL", Some("*"))
        .token("ADD", Some("+"))
        .token("SUB", Some("-"))
        .token("INT", None)
}

fn rewrite(mut g: Grammar) -> (Grammar, Vec<usize>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let failed = rewrite_left_recursion(&mut g, &mut diagnostics);
    (g, failed, diagnostics)
}

fn rule<'g>(g: &'g Grammar, name: &str) -> &'g Rule {
    g.find_rule(name).unwrap()
}

#[test]
fn binary_prefix_and_primary() {
    let g = arithmetic().rule(
        "e",
        vec![
            alt([rule_ref("e"), token("MUL"), rule_ref("e")]),
            alt([rule_ref("e"), token("ADD"), rule_ref("e")]),
            alt([token("SUB"), rule_ref("e")]),
            alt([token("INT")]),
        ],
    );

    let (g, failed, diagnostics) = rewrite(g);

    assert!(failed.is_empty());
    assert!(diagnostics.is_empty());
    insta::assert_snapshot!(
        g.to_string(),
        @"e : ( SUB e[1] | INT ) ( {precpred 3}? MUL e[4] | {precpred 2}? ADD e[3] )* ;"
    );

    let info = rule(&g, "e").left_recursive.as_ref().unwrap();
    let kinds: Vec<_> = info.alts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![AltKind::Binary, AltKind::Binary, AltKind::Prefix, AltKind::Primary]
    );
    assert_eq!(info.original_alternatives.len(), 4);
    assert_eq!(info.primary_alts(), vec![3, 4]);
    assert_eq!(info.op_alts(), vec![1, 2]);
}

#[test]
fn right_associative_keeps_precedence() {
    let g = Grammar::new("Pow")
        .token("POW", Some("^"))
        .token("INT", None)
        .rule(
            "e",
            vec![
                alt([rule_ref("e"), token("POW"), rule_ref("e")]).right_assoc(),
                alt([token("INT")]),
            ],
        );

    let (g, _, _) = rewrite(g);

    insta::assert_snapshot!(
        g.to_string(),
        @"e : ( INT ) ( <assoc=right> {precpred 1}? POW e[1] )* ;"
    );
}

#[test]
fn ternary_and_suffix() {
    let g = Grammar::new("T")
        .token("Q", Some("?"))
        .token("COLON", Some(":"))
        .token("INC", Some("++"))
        .token("ID", None)
        .rule(
            "e",
            vec![
                alt([
                    rule_ref("e"),
                    token("Q"),
                    rule_ref("e"),
                    token("COLON"),
                    rule_ref("e"),
                ]),
                alt([rule_ref("e"), token("INC")]),
                alt([token("ID")]),
            ],
        );

    let (g, _, _) = rewrite(g);

    insta::assert_snapshot!(
        g.to_string(),
        @"e : ( ID ) ( {precpred 2}? Q e[0] COLON e[3] | {precpred 1}? INC )* ;"
    );
    let info = rule(&g, "e").left_recursive.as_ref().unwrap();
    assert_eq!(info.alts[0].kind, AltKind::Ternary);
    assert_eq!(info.alts[1].kind, AltKind::Suffix);
    assert_eq!(info.alts[1].next_precedence, None);
}

#[test]
fn leading_label_dropped_other_labels_kept() {
    let g = arithmetic().rule(
        "e",
        vec![
            alt([
                labeled("l", rule_ref("e")),
                token("ADD"),
                labeled("r", rule_ref("e")),
            ])
            .labeled("Add"),
            alt([token("INT")]).labeled("Int"),
        ],
    );

    let (g, failed, _) = rewrite(g);

    assert!(failed.is_empty());
    insta::assert_snapshot!(
        g.to_string(),
        @"e : ( INT # Int ) ( {precpred 1}? ADD r=e[2] # Add )* ;"
    );
}

#[test]
fn interleaved_alternatives_map_back() {
    let g = arithmetic().token("ID", None).rule(
        "e",
        vec![
            alt([rule_ref("e"), token("MUL"), rule_ref("e")]),
            alt([token("INT")]),
            alt([rule_ref("e"), token("ADD"), rule_ref("e")]),
            alt([token("ID")]),
        ],
    );

    let (g, _, _) = rewrite(g);

    let info = rule(&g, "e").left_recursive.as_ref().unwrap();
    assert_eq!(info.primary_alts(), vec![2, 4]);
    assert_eq!(info.op_alts(), vec![1, 3]);
}

#[test]
fn calls_from_other_rules_get_precedence_zero() {
    let g = arithmetic()
        .rule("s", vec![alt([rule_ref("e"), optional_e()])])
        .rule(
            "e",
            vec![
                alt([rule_ref("e"), token("ADD"), rule_ref("e")]),
                alt([token("INT")]),
            ],
        );

    let (g, _, _) = rewrite(g);

    insta::assert_snapshot!(g.to_string(), @r"
    s : e[0] ( e[0] )? ;
    e : ( INT ) ( {precpred 1}? ADD e[2] )* ;
    ");
}

fn optional_e() -> allstar_core::grammar::Element {
    allstar_core::grammar::optional(vec![alt([rule_ref("e")])])
}

#[test]
fn rewrite_is_idempotent() {
    let g = arithmetic().rule(
        "e",
        vec![
            alt([rule_ref("e"), token("ADD"), rule_ref("e")]),
            alt([token("INT")]),
        ],
    );

    let (once, _, _) = rewrite(g);
    let rewritten = analyze_rule(rule(&once, "e"));
    assert!(!rewritten.is_left_recursive());
    assert!(!rewritten.has_immediate_refs);

    let (twice, failed, diagnostics) = rewrite(once.clone());

    assert!(failed.is_empty());
    assert!(diagnostics.is_empty());
    assert_eq!(once, twice);
}

#[test]
fn no_primary_alternative() {
    let g = Grammar::new("T")
        .token("ID", None)
        .rule("a", vec![alt([rule_ref("a"), token("ID")])]);

    let (g, failed, diagnostics) = rewrite(g);

    assert_eq!(failed, vec![0]);
    assert!(diagnostics.has(DiagnosticKind::NoNonLeftRecursiveAlts, "a"));
    assert!(rule(&g, "a").left_recursive.is_none());
}

#[test]
fn bare_self_reference_is_nonconforming() {
    let g = Grammar::new("T")
        .token("B", None)
        .rule("a", vec![alt([rule_ref("a")]), alt([rule_ref("b")])])
        .rule("b", vec![alt([token("B")])]);

    let analysis = analyze_rule(&g.rules[0]);
    assert_eq!(analysis.kinds, vec![AltKind::Primary, AltKind::Primary]);
    assert!(analysis.is_nonconforming());

    let (_, failed, diagnostics) = rewrite(g);
    assert_eq!(failed, vec![0]);
    assert_eq!(
        diagnostics.kinds(),
        vec![DiagnosticKind::NonconformingLeftRecursion]
    );
}

#[test]
fn leading_call_with_arguments_is_nonconforming() {
    let g = arithmetic().rule(
        "e",
        vec![
            alt([rule_call("e", "1"), token("ADD"), rule_ref("e")]),
            alt([token("INT")]),
        ],
    );

    let (_, failed, diagnostics) = rewrite(g);

    assert_eq!(failed, vec![0]);
    assert!(diagnostics.has(DiagnosticKind::NonconformingLeftRecursion, "e"));
}

#[test]
fn call_with_arguments_to_other_rule_is_primary() {
    let g = arithmetic()
        .rule(
            "val",
            vec![
                alt([rule_call("dval", "1")]),
                alt([rule_ref("val"), token("MUL"), rule_ref("val")]),
            ],
        )
        .rule("dval", vec![alt([token("INT")])]);

    let (g, failed, diagnostics) = rewrite(g);

    assert!(failed.is_empty());
    assert!(diagnostics.is_empty());
    assert!(rule(&g, "val").left_recursive.is_some());
}

#[test]
fn prefix_alone_is_not_left_recursive() {
    let g = arithmetic().rule(
        "e",
        vec![alt([token("SUB"), rule_ref("e")]), alt([token("INT")])],
    );

    let (g, failed, _) = rewrite(g);

    assert!(failed.is_empty());
    assert!(rule(&g, "e").left_recursive.is_none());
    insta::assert_snapshot!(g.to_string(), @"e : SUB e | INT ;");
}
