use allstar_core::grammar::{Grammar, alt, rule_ref, token};

use crate::ambiguity::all_possible_parse_trees;
use crate::error::ParseError;
use crate::prediction::AltSet;
use crate::test_utils::Harness;

fn nested() -> Harness {
    Harness::new(
        Grammar::new("T")
            .token("A", Some("a"))
            .token("B", Some("b"))
            .token("C", Some("c"))
            .rule("s", vec![alt([rule_ref("x")])])
            .rule("x", vec![alt([rule_ref("y")])])
            .rule(
                "y",
                vec![
                    alt([token("A"), rule_ref("z"), token("C")]),
                    alt([token("A"), token("B"), token("C")]),
                ],
            )
            .rule("z", vec![alt([token("B")])]),
    )
}

fn both() -> AltSet {
    [1, 2].into_iter().collect()
}

#[test]
fn one_tree_per_alternative() {
    let h = nested();
    let mut tokens = h.tokens("a b c");

    let trees = all_possible_parse_trees(
        &h.grammar.atn,
        &h.grammar.vocabulary,
        &mut tokens,
        0,
        &both(),
        0,
        2,
        h.rule("s"),
    )
    .unwrap();

    let rendered: Vec<String> = trees
        .iter()
        .map(|t| format!("{}: {}", t.alt, t.to_string_tree()))
        .collect();
    insta::assert_debug_snapshot!(rendered, @r#"
    [
        "1: (y:1 a (z:1 b) c)",
        "2: (y:2 a b c)",
    ]
    "#);
}

#[test]
fn stop_index_past_input_is_clamped() {
    let h = nested();
    let mut tokens = h.tokens("a b c");

    let trees = all_possible_parse_trees(
        &h.grammar.atn,
        &h.grammar.vocabulary,
        &mut tokens,
        0,
        &both(),
        0,
        10,
        h.rule("s"),
    )
    .unwrap();

    assert_eq!(trees.len(), 2);
    assert_eq!(trees[1].to_string_tree(), "(y:2 a b c)");
}

#[test]
fn syntax_error_stops_reparsing() {
    let h = nested();
    let mut tokens = h.tokens("a b");

    let result = all_possible_parse_trees(
        &h.grammar.atn,
        &h.grammar.vocabulary,
        &mut tokens,
        0,
        &both(),
        0,
        1,
        h.rule("s"),
    );

    assert!(matches!(result, Err(ParseError::Cancelled(_))));
}
