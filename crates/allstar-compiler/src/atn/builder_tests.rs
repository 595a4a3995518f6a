use allstar_core::atn::{LeftRecursiveRuleInfo, StateKind};
use allstar_core::grammar::{
    Grammar, action, alt, not_set, optional, plus, predicate, rule_ref, set, star, token, wildcard,
};

use crate::{CompiledGrammar, Compiler, Error, shot_atn, shot_error};

fn ab() -> Grammar {
    Grammar::new("T").token("A", None).token("B", None)
}

fn sum() -> Grammar {
    Grammar::new("Sum").token("ADD", Some("+")).token("INT", None)
}

fn sum_rule(g: Grammar) -> Grammar {
    g.rule(
        "e",
        vec![
            alt([rule_ref("e"), token("ADD"), rule_ref("e")]),
            alt([token("INT")]),
        ],
    )
}

#[test]
fn sequence() {
    shot_atn!(ab().rule("a", vec![alt([token("A"), token("B")])]), "a", @r"
    RuleStart_a_0->s2
    s2-A->s3
    s3->s4
    s4-B->s5
    s5->RuleStop_a_1
    ");
}

#[test]
fn alternatives() {
    shot_atn!(ab().rule("a", vec![alt([token("A")]), alt([token("B")])]), "a", @r"
    RuleStart_a_0->BlockStart_6
    BlockStart_6->s2
    BlockStart_6->s4
    s2-A->s3
    s4-B->s5
    s3->BlockEnd_7
    s5->BlockEnd_7
    BlockEnd_7->RuleStop_a_1
    ");
}

#[test]
fn star_loop() {
    shot_atn!(ab().rule("a", vec![alt([star(vec![alt([token("A")])])])]), "a", @r"
    RuleStart_a_0->StarLoopEntry_6
    StarLoopEntry_6->StarBlockStart_4
    StarLoopEntry_6->s7
    StarBlockStart_4->s2
    s7->RuleStop_a_1
    s2-A->s3
    s3->BlockEnd_5
    BlockEnd_5->StarLoopBack_8
    StarLoopBack_8->StarLoopEntry_6
    ");
}

#[test]
fn plus_loop_has_two_decisions() {
    let g = ab().rule(
        "a",
        vec![alt([plus(vec![alt([token("A")]), alt([token("B")])])])],
    );
    let compiled = CompiledGrammar::expect_valid(g);

    insta::assert_snapshot!(compiled.expect_dump("a"), @r"
    RuleStart_a_0->PlusBlockStart_6
    PlusBlockStart_6->s2
    PlusBlockStart_6->s4
    s2-A->s3
    s4-B->s5
    s3->BlockEnd_7
    s5->BlockEnd_7
    BlockEnd_7->PlusLoopBack_8
    PlusLoopBack_8->PlusBlockStart_6
    PlusLoopBack_8->s9
    s9->RuleStop_a_1
    ");
    assert_eq!(compiled.atn.decision_to_state, vec![6, 8]);
    assert_eq!(
        compiled.atn.state(6).kind,
        StateKind::BlockStart {
            end: 7,
            block: allstar_core::atn::BlockKind::Plus { loopback: 8 },
            decision: Some(0),
        }
    );
}

#[test]
fn optional_bypass_is_last() {
    let g = ab().rule("a", vec![alt([optional(vec![alt([token("A")])]), token("B")])]);
    let compiled = CompiledGrammar::expect_valid(g);

    let decision = compiled.atn.decision_state(0);
    assert_eq!(decision.number, 4);
    assert_eq!(decision.transitions[0].target, 2);
    assert_eq!(decision.transitions[1].target, 5);
}

#[test]
fn labels_of_every_transition_kind() {
    let g = ab().token("C", None).rule(
        "a",
        vec![alt([
            set(&["A", "B"]),
            not_set(&["A"]),
            wildcard(),
            predicate(0),
            action(1),
        ])],
    );

    shot_atn!(g, "a", @r"
    RuleStart_a_0->s2
    s2-{A, B}->s3
    s3->s4
    s4-~A->s5
    s5->s6
    s6-.->s7
    s7->s8
    s8-pred_0:0->s9
    s9->s10
    s10-action_0:1->s11
    s11->RuleStop_a_1
    ");
}

#[test]
fn rule_call_and_follow_link() {
    let g = ab()
        .rule("a", vec![alt([rule_ref("b")])])
        .rule("b", vec![alt([token("A")])]);
    let compiled = CompiledGrammar::expect_valid(g);

    insta::assert_snapshot!(compiled.expect_dump("a"), @r"
    RuleStart_a_0->s4
    s4-b->RuleStart_b_2
    s5->RuleStop_a_1
    ");
    insta::assert_snapshot!(compiled.expect_dump("b"), @r"
    RuleStart_b_2->s6
    s6-A->s7
    s7->RuleStop_b_3
    RuleStop_b_3->s5
    ");
}

#[test]
fn left_recursive_rule() {
    shot_atn!(sum_rule(sum()), "e", @r"
    RuleStart_e_0->s2
    s2-INT->s3
    s3->StarLoopEntry_12
    StarLoopEntry_12->StarBlockStart_10
    StarLoopEntry_12->s13
    StarBlockStart_10->s4
    s13->RuleStop_e_1
    s4-1 >= _p->s5
    RuleStop_e_1->s9
    s5->s6
    s6-'+'->s7
    s7->s8
    s8-e->RuleStart_e_0
    s9->BlockEnd_11
    BlockEnd_11->StarLoopBack_14
    StarLoopBack_14->StarLoopEntry_12
    ");
}

#[test]
fn left_recursive_metadata() {
    let g = sum_rule(sum().rule("s", vec![alt([rule_ref("e")])]));
    let compiled = CompiledGrammar::expect_valid(g);
    let atn = &compiled.atn;

    // s: 0/1, e: 2/3; the loop entry of e is the only decision.
    assert!(atn.is_left_recursive(1));
    assert!(!atn.is_left_recursive(0));
    assert_eq!(atn.num_decisions(), 1);
    assert!(atn.decision_state(0).is_precedence_decision());
    assert_eq!(
        atn.left_recursive_rules[1],
        Some(LeftRecursiveRuleInfo {
            primary_alts: vec![2],
            op_alts: vec![1],
        })
    );

    let returns = &atn.state(3).transitions;
    assert_eq!(returns.len(), 2);
    assert_eq!(returns[0].target, 5);
    assert_eq!(returns[0].outermost_precedence_return(), Some(1));
    assert_eq!(returns[1].outermost_precedence_return(), None);
}

#[test]
fn decisions_numbered_inner_first() {
    let g = Grammar::new("T")
        .token("DOT", Some("."))
        .token("ID", None)
        .token("SELF", Some("self"))
        .rule(
            "e",
            vec![alt([
                rule_ref("p"),
                star(vec![alt([token("DOT"), token("ID")])]),
            ])],
        )
        .rule(
            "p",
            vec![
                alt([token("SELF")]),
                alt([token("SELF"), token("DOT"), token("ID")]),
            ],
        );
    let compiled = CompiledGrammar::expect_valid(g);
    let atn = &compiled.atn;

    assert_eq!(atn.num_decisions(), 2);
    assert_eq!(atn.decision_state(0).kind_name(), "STAR_LOOP_ENTRY");
    assert_eq!(atn.decision_state(0).rule_index, 0);
    assert_eq!(atn.decision_state(1).kind_name(), "BLOCK_START");
    assert_eq!(atn.decision_state(1).rule_index, 1);
}

#[test]
fn undefined_references() {
    let g = ab().rule("a", vec![alt([rule_ref("b"), token("X")])]);

    shot_error!(g, @r"
    error: rule `b` is not defined
    error: token `X` is not defined
    ");
}

#[test]
fn duplicate_rule() {
    let g = ab()
        .rule("a", vec![alt([token("A")])])
        .rule("a", vec![alt([token("B")])]);

    shot_error!(g, @"error: rule `a` is already defined");
}

#[test]
fn compile_from_json() {
    let json = r#"{
        "name": "T",
        "tokens": { "A": "a" },
        "rules": { "s": { "type": "TOKEN", "name": "A" } }
    }"#;
    let compiled = Compiler::builder().build().compile_json(json).unwrap();

    insta::assert_snapshot!(compiled.expect_dump("s"), @r"
    RuleStart_s_0->s2
    s2-'a'->s3
    s3->RuleStop_s_1
    ");
}

#[test]
fn compile_json_reports_load_errors() {
    let err = Compiler::builder().build().compile_json("{").unwrap_err();
    assert!(matches!(err, Error::Load(_)));
}
