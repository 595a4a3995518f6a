use std::sync::Arc;

use allstar_core::atn::PredictionContext;
use allstar_core::grammar::{Grammar, alt, token};

use super::mode::*;
use super::*;
use crate::test_utils::Harness;
use crate::tree::{ContextId, ParseTree};

fn pred(pred_index: usize) -> SemanticContext {
    SemanticContext::Predicate {
        rule_index: 0,
        pred_index,
        ctx_dependent: false,
    }
}

/// Accepts the listed predicates and precedences up to `precedence`.
struct Fixed {
    accepted: Vec<usize>,
    precedence: i32,
}

impl PredicateEvaluator for Fixed {
    fn sempred(&mut self, _ctx: Option<ContextId>, _rule_index: usize, pred_index: usize) -> bool {
        self.accepted.contains(&pred_index)
    }

    fn precpred(&mut self, precedence: i32) -> bool {
        precedence >= self.precedence
    }
}

fn alts(items: &[usize]) -> AltSet {
    items.iter().copied().collect()
}

#[test]
fn and_or_with_none() {
    let p = pred(0);

    assert_eq!(SemanticContext::and(&SemanticContext::None, &p), p);
    assert_eq!(SemanticContext::and(&p, &SemanticContext::None), p);
    assert_eq!(SemanticContext::or(&p, &SemanticContext::None), SemanticContext::None);
    assert_eq!(SemanticContext::and(&p, &p), p);
}

#[test]
fn junctions_flatten_and_render() {
    let and = SemanticContext::and(&SemanticContext::and(&pred(0), &pred(1)), &pred(2));
    let or = SemanticContext::or(&pred(0), &SemanticContext::or(&pred(1), &pred(0)));

    assert_eq!(and.to_string(), "{0:0}?&&{0:1}?&&{0:2}?");
    assert_eq!(or.to_string(), "{0:0}?||{0:1}?");
}

#[test]
fn precedence_predicates_collapse() {
    let and = SemanticContext::and(
        &SemanticContext::Precedence(3),
        &SemanticContext::Precedence(1),
    );
    let or = SemanticContext::or(
        &SemanticContext::Precedence(3),
        &SemanticContext::Precedence(1),
    );

    assert_eq!(and, SemanticContext::Precedence(1));
    assert_eq!(or, SemanticContext::Precedence(3));
    assert_eq!(or.to_string(), "{3>=prec}?");
}

#[test]
fn eval_walks_junctions() {
    let mut evaluator = Fixed {
        accepted: vec![1],
        precedence: 2,
    };
    let outer = ParseTree::new(vec!["s".to_string()].into()).create(0, None, None);

    assert!(SemanticContext::None.eval(&mut evaluator, outer));
    assert!(!pred(0).eval(&mut evaluator, outer));
    assert!(SemanticContext::or(&pred(0), &pred(1)).eval(&mut evaluator, outer));
    assert!(!SemanticContext::and(&pred(0), &pred(1)).eval(&mut evaluator, outer));
    assert!(SemanticContext::Precedence(2).eval(&mut evaluator, outer));
    assert!(!SemanticContext::Precedence(1).eval(&mut evaluator, outer));
}

#[test]
fn eval_precedence_resolves_only_precedence() {
    let mut evaluator = Fixed {
        accepted: vec![],
        precedence: 2,
    };
    let guarded = SemanticContext::and(&SemanticContext::Precedence(3), &pred(0));
    let blocked = SemanticContext::and(&SemanticContext::Precedence(1), &pred(0));
    let either = SemanticContext::or(&SemanticContext::Precedence(5), &pred(0));

    assert_eq!(guarded.eval_precedence(&mut evaluator), Some(pred(0)));
    assert_eq!(blocked.eval_precedence(&mut evaluator), None);
    assert_eq!(
        either.eval_precedence(&mut evaluator),
        Some(SemanticContext::None)
    );
    assert_eq!(pred(4).eval_precedence(&mut evaluator), Some(pred(4)));
}

#[test]
fn alt_set_order_and_display() {
    let mut set = alts(&[3, 1]);
    set.insert(2);
    set.insert(1);

    assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(set.min(), Some(1));
    assert_eq!(set.to_string(), "{1, 2, 3}");
    assert_eq!(AltSet::new().to_string(), "{}");
    assert!(AltSet::of(4).contains(4));
}

#[test]
fn config_set_merges_equal_configs() {
    let mut set = AtnConfigSet::new(false);
    let empty = PredictionContext::empty();
    let mut dipped = AtnConfig::new(5, 1, Arc::clone(&empty));
    dipped.reaches_into_outer_context = 2;

    assert!(set.add(AtnConfig::new(5, 1, Arc::clone(&empty))));
    assert!(!set.add(dipped));
    assert!(set.add(AtnConfig::new(5, 2, Arc::clone(&empty))));
    assert!(set.add(AtnConfig::new(5, 1, empty).with_semantic(5, pred(0))));

    assert_eq!(set.len(), 3);
    assert_eq!(set.iter().next().map(|c| c.reaches_into_outer_context), Some(2));
    assert!(set.dips_into_outer_context);
    assert!(set.has_semantic_context);
    assert_eq!(set.alts(), alts(&[1, 2]));
}

#[test]
fn conflict_subsets_group_by_state_and_stack() {
    let empty = PredictionContext::empty();
    let called = PredictionContext::singleton(Arc::clone(&empty), 9);
    let mut set = AtnConfigSet::new(false);
    set.add(AtnConfig::new(5, 1, Arc::clone(&empty)));
    set.add(AtnConfig::new(5, 2, Arc::clone(&empty)));
    set.add(AtnConfig::new(5, 3, called));
    set.add(AtnConfig::new(6, 3, empty));

    let subsets = conflicting_alt_subsets(&set);

    assert_eq!(subsets, vec![alts(&[1, 2]), alts(&[3]), alts(&[3])]);
    assert!(has_conflicting_alt_set(&subsets));
    assert!(has_non_conflicting_alt_set(&subsets));
    assert!(!all_subsets_conflict(&subsets));
    assert!(!all_subsets_equal(&subsets));
    assert_eq!(union_of(&subsets), alts(&[1, 2, 3]));
    assert_eq!(unique_alt(&subsets), None);
    assert_eq!(single_viable_alt(&subsets), None);
    assert!(has_state_associated_with_one_alt(&set));
    assert_eq!(unique_config_alt(&set), None);
}

#[test]
fn viable_alt_agrees_on_minimums() {
    let subsets = vec![alts(&[1, 2]), alts(&[1, 3])];

    assert_eq!(single_viable_alt(&subsets), Some(1));
    assert_eq!(resolves_to_just_one_viable_alt(&subsets), Some(1));
    assert!(all_subsets_conflict(&subsets));
    assert!(!all_subsets_equal(&subsets));
    assert!(all_subsets_equal(&[alts(&[2, 4]), alts(&[2, 4])]));
    assert_eq!(unique_alt(&[alts(&[2]), alts(&[2])]), Some(2));
}

#[test]
fn sll_conflict_terminates_in_rule_stop_states() {
    let h = Harness::new(
        Grammar::new("T")
            .token("A", Some("a"))
            .rule("s", vec![alt([token("A")]), alt([token("A")])]),
    );
    let atn = &h.grammar.atn;
    let stop = atn.rule_to_stop[0];
    let empty = PredictionContext::empty();

    let mut at_stop = AtnConfigSet::new(false);
    at_stop.add(AtnConfig::new(stop, 1, Arc::clone(&empty)));
    at_stop.add(AtnConfig::new(stop, 2, Arc::clone(&empty)));
    assert!(all_configs_in_rule_stop_states(atn, &at_stop));
    assert!(has_sll_conflict_terminating_prediction(
        PredictionMode::Ll,
        atn,
        &at_stop
    ));

    // A state reached by a single alternative keeps prediction going.
    let mut mixed = at_stop.clone();
    mixed.add(AtnConfig::new(atn.rule_to_start[0], 1, empty));
    assert!(has_config_in_rule_stop_state(atn, &mixed));
    assert!(!all_configs_in_rule_stop_states(atn, &mixed));
    assert!(!has_sll_conflict_terminating_prediction(
        PredictionMode::Ll,
        atn,
        &mixed
    ));
}

#[test]
fn sll_ignores_predicates_when_checking_conflicts() {
    let h = Harness::new(
        Grammar::new("T")
            .token("A", Some("a"))
            .rule("s", vec![alt([token("A")]), alt([token("A")])]),
    );
    let atn = &h.grammar.atn;
    let empty = PredictionContext::empty();
    let state = atn.rule_to_start[0];
    let mut set = AtnConfigSet::new(false);
    set.add(AtnConfig::new(state, 1, Arc::clone(&empty)).with_semantic(state, pred(0)));
    set.add(AtnConfig::new(state, 2, Arc::clone(&empty)));
    set.add(AtnConfig::new(state, 1, empty));

    assert!(has_sll_conflict_terminating_prediction(
        PredictionMode::Sll,
        atn,
        &set
    ));
}
