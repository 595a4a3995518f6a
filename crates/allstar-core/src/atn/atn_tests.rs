use std::sync::Arc;

use super::*;
use crate::interval_set::IntervalSet;
use crate::token::{EOF, EPSILON};

const A: TokenType = 1;
const B: TokenType = 2;
const C: TokenType = 3;
const D: TokenType = 4;

/// Hand-built network for:
///
/// ```text
/// s : A (B | C) ;
/// t : s D ;
/// ```
fn sample_atn() -> Atn {
    let mut atn = Atn::new(vec!["s".into(), "t".into()], D);

    let s_start = atn.add_state(0, StateKind::Basic);
    let s_stop = atn.add_state(0, StateKind::RuleStop);
    atn.state_mut(s_start).kind = StateKind::RuleStart {
        stop: s_stop,
        left_recursive: false,
    };
    let before_a = atn.add_state(0, StateKind::Basic);
    let block_start = atn.add_state(0, StateKind::Basic);
    let alt_b = atn.add_state(0, StateKind::Basic);
    let alt_c = atn.add_state(0, StateKind::Basic);
    let block_end = atn.add_state(0, StateKind::BlockEnd { start: block_start });
    atn.state_mut(block_start).kind = StateKind::BlockStart {
        end: block_end,
        block: BlockKind::Basic,
        decision: None,
    };

    atn.add_transition(s_start, Transition::epsilon(before_a));
    atn.add_transition(before_a, Transition::new(block_start, TransitionKind::Atom(A)));
    atn.add_transition(block_start, Transition::epsilon(alt_b));
    atn.add_transition(block_start, Transition::epsilon(alt_c));
    atn.add_transition(alt_b, Transition::new(block_end, TransitionKind::Atom(B)));
    atn.add_transition(alt_c, Transition::new(block_end, TransitionKind::Atom(C)));
    atn.add_transition(block_end, Transition::epsilon(s_stop));
    atn.define_decision(block_start);

    let t_start = atn.add_state(1, StateKind::Basic);
    let t_stop = atn.add_state(1, StateKind::RuleStop);
    atn.state_mut(t_start).kind = StateKind::RuleStart {
        stop: t_stop,
        left_recursive: false,
    };
    let call = atn.add_state(1, StateKind::Basic);
    let follow = atn.add_state(1, StateKind::Basic);
    let after_d = atn.add_state(1, StateKind::Basic);
    atn.add_transition(t_start, Transition::epsilon(call));
    atn.add_transition(
        call,
        Transition::new(
            s_start,
            TransitionKind::Rule {
                follow,
                rule_index: 0,
                precedence: 0,
            },
        ),
    );
    atn.add_transition(follow, Transition::new(after_d, TransitionKind::Atom(D)));
    atn.add_transition(after_d, Transition::epsilon(t_stop));

    atn.rule_to_start = vec![s_start, t_start];
    atn.rule_to_stop = vec![s_stop, t_stop];
    atn
}

// State numbers in `sample_atn`.
const BLOCK_START: StateId = 3;
const BLOCK_END: StateId = 6;
const CALL: StateId = 9;
const FOLLOW: StateId = 10;

#[test]
fn decision_numbering() {
    let atn = sample_atn();

    assert_eq!(atn.num_decisions(), 1);
    assert_eq!(atn.decision_state(0).number, BLOCK_START);
    assert_eq!(atn.state(BLOCK_START).decision(), Some(0));
    assert_eq!(atn.state(BLOCK_START).kind_name(), "BLOCK_START");
    assert!(atn.state(BLOCK_START).is_decision_state());
}

#[test]
fn next_tokens_within_rule() {
    let atn = sample_atn();

    assert_eq!(atn.next_tokens(BLOCK_START), &IntervalSet::of_range(B, C));
    assert_eq!(atn.next_tokens(CALL), &IntervalSet::of(A));

    let at_end = atn.next_tokens(BLOCK_END);
    assert!(at_end.contains(EPSILON));
    assert_eq!(at_end.len(), 1);
}

#[test]
fn expected_tokens_follow_invocations() {
    let atn = sample_atn();

    assert_eq!(atn.expected_tokens(BLOCK_END, [CALL]), IntervalSet::of(D));
    assert_eq!(atn.expected_tokens(BLOCK_END, []), IntervalSet::of(EOF));
    assert_eq!(
        atn.expected_tokens(BLOCK_START, [CALL]),
        IntervalSet::of_range(B, C)
    );
}

#[test]
fn next_tokens_in_context_pops_return_state() {
    let atn = sample_atn();
    let ctx = PredictionContext::from_invocation_chain(&atn, [CALL]);

    assert_eq!(ctx.to_string(), "[10 $]");
    assert_eq!(ctx.return_state(), Some(FOLLOW));
    assert_eq!(atn.next_tokens_in_context(BLOCK_END, &ctx), IntervalSet::of(D));

    let empty = PredictionContext::empty();
    assert_eq!(
        atn.next_tokens_in_context(BLOCK_END, &empty),
        IntervalSet::of(EOF)
    );
}

#[test]
fn decision_lookahead_per_alternative() {
    let atn = sample_atn();
    let look = Ll1Analyzer::new(&atn).decision_lookahead(BLOCK_START);

    assert_eq!(
        look,
        vec![Some(IntervalSet::of(B)), Some(IntervalSet::of(C))]
    );
}

#[test]
fn context_equality_is_structural() {
    let a = PredictionContext::singleton(PredictionContext::empty(), 5);
    let b = PredictionContext::singleton(PredictionContext::empty(), 5);
    let c = PredictionContext::singleton(Arc::clone(&a), 7);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(c.depth(), 2);
    assert_eq!(c.to_string(), "[7 5 $]");
    assert!(PredictionContext::empty().has_empty_path());
}
