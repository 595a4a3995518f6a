//! Breadth-first dump of one rule's ATN.

use std::collections::{HashSet, VecDeque};
use std::fmt::Write;

use allstar_core::Vocabulary;
use allstar_core::atn::{Atn, AtnState, BlockKind, StateKind, TransitionKind};

pub struct AtnPrinter<'a> {
    atn: &'a Atn,
    vocabulary: &'a Vocabulary,
}

impl<'a> AtnPrinter<'a> {
    pub fn new(atn: &'a Atn, vocabulary: &'a Vocabulary) -> Self {
        Self { atn, vocabulary }
    }

    /// One line per transition reachable from the rule's start state.
    /// Rule calls continue at their follow state; edges out of rule stop
    /// states are listed but not followed.
    pub fn dump_rule(&self, rule_index: usize) -> String {
        let mut out = String::new();
        let mut marked = HashSet::new();
        let mut work = VecDeque::from([self.atn.rule_to_start[rule_index]]);

        while let Some(s) = work.pop_front() {
            if !marked.insert(s) {
                continue;
            }
            let state = self.atn.state(s);
            for t in &state.transitions {
                if !state.is_rule_stop() {
                    match t.kind {
                        TransitionKind::Rule { follow, .. } => work.push_back(follow),
                        _ => work.push_back(t.target),
                    }
                }
                let label = match &t.kind {
                    TransitionKind::Epsilon { .. } => String::new(),
                    TransitionKind::Rule { rule_index, .. } => {
                        self.atn.rule_names[*rule_index].clone()
                    }
                    TransitionKind::Atom(t) => self.vocabulary.display_name(*t),
                    TransitionKind::Range(a, b) => format!(
                        "{}..{}",
                        self.vocabulary.display_name(*a),
                        self.vocabulary.display_name(*b)
                    ),
                    TransitionKind::Set(set) => set.to_string_with(self.vocabulary),
                    TransitionKind::NotSet(set) => format!("~{}", set.to_string_with(self.vocabulary)),
                    TransitionKind::Wildcard => ".".to_string(),
                    TransitionKind::Action {
                        rule_index,
                        action_index,
                    } => format!("action_{rule_index}:{action_index}"),
                    TransitionKind::Predicate {
                        rule_index,
                        pred_index,
                        ..
                    } => format!("pred_{rule_index}:{pred_index}"),
                    TransitionKind::Precedence { precedence } => format!("{precedence} >= _p"),
                };
                let from = self.state_name(state);
                let to = self.state_name(self.atn.state(t.target));
                if label.is_empty() {
                    let _ = writeln!(out, "{from}->{to}");
                } else {
                    let _ = writeln!(out, "{from}-{label}->{to}");
                }
            }
        }
        out
    }

    fn state_name(&self, s: &AtnState) -> String {
        let n = s.number;
        match s.kind {
            StateKind::BlockStart {
                block: BlockKind::Star,
                ..
            } => format!("StarBlockStart_{n}"),
            StateKind::BlockStart {
                block: BlockKind::Plus { .. },
                ..
            } => format!("PlusBlockStart_{n}"),
            StateKind::BlockStart { .. } => format!("BlockStart_{n}"),
            StateKind::BlockEnd { .. } => format!("BlockEnd_{n}"),
            StateKind::RuleStart { .. } => {
                format!("RuleStart_{}_{n}", self.atn.rule_names[s.rule_index])
            }
            StateKind::RuleStop => format!("RuleStop_{}_{n}", self.atn.rule_names[s.rule_index]),
            StateKind::PlusLoopback { .. } => format!("PlusLoopBack_{n}"),
            StateKind::StarLoopback => format!("StarLoopBack_{n}"),
            StateKind::StarLoopEntry { .. } => format!("StarLoopEntry_{n}"),
            StateKind::Basic | StateKind::LoopEnd { .. } => format!("s{n}"),
        }
    }
}
