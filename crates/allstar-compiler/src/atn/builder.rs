//! Grammar to ATN construction.
//!
//! Every rule gets a start and a stop state up front, so rule references can
//! be wired before the callee is built. Blocks become decision states;
//! decisions are numbered as their states are created, which puts nested
//! blocks before the block or loop enclosing them.

use std::collections::HashMap;

use allstar_core::atn::{
    Atn, BlockKind, LeftRecursiveRuleInfo, StateId, StateKind, Transition, TransitionKind,
};
use allstar_core::grammar::{Alternative, Element, Grammar, Quantifier};
use allstar_core::{IntervalSet, TokenType};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// A `*`, `+` or `?` block whose alternatives must not match the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EbnfBlock {
    pub rule_index: usize,
    pub start: StateId,
    pub end: StateId,
    pub optional: bool,
}

#[derive(Debug)]
pub struct BuiltAtn {
    pub atn: Atn,
    pub blocks: Vec<EbnfBlock>,
}

/// Entry and exit state of a built fragment.
#[derive(Debug, Clone, Copy)]
struct Handle {
    left: StateId,
    right: StateId,
}

pub struct AtnBuilder<'g, 'd> {
    grammar: &'g Grammar,
    diagnostics: &'d mut Diagnostics,
    atn: Atn,
    rule_indices: HashMap<&'g str, usize>,
    current_rule: usize,
    blocks: Vec<EbnfBlock>,
}

impl<'g, 'd> AtnBuilder<'g, 'd> {
    pub fn new(grammar: &'g Grammar, diagnostics: &'d mut Diagnostics) -> Self {
        let mut rule_indices = HashMap::new();
        for (i, rule) in grammar.rules.iter().enumerate() {
            if rule_indices.contains_key(rule.name.as_str()) {
                diagnostics
                    .report(DiagnosticKind::DuplicateRule, rule.span)
                    .rule(&rule.name)
                    .emit();
                continue;
            }
            rule_indices.insert(rule.name.as_str(), i);
        }

        Self {
            grammar,
            diagnostics,
            atn: Atn::new(grammar.rule_names(), grammar.max_token_type()),
            rule_indices,
            current_rule: 0,
            blocks: Vec::new(),
        }
    }

    /// Builds the network. Rules listed in `undefined` get an empty body.
    pub fn build(mut self, undefined: &[usize]) -> BuiltAtn {
        let grammar = self.grammar;
        self.create_rule_start_and_stop_states();

        for (i, rule) in grammar.rules.iter().enumerate() {
            self.current_rule = i;
            let start = self.atn.rule_to_start[i];
            let stop = self.atn.rule_to_stop[i];
            if undefined.contains(&i) {
                self.epsilon(start, stop);
                continue;
            }
            let alts: Vec<Handle> = rule.alternatives.iter().map(|a| self.alt(a)).collect();
            let body = self.block(alts, Quantifier::One);
            self.epsilon(start, body.left);
            self.epsilon(body.right, stop);
        }

        self.add_rule_follow_links();
        self.mark_precedence_decisions();
        for (i, rule) in grammar.rules.iter().enumerate() {
            if let Some(lr) = &rule.left_recursive {
                self.atn.left_recursive_rules[i] = Some(LeftRecursiveRuleInfo {
                    primary_alts: lr.primary_alts(),
                    op_alts: lr.op_alts(),
                });
            }
        }

        BuiltAtn {
            atn: self.atn,
            blocks: self.blocks,
        }
    }

    fn create_rule_start_and_stop_states(&mut self) {
        for (i, rule) in self.grammar.rules.iter().enumerate() {
            let start = self.atn.add_state(i, StateKind::Basic);
            let stop = self.atn.add_state(i, StateKind::RuleStop);
            self.atn.state_mut(start).kind = StateKind::RuleStart {
                stop,
                left_recursive: rule.left_recursive.is_some(),
            };
            self.atn.rule_to_start.push(start);
            self.atn.rule_to_stop.push(stop);
        }
    }

    fn new_state(&mut self, kind: StateKind) -> StateId {
        self.atn.add_state(self.current_rule, kind)
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.atn.add_transition(from, Transition::epsilon(to));
    }

    /// Two states joined by one transition.
    fn edge(&mut self, kind: TransitionKind) -> Handle {
        let left = self.new_state(StateKind::Basic);
        let right = self.new_state(StateKind::Basic);
        self.atn.add_transition(left, Transition::new(right, kind));
        Handle { left, right }
    }

    fn empty(&mut self) -> Handle {
        self.edge(TransitionKind::Epsilon {
            outermost_precedence_return: None,
        })
    }

    fn alt(&mut self, alt: &Alternative) -> Handle {
        let handles: Vec<Handle> = alt.elements.iter().map(|e| self.element(e)).collect();
        let (Some(first), Some(last)) = (handles.first(), handles.last()) else {
            return self.empty();
        };
        let whole = Handle {
            left: first.left,
            right: last.right,
        };
        for pair in handles.windows(2) {
            self.epsilon(pair[0].right, pair[1].left);
        }
        whole
    }

    fn element(&mut self, element: &Element) -> Handle {
        match element {
            Element::Token { name, .. } => match self.token_type(name) {
                Some(t) => self.edge(TransitionKind::Atom(t)),
                None => self.empty(),
            },
            Element::Rule {
                name, precedence, ..
            } => self.rule_ref(name, precedence.unwrap_or(0)),
            Element::Wildcard => self.edge(TransitionKind::Wildcard),
            Element::Set { names } => {
                let set = self.token_set(names);
                self.edge(TransitionKind::Set(set))
            }
            Element::NotSet { names } => {
                let set = self.token_set(names);
                self.edge(TransitionKind::NotSet(set))
            }
            Element::Block {
                alternatives,
                quantifier,
            } => {
                let alts: Vec<Handle> = alternatives.iter().map(|a| self.alt(a)).collect();
                self.block(alts, *quantifier)
            }
            Element::Action { index } => self.edge(TransitionKind::Action {
                rule_index: self.current_rule,
                action_index: *index,
            }),
            Element::Predicate {
                index,
                ctx_dependent,
            } => self.edge(TransitionKind::Predicate {
                rule_index: self.current_rule,
                pred_index: *index,
                ctx_dependent: *ctx_dependent,
            }),
            Element::PrecedencePredicate { precedence } => self.edge(TransitionKind::Precedence {
                precedence: *precedence,
            }),
        }
    }

    fn rule_ref(&mut self, name: &str, precedence: i32) -> Handle {
        let Some(&callee) = self.rule_indices.get(name) else {
            self.diagnostics
                .report(DiagnosticKind::UndefinedRule, self.grammar.rules[self.current_rule].span)
                .message(name)
                .in_rule(&self.grammar.rules[self.current_rule].name)
                .emit();
            return self.empty();
        };
        let left = self.new_state(StateKind::Basic);
        let right = self.new_state(StateKind::Basic);
        let target = self.atn.rule_to_start[callee];
        self.atn.add_transition(
            left,
            Transition::new(
                target,
                TransitionKind::Rule {
                    follow: right,
                    rule_index: callee,
                    precedence,
                },
            ),
        );
        Handle { left, right }
    }

    fn token_type(&mut self, name: &str) -> Option<TokenType> {
        let found = self.grammar.token_type(name);
        if found.is_none() {
            self.diagnostics
                .report(DiagnosticKind::UndefinedToken, self.grammar.rules[self.current_rule].span)
                .message(name)
                .in_rule(&self.grammar.rules[self.current_rule].name)
                .emit();
        }
        found
    }

    fn token_set(&mut self, names: &[String]) -> IntervalSet {
        names.iter().filter_map(|n| self.token_type(n)).collect()
    }

    fn block(&mut self, alts: Vec<Handle>, quantifier: Quantifier) -> Handle {
        if alts.is_empty() {
            return self.empty();
        }
        match quantifier {
            Quantifier::One => {
                if alts.len() == 1 {
                    return alts[0];
                }
                let start = self.block_start(BlockKind::Basic);
                self.atn.define_decision(start);
                self.make_block(start, &alts)
            }
            Quantifier::Optional => {
                let start = self.block_start(BlockKind::Basic);
                self.atn.define_decision(start);
                let blk = self.make_block(start, &alts);
                self.epsilon(blk.left, blk.right);
                self.blocks.push(EbnfBlock {
                    rule_index: self.current_rule,
                    start: blk.left,
                    end: blk.right,
                    optional: true,
                });
                blk
            }
            Quantifier::Star => {
                let start = self.block_start(BlockKind::Star);
                if alts.len() > 1 {
                    self.atn.define_decision(start);
                }
                let blk = self.make_block(start, &alts);
                self.star(blk)
            }
            Quantifier::Plus => {
                let start = self.block_start(BlockKind::Plus { loopback: 0 });
                if alts.len() > 1 {
                    self.atn.define_decision(start);
                }
                let blk = self.make_block(start, &alts);
                self.plus(blk)
            }
        }
    }

    fn block_start(&mut self, block: BlockKind) -> StateId {
        self.new_state(StateKind::BlockStart {
            end: 0,
            block,
            decision: None,
        })
    }

    fn make_block(&mut self, start: StateId, alts: &[Handle]) -> Handle {
        let end = self.new_state(StateKind::BlockEnd { start });
        if let StateKind::BlockStart { end: e, .. } = &mut self.atn.state_mut(start).kind {
            *e = end;
        }
        for alt in alts {
            self.epsilon(start, alt.left);
            self.epsilon(alt.right, end);
        }
        Handle {
            left: start,
            right: end,
        }
    }

    /// ```text
    /// entry -> blk_start ... blk_end -> loopback -> entry
    /// entry -> loop_end
    /// ```
    fn star(&mut self, blk: Handle) -> Handle {
        self.closure_block(blk);
        let entry = self.new_state(StateKind::StarLoopEntry {
            loopback: 0,
            precedence_decision: false,
            decision: None,
        });
        self.atn.define_decision(entry);
        let end = self.new_state(StateKind::LoopEnd { loopback: 0 });
        let loopback = self.new_state(StateKind::StarLoopback);
        if let StateKind::StarLoopEntry { loopback: l, .. } = &mut self.atn.state_mut(entry).kind {
            *l = loopback;
        }
        if let StateKind::LoopEnd { loopback: l } = &mut self.atn.state_mut(end).kind {
            *l = loopback;
        }
        self.epsilon(entry, blk.left);
        self.epsilon(entry, end);
        self.epsilon(blk.right, loopback);
        self.epsilon(loopback, entry);
        Handle {
            left: entry,
            right: end,
        }
    }

    /// ```text
    /// blk_start ... blk_end -> loopback -> blk_start
    ///                          loopback -> loop_end
    /// ```
    fn plus(&mut self, blk: Handle) -> Handle {
        self.closure_block(blk);
        let loopback = self.new_state(StateKind::PlusLoopback { decision: None });
        self.atn.define_decision(loopback);
        let end = self.new_state(StateKind::LoopEnd { loopback });
        if let StateKind::BlockStart {
            block: BlockKind::Plus { loopback: l },
            ..
        } = &mut self.atn.state_mut(blk.left).kind
        {
            *l = loopback;
        }
        self.epsilon(blk.right, loopback);
        self.epsilon(loopback, blk.left);
        self.epsilon(loopback, end);
        Handle {
            left: blk.left,
            right: end,
        }
    }

    fn closure_block(&mut self, blk: Handle) {
        self.blocks.push(EbnfBlock {
            rule_index: self.current_rule,
            start: blk.left,
            end: blk.right,
            optional: false,
        });
    }

    /// Links each rule's stop state back to the follow state of every call.
    /// Returns from a left-recursive rule invoked at precedence 0 are tagged
    /// with the rule index.
    fn add_rule_follow_links(&mut self) {
        let mut links = Vec::new();
        for state in &self.atn.states {
            for t in &state.transitions {
                if let TransitionKind::Rule {
                    follow,
                    rule_index,
                    precedence,
                } = t.kind
                {
                    let outermost = (self.atn.is_left_recursive(rule_index) && precedence == 0)
                        .then_some(rule_index);
                    links.push((self.atn.rule_to_stop[rule_index], follow, outermost));
                }
            }
        }
        for (stop, follow, outermost_precedence_return) in links {
            self.atn.add_transition(
                stop,
                Transition::new(
                    follow,
                    TransitionKind::Epsilon {
                        outermost_precedence_return,
                    },
                ),
            );
        }
    }

    /// The operator loop of a rewritten rule exits straight to the rule stop.
    fn mark_precedence_decisions(&mut self) {
        let mut marked = Vec::new();
        for state in &self.atn.states {
            if !matches!(state.kind, StateKind::StarLoopEntry { .. })
                || !self.atn.is_left_recursive(state.rule_index)
            {
                continue;
            }
            let Some(exit) = state.transitions.last() else {
                continue;
            };
            let exit = self.atn.state(exit.target);
            if matches!(exit.kind, StateKind::LoopEnd { .. })
                && exit.only_has_epsilon_transitions()
                && exit
                    .transitions
                    .first()
                    .is_some_and(|t| self.atn.state(t.target).is_rule_stop())
            {
                marked.push(state.number);
            }
        }
        for s in marked {
            if let StateKind::StarLoopEntry {
                precedence_decision,
                ..
            } = &mut self.atn.state_mut(s).kind
            {
                *precedence_decision = true;
            }
        }
    }
}
