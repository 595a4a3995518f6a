//! Detection of left-recursion cycles through rule calls.
//!
//! A rule that can reach a call to itself without consuming input, through
//! other rules, loops forever. Immediate left recursion is rewritten before
//! the network is built, so every cycle found here is indirect.

use std::collections::HashSet;

use allstar_core::atn::{Atn, StateId, TransitionKind};
use indexmap::IndexSet;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub struct LeftRecursionDetector<'a> {
    atn: &'a Atn,
    /// Rules entered along the current call path.
    rules_on_path: HashSet<usize>,
    cycles: Vec<IndexSet<usize>>,
}

impl<'a> LeftRecursionDetector<'a> {
    pub fn new(atn: &'a Atn) -> Self {
        Self {
            atn,
            rules_on_path: HashSet::new(),
            cycles: Vec::new(),
        }
    }

    /// Sets of mutually left-recursive rule indices, in discovery order.
    pub fn detect(mut self) -> Vec<IndexSet<usize>> {
        for rule in 0..self.atn.rule_to_start.len() {
            self.rules_on_path.clear();
            self.rules_on_path.insert(rule);
            self.check(rule, self.atn.rule_to_start[rule], &mut HashSet::new());
        }
        self.cycles
    }

    /// Walks epsilon edges from `s`; returns whether the rule stop is reachable.
    fn check(&mut self, rule: usize, s: StateId, visited: &mut HashSet<StateId>) -> bool {
        let atn = self.atn;
        let state = atn.state(s);
        if state.is_rule_stop() {
            return true;
        }
        if !visited.insert(s) {
            return false;
        }

        let mut reaches_stop = false;
        for t in &state.transitions {
            if let TransitionKind::Rule {
                follow, rule_index, ..
            } = t.kind
            {
                if self.rules_on_path.contains(&rule_index) {
                    self.add_rules_to_cycle(rule, rule_index);
                    continue;
                }
                self.rules_on_path.insert(rule_index);
                let nullable = self.check(rule_index, t.target, &mut HashSet::new());
                self.rules_on_path.remove(&rule_index);
                if nullable {
                    reaches_stop |= self.check(rule, follow, visited);
                }
            } else if t.is_epsilon() {
                reaches_stop |= self.check(rule, t.target, visited);
            }
        }
        reaches_stop
    }

    fn add_rules_to_cycle(&mut self, enclosing: usize, target: usize) {
        let mut found = false;
        for cycle in &mut self.cycles {
            if cycle.contains(&target) {
                cycle.insert(enclosing);
                found = true;
            }
            if cycle.contains(&enclosing) {
                cycle.insert(target);
                found = true;
            }
        }
        if !found {
            self.cycles.push(IndexSet::from([target, enclosing]));
        }
    }
}

/// Reports all left-recursion cycles as a single diagnostic.
pub fn check_left_recursion_cycles(atn: &Atn, diagnostics: &mut Diagnostics) {
    let cycles = LeftRecursionDetector::new(atn).detect();
    if cycles.is_empty() {
        return;
    }
    let sets: Vec<String> = cycles
        .iter()
        .map(|cycle| {
            let names: Vec<&str> = cycle
                .iter()
                .map(|&r| atn.rule_names[r].as_str())
                .collect();
            format!("[{}]", names.join(", "))
        })
        .collect();
    diagnostics
        .report(DiagnosticKind::LeftRecursionCycles, None)
        .message(sets.join(" and "))
        .emit();
}
