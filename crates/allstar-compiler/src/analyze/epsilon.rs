use std::collections::HashSet;

use allstar_core::EPSILON;
use allstar_core::atn::{Atn, Ll1Analyzer, StateId};
use allstar_core::grammar::Grammar;

use crate::atn::EbnfBlock;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Loops must consume input on every iteration, and optional blocks should
/// not hide an empty alternative behind their bypass.
pub fn check_epsilon_blocks(
    atn: &Atn,
    grammar: &Grammar,
    blocks: &[EbnfBlock],
    diagnostics: &mut Diagnostics,
) {
    let analyzer = Ll1Analyzer::new(atn);
    // Blocks iterated by the operator loop of a rewritten rule.
    let operator_loops: HashSet<StateId> = atn
        .states
        .iter()
        .filter(|s| s.is_precedence_decision())
        .filter_map(|s| s.transitions.first().map(|t| t.target))
        .collect();

    for block in blocks {
        let rule = &grammar.rules[block.rule_index];

        if block.optional {
            let empty_alt = atn
                .state(block.start)
                .transitions
                .iter()
                .filter(|t| t.target != block.end)
                .any(|t| analyzer.look(t.target, Some(block.end), None).contains(EPSILON));
            if empty_alt {
                diagnostics
                    .report(DiagnosticKind::EpsilonOptional, rule.span)
                    .rule(&rule.name)
                    .emit();
            }
            continue;
        }

        if analyzer
            .look(block.start, Some(block.end), None)
            .contains(EPSILON)
        {
            let kind = if operator_loops.contains(&block.start) {
                DiagnosticKind::EpsilonLeftRecursiveFollow
            } else {
                DiagnosticKind::EpsilonClosure
            };
            diagnostics.report(kind, rule.span).rule(&rule.name).emit();
        }
    }
}
