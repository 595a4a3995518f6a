//! Immediate left-recursion elimination.
//!
//! A rule such as
//!
//! ```text
//! e : e '*' e | e '+' e | '-' e | INT ;
//! ```
//!
//! is rewritten into a primary block followed by a precedence-guarded loop:
//!
//! ```text
//! e : ( '-' e[1] | INT ) ( {precpred 3}? '*' e[4] | {precpred 2}? '+' e[3] )* ;
//! ```
//!
//! Alternatives are classified by where their bare self references sit.
//! Precedence decreases with alternative order, so earlier alternatives bind
//! tighter. Calls to a rewritten rule that carry no precedence pass 0.

use std::collections::HashSet;

use allstar_core::grammar::{
    AltKind, Alternative, Assoc, Element, Grammar, LeftRecursiveAltInfo, LeftRecursiveRule,
    Quantifier, Rule,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Shape of a rule with respect to immediate left recursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRecursionAnalysis {
    /// One entry per alternative, in order.
    pub kinds: Vec<AltKind>,
    /// Some alternative starts with a reference to the rule itself, arguments
    /// and labels notwithstanding.
    pub has_immediate_refs: bool,
}

impl LeftRecursionAnalysis {
    /// Binary, ternary and suffix alternatives make a rule left recursive;
    /// prefix alternatives alone do not.
    pub fn is_left_recursive(&self) -> bool {
        self.kinds.iter().any(|k| k.is_operator())
    }

    /// Left references exist but match none of the rewritable shapes.
    pub fn is_nonconforming(&self) -> bool {
        self.has_immediate_refs && !self.is_left_recursive()
    }

    pub fn has_primary(&self) -> bool {
        self.kinds.contains(&AltKind::Primary)
    }
}

pub fn analyze_rule(rule: &Rule) -> LeftRecursionAnalysis {
    let kinds = rule
        .alternatives
        .iter()
        .map(|alt| classify(&rule.name, alt))
        .collect();
    let has_immediate_refs = rule.alternatives.iter().any(|alt| {
        matches!(alt.elements.first(), Some(Element::Rule { name, .. }) if *name == rule.name)
    });
    LeftRecursionAnalysis {
        kinds,
        has_immediate_refs,
    }
}

/// Rewrites every immediately left-recursive rule of `grammar` in place.
///
/// Rules that were already rewritten are left alone. Returns the indices of
/// rules that could not be rewritten; each has a diagnostic in `diagnostics`.
pub fn rewrite_left_recursion(grammar: &mut Grammar, diagnostics: &mut Diagnostics) -> Vec<usize> {
    let mut failed = Vec::new();

    for (index, rule) in grammar.rules.iter_mut().enumerate() {
        if rule.left_recursive.is_some() {
            continue;
        }
        let analysis = analyze_rule(rule);
        if analysis.is_nonconforming() {
            diagnostics
                .report(DiagnosticKind::NonconformingLeftRecursion, rule.span)
                .rule(&rule.name)
                .emit();
            failed.push(index);
            continue;
        }
        if !analysis.is_left_recursive() {
            continue;
        }
        if !analysis.has_primary() {
            diagnostics
                .report(DiagnosticKind::NoNonLeftRecursiveAlts, rule.span)
                .rule(&rule.name)
                .emit();
            failed.push(index);
            continue;
        }
        rewrite_rule(rule, &analysis.kinds);
    }

    let left_recursive: HashSet<String> = grammar
        .rules
        .iter()
        .filter(|r| r.left_recursive.is_some())
        .map(|r| r.name.clone())
        .collect();
    if !left_recursive.is_empty() {
        for rule in &mut grammar.rules {
            for alt in &mut rule.alternatives {
                default_precedence(&mut alt.elements, &left_recursive);
            }
        }
    }

    failed
}

fn rewrite_rule(rule: &mut Rule, kinds: &[AltKind]) {
    let recursive = kinds.iter().filter(|k| **k != AltKind::Primary).count() as i32;
    let mut seen = 0;
    let mut alts = Vec::with_capacity(kinds.len());

    for (i, (alt, &kind)) in rule.alternatives.iter().zip(kinds).enumerate() {
        let precedence = if kind == AltKind::Primary {
            0
        } else {
            seen += 1;
            recursive - seen + 1
        };
        let next_precedence = match kind {
            AltKind::Binary | AltKind::Ternary if alt.assoc == Assoc::Right => Some(precedence),
            AltKind::Binary | AltKind::Ternary => Some(precedence + 1),
            AltKind::Prefix => Some(precedence),
            AltKind::Suffix | AltKind::Primary => None,
        };

        let mut rewritten = alt.clone();
        if kind.is_operator() {
            rewritten.elements = std::iter::once(Element::PrecedencePredicate { precedence })
                .chain(alt.elements[1..].iter().cloned())
                .collect();
        }
        if let Some(next) = next_precedence
            && let Some(Element::Rule {
                name, precedence, ..
            }) = rightmost_rule_ref(&mut rewritten.elements)
            && *name == rule.name
        {
            *precedence = Some(next);
        }

        alts.push(LeftRecursiveAltInfo {
            kind,
            alt_number: i + 1,
            precedence,
            next_precedence,
            original: alt.clone(),
            rewritten,
        });
    }

    let primary: Vec<Alternative> = alts
        .iter()
        .filter(|a| !a.kind.is_operator())
        .map(|a| a.rewritten.clone())
        .collect();
    let operators: Vec<Alternative> = alts
        .iter()
        .filter(|a| a.kind.is_operator())
        .map(|a| a.rewritten.clone())
        .collect();

    let original_alternatives = std::mem::take(&mut rule.alternatives);
    rule.alternatives = vec![Alternative::new(vec![
        Element::Block {
            alternatives: primary,
            quantifier: Quantifier::One,
        },
        Element::Block {
            alternatives: operators,
            quantifier: Quantifier::Star,
        },
    ])];
    rule.left_recursive = Some(LeftRecursiveRule {
        original_alternatives,
        alts,
    });
}

fn classify(rule: &str, alt: &Alternative) -> AltKind {
    let elements = &alt.elements;
    let Some(first) = elements.first() else {
        return AltKind::Primary;
    };
    let starts = is_recurse(first, rule);
    let last = elements.iter().rposition(|e| !is_epsilon_element(e));
    let ends = last.filter(|&i| is_recurse(&elements[i], rule));

    match (starts, ends) {
        (true, Some(last)) if last > 0 => {
            if elements[1..last].iter().any(|e| is_recurse(e, rule)) {
                AltKind::Ternary
            } else {
                AltKind::Binary
            }
        }
        (false, Some(_)) => AltKind::Prefix,
        (true, _) if elements.len() > 1 => AltKind::Suffix,
        _ => AltKind::Primary,
    }
}

/// A bare reference to `rule`; labels are allowed, arguments are not.
fn is_recurse(element: &Element, rule: &str) -> bool {
    matches!(element, Element::Rule { name, args: None, .. } if name == rule)
}

fn is_epsilon_element(element: &Element) -> bool {
    matches!(
        element,
        Element::Action { .. } | Element::Predicate { .. } | Element::PrecedencePredicate { .. }
    )
}

/// Last rule reference in preorder, looking inside nested blocks.
fn rightmost_rule_ref(elements: &mut [Element]) -> Option<&mut Element> {
    for element in elements.iter_mut().rev() {
        if matches!(element, Element::Rule { .. }) {
            return Some(element);
        }
        if let Element::Block { alternatives, .. } = element {
            for alt in alternatives.iter_mut().rev() {
                if let Some(found) = rightmost_rule_ref(&mut alt.elements) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn default_precedence(elements: &mut [Element], left_recursive: &HashSet<String>) {
    for element in elements {
        match element {
            Element::Rule {
                name,
                precedence: precedence @ None,
                ..
            } if left_recursive.contains(name.as_str()) => *precedence = Some(0),
            Element::Block { alternatives, .. } => {
                for alt in alternatives {
                    default_precedence(&mut alt.elements, left_recursive);
                }
            }
            _ => {}
        }
    }
}
