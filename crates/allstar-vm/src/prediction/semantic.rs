//! Semantic contexts: predicates collected during closure.
//!
//! SLL prediction does not evaluate predicates while computing closures.
//! It gathers them on each configuration instead, combined with `&&` along a
//! path and with `||` across configurations that predict the same
//! alternative. The predicates are evaluated once a DFA state has to choose.

use std::fmt;

use crate::tree::ContextId;

/// Evaluates the predicates a [`SemanticContext`] refers to.
pub trait PredicateEvaluator {
    /// User predicate `rule_index:pred_index`. `ctx` is the outer context for
    /// context-dependent predicates and `None` otherwise.
    fn sempred(&mut self, ctx: Option<ContextId>, rule_index: usize, pred_index: usize) -> bool;

    /// `precpred(_ctx, precedence)`: true when `precedence` is at least the
    /// precedence of the rule invocation in progress.
    fn precpred(&mut self, precedence: i32) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SemanticContext {
    /// Always true.
    #[default]
    None,
    Predicate {
        rule_index: usize,
        pred_index: usize,
        ctx_dependent: bool,
    },
    Precedence(i32),
    And(Vec<SemanticContext>),
    Or(Vec<SemanticContext>),
}

impl SemanticContext {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn and(a: &Self, b: &Self) -> Self {
        if a.is_none() {
            return b.clone();
        }
        if b.is_none() {
            return a.clone();
        }
        let mut operands = Vec::new();
        flatten(a, Junction::And, &mut operands);
        flatten(b, Junction::And, &mut operands);
        collapse_precedence(&mut operands, Junction::And);
        build(operands, Junction::And)
    }

    pub fn or(a: &Self, b: &Self) -> Self {
        if a.is_none() || b.is_none() {
            return Self::None;
        }
        let mut operands = Vec::new();
        flatten(a, Junction::Or, &mut operands);
        flatten(b, Junction::Or, &mut operands);
        collapse_precedence(&mut operands, Junction::Or);
        build(operands, Junction::Or)
    }

    /// Evaluates the context. `outer` is passed to context-dependent
    /// predicates.
    pub fn eval(&self, evaluator: &mut dyn PredicateEvaluator, outer: ContextId) -> bool {
        match self {
            Self::None => true,
            Self::Predicate {
                rule_index,
                pred_index,
                ctx_dependent,
            } => {
                let ctx = ctx_dependent.then_some(outer);
                evaluator.sempred(ctx, *rule_index, *pred_index)
            }
            Self::Precedence(p) => evaluator.precpred(*p),
            Self::And(ops) => ops.iter().all(|op| op.eval(evaluator, outer)),
            Self::Or(ops) => ops.iter().any(|op| op.eval(evaluator, outer)),
        }
    }

    /// Resolves the precedence predicates against the current precedence and
    /// leaves the rest in place.
    ///
    /// `None` means the context can never be true; `Some(SemanticContext::None)`
    /// means it is always true.
    pub fn eval_precedence(&self, evaluator: &mut dyn PredicateEvaluator) -> Option<Self> {
        match self {
            Self::None | Self::Predicate { .. } => Some(self.clone()),
            Self::Precedence(p) => evaluator.precpred(*p).then_some(Self::None),
            Self::And(ops) => {
                let mut changed = false;
                let mut operands = Vec::new();
                for op in ops {
                    let evaluated = op.eval_precedence(evaluator)?;
                    changed |= evaluated != *op;
                    if !evaluated.is_none() {
                        operands.push(evaluated);
                    }
                }
                if !changed {
                    return Some(self.clone());
                }
                Some(
                    operands
                        .iter()
                        .fold(Self::None, |acc, op| Self::and(&acc, op)),
                )
            }
            Self::Or(ops) => {
                let mut changed = false;
                let mut operands = Vec::new();
                for op in ops {
                    let evaluated = op.eval_precedence(evaluator);
                    changed |= evaluated.as_ref() != Some(op);
                    match evaluated {
                        Some(Self::None) => return Some(Self::None),
                        Some(e) => operands.push(e),
                        None => {}
                    }
                }
                if !changed {
                    return Some(self.clone());
                }
                let mut operands = operands.into_iter();
                let first = operands.next()?;
                Some(operands.fold(first, |acc, op| Self::or(&acc, &op)))
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Junction {
    And,
    Or,
}

fn flatten(ctx: &SemanticContext, junction: Junction, out: &mut Vec<SemanticContext>) {
    let nested = match (ctx, junction) {
        (SemanticContext::And(ops), Junction::And) | (SemanticContext::Or(ops), Junction::Or) => {
            Some(ops)
        }
        _ => None,
    };
    match nested {
        Some(ops) => {
            for op in ops {
                flatten(op, junction, out);
            }
        }
        None => {
            if !out.contains(ctx) {
                out.push(ctx.clone());
            }
        }
    }
}

/// Keeps a single precedence predicate: the lowest under `&&`, the highest
/// under `||`.
fn collapse_precedence(operands: &mut Vec<SemanticContext>, junction: Junction) {
    let precedences: Vec<i32> = operands
        .iter()
        .filter_map(|op| match op {
            SemanticContext::Precedence(p) => Some(*p),
            _ => None,
        })
        .collect();
    let kept = match junction {
        Junction::And => precedences.iter().min(),
        Junction::Or => precedences.iter().max(),
    };
    let Some(&kept) = kept else {
        return;
    };
    operands.retain(|op| !matches!(op, SemanticContext::Precedence(_)));
    operands.push(SemanticContext::Precedence(kept));
}

fn build(mut operands: Vec<SemanticContext>, junction: Junction) -> SemanticContext {
    if operands.len() == 1 {
        return operands.remove(0);
    }
    match junction {
        Junction::And => SemanticContext::And(operands),
        Junction::Or => SemanticContext::Or(operands),
    }
}

impl fmt::Display for SemanticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "{{true}}?"),
            Self::Predicate {
                rule_index,
                pred_index,
                ..
            } => write!(f, "{{{rule_index}:{pred_index}}}?"),
            Self::Precedence(p) => write!(f, "{{{p}>=prec}}?"),
            Self::And(ops) => join(f, ops, "&&"),
            Self::Or(ops) => join(f, ops, "||"),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, ops: &[SemanticContext], sep: &str) -> fmt::Result {
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{op}")?;
    }
    Ok(())
}
