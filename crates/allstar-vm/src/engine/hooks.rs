use crate::tree::{ContextId, ParseTree};

/// Callbacks for the semantic predicates and actions embedded in a grammar.
///
/// Predicates are identified by `(rule_index, pred_index)` and actions by
/// `(rule_index, action_index)`, as numbered in the grammar.
pub trait ParserHooks {
    /// `ctx` is `None` when a context-independent predicate is evaluated
    /// during prediction.
    fn sempred(
        &mut self,
        _tree: &ParseTree,
        _ctx: Option<ContextId>,
        _rule_index: usize,
        _pred_index: usize,
    ) -> bool {
        true
    }

    fn action(
        &mut self,
        _tree: &ParseTree,
        _ctx: ContextId,
        _rule_index: usize,
        _action_index: usize,
    ) {
    }
}

/// Accepts every predicate and ignores every action.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl ParserHooks for DefaultHooks {}
