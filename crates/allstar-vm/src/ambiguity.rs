//! Parse trees for each alternative of an ambiguous decision.
//!
//! The whole input is reparsed from the start rule once per alternative,
//! forcing the decision at the ambiguous position, and the subtree covering
//! the ambiguous region is kept.

use std::sync::Arc;

use allstar_core::Vocabulary;
use allstar_core::atn::Atn;

use crate::engine::Interpreter;
use crate::error::ParseError;
use crate::prediction::{AltSet, PredictionMode};
use crate::strategy::BailErrorStrategy;
use crate::token_stream::TokenStream;
use crate::tree::{ContextId, ParseTree};

/// One interpretation of an ambiguous region.
#[derive(Debug, Clone)]
pub struct AmbiguousTree {
    /// Alternative forced at the decision.
    pub alt: usize,
    pub tree: ParseTree,
    /// Root of the subtree covering the region.
    pub root: ContextId,
}

impl AmbiguousTree {
    /// Renders the subtree with outer alternative numbers: `(y:1 a (z:1 b) c)`.
    pub fn to_string_tree(&self) -> String {
        self.tree.to_string_tree_with_alts(self.root)
    }
}

/// Reparses `tokens` once for each alternative in `alts`, forcing `decision`
/// at `start_index`, and returns the subtree enclosing
/// `start_index..=stop_index` of each parse, in alternative order.
///
/// The first tree is the interpretation the parser picks on its own, since
/// ambiguities resolve to the minimum alternative. Parsing stops at the first
/// syntax error.
#[allow(clippy::too_many_arguments)]
pub fn all_possible_parse_trees(
    atn: &Arc<Atn>,
    vocabulary: &Vocabulary,
    tokens: &mut dyn TokenStream,
    decision: usize,
    alts: &AltSet,
    start_index: usize,
    stop_index: usize,
    start_rule: usize,
) -> Result<Vec<AmbiguousTree>, ParseError> {
    // EOF is never inside the region.
    let size = tokens.size();
    let stop_index = if stop_index + 1 >= size {
        size.saturating_sub(2)
    } else {
        stop_index
    };

    let mut parser = Interpreter::builder(Arc::clone(atn), vocabulary.clone())
        .remove_listeners()
        .error_strategy(BailErrorStrategy::new())
        .prediction_mode(PredictionMode::LlExactAmbigDetection)
        .build(tokens);

    let mut trees = Vec::with_capacity(alts.len());
    for alt in alts.iter() {
        parser.reset();
        parser.add_decision_override(decision, start_index, alt);
        let root = parser.parse(start_rule)?;
        let override_root = parser.override_root();
        let tree = parser.take_tree();

        let mut subtree = tree
            .root_of_subtree_enclosing_region(root, start_index, stop_index)
            .unwrap_or(root);
        // Prefer the context the decision was made in when it is higher up.
        if let Some(decided) = override_root
            && tree.is_ancestor_of(decided, subtree)
        {
            subtree = decided;
        }
        trees.push(AmbiguousTree {
            alt,
            tree,
            root: subtree,
        });
    }
    Ok(trees)
}
