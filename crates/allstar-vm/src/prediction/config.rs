//! ATN configurations and configuration sets.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use allstar_core::atn::{PredictionContext, StateId};

use super::alt_set::AltSet;
use super::semantic::SemanticContext;

/// A point in the ATN reached while predicting one alternative.
#[derive(Debug, Clone)]
pub struct AtnConfig {
    pub state: StateId,
    pub alt: usize,
    pub context: Arc<PredictionContext>,
    pub semantic: SemanticContext,
    /// How many rule stops closure passed through with an empty stack.
    pub reaches_into_outer_context: u32,
    /// Set when closure left a left-recursive decision rule through a
    /// precedence-0 return, so the precedence filter keeps the config.
    pub precedence_filter_suppressed: bool,
}

impl AtnConfig {
    pub fn new(state: StateId, alt: usize, context: Arc<PredictionContext>) -> Self {
        Self {
            state,
            alt,
            context,
            semantic: SemanticContext::None,
            reaches_into_outer_context: 0,
            precedence_filter_suppressed: false,
        }
    }

    pub fn with_state(&self, state: StateId) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    pub fn with_context(&self, state: StateId, context: Arc<PredictionContext>) -> Self {
        Self {
            state,
            context,
            ..self.clone()
        }
    }

    pub fn with_semantic(&self, state: StateId, semantic: SemanticContext) -> Self {
        Self {
            state,
            semantic,
            ..self.clone()
        }
    }

    fn key(&self) -> ConfigKey {
        ConfigKey {
            state: self.state,
            alt: self.alt,
            context: Arc::clone(&self.context),
            semantic: self.semantic.clone(),
        }
    }
}

impl PartialEq for AtnConfig {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.alt == other.alt
            && self.precedence_filter_suppressed == other.precedence_filter_suppressed
            && self.semantic == other.semantic
            && (Arc::ptr_eq(&self.context, &other.context) || self.context == other.context)
    }
}

impl Eq for AtnConfig {}

impl Hash for AtnConfig {
    fn hash<H: Hasher>(&self, h: &mut H) {
        self.state.hash(h);
        self.alt.hash(h);
        self.context.hash(h);
        self.semantic.hash(h);
        self.precedence_filter_suppressed.hash(h);
    }
}

impl fmt::Display for AtnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{}", self.state, self.alt, self.context)?;
        if !self.semantic.is_none() {
            write!(f, ",{}", self.semantic)?;
        }
        if self.reaches_into_outer_context > 0 {
            write!(f, ",up={}", self.reaches_into_outer_context)?;
        }
        write!(f, ")")
    }
}

/// Identity of a config inside a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConfigKey {
    state: StateId,
    alt: usize,
    context: Arc<PredictionContext>,
    semantic: SemanticContext,
}

/// Ordered, duplicate-free set of configurations.
///
/// Configs with the same state, alternative, stack and predicate are one
/// entry. Stacks are never merged.
#[derive(Debug, Clone, Default)]
pub struct AtnConfigSet {
    configs: Vec<AtnConfig>,
    index: HashMap<ConfigKey, usize>,
    pub full_ctx: bool,
    pub has_semantic_context: bool,
    pub dips_into_outer_context: bool,
    /// Filled in once the set becomes a DFA state.
    pub unique_alt: Option<usize>,
    pub conflicting_alts: Option<AltSet>,
}

impl AtnConfigSet {
    pub fn new(full_ctx: bool) -> Self {
        Self {
            full_ctx,
            ..Default::default()
        }
    }

    /// Adds `config`, folding it into an existing equal entry. Returns whether
    /// a new entry was created.
    pub fn add(&mut self, config: AtnConfig) -> bool {
        if !config.semantic.is_none() {
            self.has_semantic_context = true;
        }
        if config.reaches_into_outer_context > 0 {
            self.dips_into_outer_context = true;
        }
        let key = config.key();
        if let Some(&i) = self.index.get(&key) {
            let existing = &mut self.configs[i];
            existing.reaches_into_outer_context = existing
                .reaches_into_outer_context
                .max(config.reaches_into_outer_context);
            existing.precedence_filter_suppressed |= config.precedence_filter_suppressed;
            return false;
        }
        self.index.insert(key, self.configs.len());
        self.configs.push(config);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtnConfig> {
        self.configs.iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn alts(&self) -> AltSet {
        self.configs.iter().map(|c| c.alt).collect()
    }
}

impl<'a> IntoIterator for &'a AtnConfigSet {
    type Item = &'a AtnConfig;
    type IntoIter = std::slice::Iter<'a, AtnConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}

impl PartialEq for AtnConfigSet {
    fn eq(&self, other: &Self) -> bool {
        self.full_ctx == other.full_ctx && self.configs == other.configs
    }
}

impl Eq for AtnConfigSet {}

impl Hash for AtnConfigSet {
    fn hash<H: Hasher>(&self, h: &mut H) {
        self.full_ctx.hash(h);
        self.configs.hash(h);
    }
}

impl fmt::Display for AtnConfigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.configs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")?;
        if self.has_semantic_context {
            write!(f, ",hasSemanticContext")?;
        }
        if let Some(alt) = self.unique_alt {
            write!(f, ",uniqueAlt={alt}")?;
        }
        if let Some(alts) = &self.conflicting_alts {
            write!(f, ",conflictingAlts={alts}")?;
        }
        if self.dips_into_outer_context {
            write!(f, ",dipsIntoOuterContext")?;
        }
        Ok(())
    }
}
