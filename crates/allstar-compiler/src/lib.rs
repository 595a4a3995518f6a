//! allstar compiler: grammar model to ATN.
//!
//! This crate turns a [`Grammar`] into the network the interpreter walks:
//! - `rewrite` - immediate left-recursion elimination
//! - `atn` - ATN construction and dumping
//! - `analyze` - left-recursion cycles and empty-loop checks
//! - `diagnostics` - error reporting

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod atn;
pub mod diagnostics;
pub mod rewrite;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod lib_tests;

use std::sync::Arc;

use allstar_core::Vocabulary;
use allstar_core::atn::Atn;
use allstar_core::grammar::{Grammar, GrammarError};

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};

/// Errors that can occur while compiling a grammar.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] GrammarError),

    #[error("grammar compilation failed with {} errors", .0.error_count())]
    Grammar(Diagnostics),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A grammar ready for interpretation.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    /// The grammar after left-recursion rewriting.
    pub grammar: Grammar,
    pub atn: Arc<Atn>,
    pub vocabulary: Vocabulary,
    /// Warnings produced while compiling.
    pub diagnostics: Diagnostics,
}

impl CompiledGrammar {
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.atn.rule_index(name)
    }

    /// Transition listing of one rule, see [`atn::AtnPrinter`].
    pub fn dump_rule(&self, name: &str) -> Option<String> {
        let rule = self.rule_index(name)?;
        Some(atn::AtnPrinter::new(&self.atn, &self.vocabulary).dump_rule(rule))
    }
}

/// Compiles `grammar` with default options.
pub fn compile(grammar: Grammar) -> Result<CompiledGrammar> {
    Compiler::builder().build().compile(grammar)
}

/// Compiler options and entry points.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    warnings_as_errors: bool,
}

/// Builder for `Compiler`.
#[derive(Debug, Default)]
pub struct CompilerBuilder {
    warnings_as_errors: bool,
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail compilation on warnings as well as errors.
    pub fn warnings_as_errors(mut self, value: bool) -> Self {
        self.warnings_as_errors = value;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            warnings_as_errors: self.warnings_as_errors,
        }
    }
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    /// Loads a JSON grammar and compiles it.
    pub fn compile_json(&self, json: &str) -> Result<CompiledGrammar> {
        self.compile(Grammar::from_json(json)?)
    }

    /// Rewrites left recursion, builds the ATN and runs the grammar checks.
    ///
    /// Rules that fail the rewrite are built with an empty body so the
    /// remaining rules are still checked.
    pub fn compile(&self, mut grammar: Grammar) -> Result<CompiledGrammar> {
        let mut diagnostics = Diagnostics::new();

        let undefined = rewrite::rewrite_left_recursion(&mut grammar, &mut diagnostics);
        let built = atn::AtnBuilder::new(&grammar, &mut diagnostics).build(&undefined);
        analyze::check_left_recursion_cycles(&built.atn, &mut diagnostics);
        analyze::check_epsilon_blocks(&built.atn, &grammar, &built.blocks, &mut diagnostics);

        if diagnostics.has_errors() || (self.warnings_as_errors && diagnostics.has_warnings()) {
            return Err(Error::Grammar(diagnostics));
        }

        let vocabulary = grammar.vocabulary();
        Ok(CompiledGrammar {
            grammar,
            atn: Arc::new(built.atn),
            vocabulary,
            diagnostics,
        })
    }
}
