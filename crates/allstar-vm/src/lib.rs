//! allstar runtime: ALL(*) interpretation of a compiled grammar.
//!
//! - `engine` - the interpreter loop and the shared recognizer state
//! - `prediction` - configurations, conflict analysis and the ATN simulator
//! - `dfa` - per-decision DFA cache filled by prediction
//! - `strategy` - error reporting and recovery
//! - `listener` - syntax-error and diagnostic listeners
//! - `ambiguity` - reparsing an ambiguous region once per alternative

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ambiguity;
pub mod dfa;
pub mod engine;
pub mod error;
pub mod listener;
pub mod prediction;
pub mod strategy;
pub mod token_stream;
pub mod trace;
pub mod tree;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod ambiguity_tests;
#[cfg(test)]
mod listener_tests;

// Re-export commonly used items at crate root
pub use ambiguity::{AmbiguousTree, all_possible_parse_trees};
pub use dfa::{Dfa, DfaCache};
pub use engine::{DefaultHooks, Interpreter, InterpreterBuilder, ParserHooks, Recognizer};
pub use error::{ParseError, RecognitionError};
pub use listener::{ConsoleErrorListener, DiagnosticErrorListener, ErrorListener, Report};
pub use prediction::{AltSet, PredictionMode};
pub use strategy::{BailErrorStrategy, DefaultErrorStrategy, ErrorStrategy};
pub use token_stream::{TokenStream, VecTokenStream};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use tree::{Child, ContextId, ParseTree, TreeValue};
