//! Adaptive prediction: configurations, semantic contexts, conflict
//! analysis and the ATN simulator that fills the DFA cache.

mod alt_set;
mod config;
pub mod mode;
mod semantic;
pub(crate) mod simulator;

#[cfg(test)]
mod prediction_tests;

pub use alt_set::AltSet;
pub use config::{AtnConfig, AtnConfigSet};
pub use mode::PredictionMode;
pub use semantic::{PredicateEvaluator, SemanticContext};
