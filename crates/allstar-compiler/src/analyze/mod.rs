//! Checks over the built network.
//!
//! - `left_recursion`: indirect left-recursion cycles the rewrite cannot remove
//! - `epsilon`: loops and optional blocks whose alternatives match nothing

mod epsilon;
mod left_recursion;

#[cfg(test)]
mod analyze_tests;

pub use epsilon::check_epsilon_blocks;
pub use left_recursion::{LeftRecursionDetector, check_left_recursion_cycles};
