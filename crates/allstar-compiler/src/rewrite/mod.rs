//! Grammar rewrites applied before the network is built.

mod left_recursive;

#[cfg(test)]
mod left_recursive_tests;

pub use left_recursive::{LeftRecursionAnalysis, analyze_rule, rewrite_left_recursion};
