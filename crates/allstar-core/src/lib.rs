#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the allstar ALL(*) interpreter.
//!
//! - [`grammar`]: the grammar model, loaded from JSON or built in code
//! - [`atn`]: the augmented transition network compiled from a grammar
//! - [`IntervalSet`], [`Token`], [`Vocabulary`]: symbols and their names
//!
//! Everything here is immutable once built and safe to share across threads.

pub mod atn;
pub mod colors;
pub mod grammar;
pub mod interval_set;
pub mod token;
pub mod vocabulary;


pub use colors::Colors;
pub use interval_set::{Interval, IntervalSet};
pub use token::{EOF, EPSILON, INVALID_TYPE, MIN_USER_TOKEN_TYPE, Token, TokenType};
pub use vocabulary::Vocabulary;
