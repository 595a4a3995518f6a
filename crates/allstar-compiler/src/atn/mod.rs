//! ATN construction and dumping.

mod builder;
mod printer;

#[cfg(test)]
mod builder_tests;

pub use builder::{AtnBuilder, BuiltAtn, EbnfBlock};
pub use printer::AtnPrinter;
