//! Parse-tree building interpreter and the state it shares with error
//! strategies.

mod hooks;
mod interpreter;
mod recognizer;

#[cfg(test)]
mod recovery_tests;

pub use hooks::{DefaultHooks, ParserHooks};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use recognizer::Recognizer;
