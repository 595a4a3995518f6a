//! Test helpers for compiled grammars.

use allstar_core::grammar::Grammar;

use crate::{CompiledGrammar, Diagnostics, Error, compile};

impl CompiledGrammar {
    pub fn expect_valid(grammar: Grammar) -> Self {
        match compile(grammar) {
            Ok(compiled) => compiled,
            Err(e) => panic!("expected valid grammar, got: {e}\n{}", render_error(&e)),
        }
    }

    pub fn expect_invalid(grammar: Grammar) -> Diagnostics {
        match compile(grammar) {
            Ok(_) => panic!("expected grammar errors"),
            Err(Error::Grammar(diagnostics)) => diagnostics,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    /// Dump of `rule`, panicking when the rule does not exist.
    pub fn expect_dump(&self, rule: &str) -> String {
        self.dump_rule(rule)
            .unwrap_or_else(|| panic!("no rule `{rule}`"))
    }
}

fn render_error(e: &Error) -> String {
    match e {
        Error::Grammar(diagnostics) => diagnostics.printer().render(),
        Error::Load(_) => String::new(),
    }
}

/// Snapshot test for one rule's ATN dump.
#[macro_export]
macro_rules! shot_atn {
    ($grammar:expr, $rule:literal, @$expected:literal) => {{
        let compiled = $crate::CompiledGrammar::expect_valid($grammar);
        let output = compiled.expect_dump($rule);
        insta::with_settings!({ omit_expression => true }, {
            insta::assert_snapshot!(output, @$expected);
        });
    }};
}

/// Snapshot test for rendered grammar errors.
#[macro_export]
macro_rules! shot_error {
    ($grammar:expr, @$expected:literal) => {{
        let diagnostics = $crate::CompiledGrammar::expect_invalid($grammar);
        let output = diagnostics.printer().render();
        insta::with_settings!({ omit_expression => true }, {
            insta::assert_snapshot!(output, @$expected);
        });
    }};
}
