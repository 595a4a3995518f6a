use indoc::indoc;

use allstar_core::EOF;

use super::*;

const CALC: &str = indoc! {r#"
    {
      "name": "Calc",
      "tokens": { "PLUS": "+", "INT": null },
      "rules": {
        "s": { "type": "SEQ", "members": [
          { "type": "RULE", "name": "e" },
          { "type": "TOKEN", "name": "EOF" }
        ]},
        "e": { "type": "CHOICE", "members": [
          { "type": "SEQ", "members": [
            { "type": "RULE", "name": "e" },
            { "type": "TOKEN", "name": "PLUS" },
            { "type": "RULE", "name": "e" }
          ]},
          { "type": "TOKEN", "name": "INT" }
        ]}
      }
    }
"#};

#[test]
fn compiles_json_grammar() {
    let compiled = Compiler::builder().build().compile_json(CALC).unwrap();

    assert_eq!(compiled.rule_index("s"), Some(0));
    assert_eq!(compiled.rule_index("e"), Some(1));
    assert_eq!(compiled.grammar.token_type("'+'"), Some(1));
    assert_eq!(compiled.grammar.token_type("EOF"), Some(EOF));
    assert!(compiled.atn.is_left_recursive(1));
    assert!(!compiled.atn.is_left_recursive(0));
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn malformed_json_is_a_load_error() {
    let result = compile_json_str(r#"{ "name": "Broken", "rules": "#);

    assert!(matches!(result, Err(Error::Load(_))));
}

#[test]
fn undefined_token_fails_compilation() {
    let json = indoc! {r#"
        {
          "name": "Missing",
          "rules": {
            "s": { "type": "TOKEN", "name": "NOPE" }
          }
        }
    "#};

    let Err(Error::Grammar(diagnostics)) = compile_json_str(json) else {
        panic!("expected grammar diagnostics");
    };

    assert_eq!(diagnostics.error_count(), 1);
    insta::assert_snapshot!(
        Error::Grammar(diagnostics).to_string(),
        @"grammar compilation failed with 1 errors"
    );
}

fn compile_json_str(json: &str) -> Result<CompiledGrammar> {
    Compiler::builder().build().compile_json(json)
}
