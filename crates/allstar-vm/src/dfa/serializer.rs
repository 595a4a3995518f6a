//! Text rendering of a DFA, one edge per line: `s0-ID->:s1=>2`.
//!
//! A precedence DFA first lists its start state for each precedence seen so
//! far, as `prec 0: s0`.

use std::fmt::Write;

use allstar_core::{TokenType, Vocabulary};

use super::{Dfa, DfaState, Edge};

impl Dfa {
    /// Renders the DFA with token names from `vocabulary`.
    pub fn to_display_string(&self, vocabulary: &Vocabulary) -> String {
        self.render(|symbol| vocabulary.display_name(symbol))
    }

    /// Renders the DFA with edges labeled as characters, for DFAs over
    /// character input.
    pub fn to_lexer_string(&self) -> String {
        self.render(|symbol| match u32::try_from(symbol).ok().and_then(char::from_u32) {
            Some(c) => format!("'{c}'"),
            None => symbol.to_string(),
        })
    }

    fn render(&self, label: impl Fn(TokenType) -> String) -> String {
        let states = self.states();
        let mut out = String::new();
        for (precedence, start) in self.precedence_start_states() {
            let _ = writeln!(out, "prec {precedence}: s{start}");
        }
        for s in &states {
            for (symbol, edge) in s.edges() {
                let Edge::Target(t) = edge else {
                    continue;
                };
                let Some(target) = states.get(t) else {
                    continue;
                };
                let _ = writeln!(
                    out,
                    "{}-{}->{}",
                    state_string(s),
                    label(symbol),
                    state_string(target)
                );
            }
        }
        out
    }
}

fn state_string(s: &DfaState) -> String {
    let mut out = String::new();
    if s.is_accept {
        out.push(':');
    }
    let _ = write!(out, "s{}", s.number);
    if s.requires_full_context() {
        out.push('^');
    }
    if s.is_accept {
        match (&s.predicates, s.prediction) {
            (Some(preds), _) => {
                let preds: Vec<String> = preds.iter().map(ToString::to_string).collect();
                let _ = write!(out, "=>[{}]", preds.join(", "));
            }
            (None, Some(alt)) => {
                let _ = write!(out, "=>{alt}");
            }
            (None, None) => {}
        }
    }
    out
}
