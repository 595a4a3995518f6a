//! Test helpers: a small lexer, grammar compilation and parse recording.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use logos::Logos;

use allstar_compiler::{CompiledGrammar, compile};
use allstar_core::grammar::Grammar;
use allstar_core::{Token, Vocabulary};

use crate::dfa::DfaCache;
use crate::engine::{Interpreter, InterpreterBuilder};
use crate::error::{ParseError, RecognitionError};
use crate::listener::ErrorListener;
use crate::token_stream::VecTokenStream;
use crate::tree::{ContextId, ParseTree};

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\r\n]+")]
enum Lexeme {
    #[regex(r"[A-Za-z_][A-Za-z_0-9]*")]
    Word,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[-+*/().;,=?:<>!\[\]{}]")]
    Punct,
}

/// Splits `src` into tokens of the grammar's vocabulary.
///
/// A lexeme equal to a token literal gets that token's type; other words are
/// `ID` and other numbers `INT`.
pub fn lex(vocabulary: &Vocabulary, src: &str) -> Vec<Token> {
    let mut lexer = Lexeme::lexer(src);
    let mut tokens = Vec::new();
    while let Some(lexeme) = lexer.next() {
        let text = lexer.slice();
        let lexeme = lexeme.unwrap_or_else(|()| panic!("unexpected input {text:?}"));
        let token_type = vocabulary
            .token_type(&format!("'{text}'"))
            .or_else(|| match lexeme {
                Lexeme::Word => vocabulary.token_type("ID"),
                Lexeme::Int => vocabulary.token_type("INT"),
                Lexeme::Punct => None,
            })
            .unwrap_or_else(|| panic!("no token type for {text:?}"));
        tokens.push(Token::new(token_type, text).at(1, lexer.span().start as u32));
    }
    tokens
}

/// Collects every syntax error as `line L:C message`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    messages: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl ErrorListener for Recorder {
    fn syntax_error(
        &mut self,
        _offending: &Token,
        line: u32,
        column: u32,
        message: &str,
        _error: Option<&RecognitionError>,
    ) {
        self.messages
            .borrow_mut()
            .push(format!("line {line}:{column} {message}"));
    }
}

/// A compiled grammar and the DFA cache its parses share.
pub struct Harness {
    pub grammar: CompiledGrammar,
    pub cache: Arc<DfaCache>,
}

/// Result of one parse.
pub struct Parsed {
    pub root: Result<ContextId, ParseError>,
    pub tree: ParseTree,
    pub errors: Vec<String>,
    pub syntax_errors: usize,
}

impl Parsed {
    /// `(s a b)`, or the error that ended the parse.
    pub fn render(&self) -> String {
        match &self.root {
            Ok(root) => self.tree.to_string_tree(*root),
            Err(e) => format!("error: {e}"),
        }
    }

    /// `(s:1 a b)`, or the error that ended the parse.
    pub fn render_alts(&self) -> String {
        match &self.root {
            Ok(root) => self.tree.to_string_tree_with_alts(*root),
            Err(e) => format!("error: {e}"),
        }
    }
}

impl Harness {
    pub fn new(grammar: Grammar) -> Self {
        let grammar = match compile(grammar) {
            Ok(compiled) => compiled,
            Err(e) => panic!("expected valid grammar, got: {e}"),
        };
        let cache = Arc::new(DfaCache::new(&grammar.atn));
        Self { grammar, cache }
    }

    pub fn rule(&self, name: &str) -> usize {
        self.grammar
            .rule_index(name)
            .unwrap_or_else(|| panic!("no rule `{name}`"))
    }

    pub fn tokens(&self, input: &str) -> VecTokenStream {
        VecTokenStream::new(lex(&self.grammar.vocabulary, input))
    }

    pub fn builder(&self) -> InterpreterBuilder {
        Interpreter::builder(Arc::clone(&self.grammar.atn), self.grammar.vocabulary.clone())
            .cache(Arc::clone(&self.cache))
            .remove_listeners()
    }

    pub fn parse(&self, start: &str, input: &str) -> Parsed {
        self.parse_configured(start, input, |b| b)
    }

    /// Parses with a recording listener attached after `configure` ran.
    pub fn parse_configured(
        &self,
        start: &str,
        input: &str,
        configure: impl FnOnce(InterpreterBuilder) -> InterpreterBuilder,
    ) -> Parsed {
        let mut tokens = self.tokens(input);
        let recorder = Recorder::default();
        let builder = configure(self.builder()).listener(recorder.clone());
        let mut parser = builder.build(&mut tokens);
        let root = parser.parse(self.rule(start));
        let syntax_errors = parser.syntax_errors();
        let tree = parser.take_tree();
        Parsed {
            root,
            tree,
            errors: recorder.take(),
            syntax_errors,
        }
    }
}
