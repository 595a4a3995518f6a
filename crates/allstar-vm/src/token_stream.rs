//! Buffered token input.

use allstar_core::{EOF, Token, TokenType};

/// Random-access token input with lookahead and backtracking.
///
/// Offsets for [`la`](Self::la) and [`lt`](Self::lt) are 1-based: `1` is the
/// current token, `-1` the one before it. `0` is undefined.
pub trait TokenStream {
    /// Type of the token at offset `i`, [`EOF`] past the end.
    fn la(&self, i: isize) -> TokenType;

    /// Token at offset `i`. Past the end this is the EOF token; before the
    /// start it is `None`.
    fn lt(&self, i: isize) -> Option<&Token>;

    /// Index of the current token.
    fn index(&self) -> usize;

    /// Number of tokens, EOF included.
    fn size(&self) -> usize;

    /// Moves past the current token. Consuming EOF is a no-op.
    fn consume(&mut self);

    /// Moves the cursor to `index`, clamped to the EOF position.
    fn seek(&mut self, index: usize);

    /// Pins the buffer so that [`seek`](Self::seek) can return here.
    fn mark(&mut self) -> isize;

    fn release(&mut self, marker: isize);

    fn get(&self, index: usize) -> Option<&Token>;

    /// Concatenated text of the tokens in `start..=stop`, stopping at EOF.
    fn text(&self, start: usize, stop: usize) -> String;
}

/// A fully buffered token stream.
#[derive(Debug, Clone)]
pub struct VecTokenStream {
    tokens: Vec<Token>,
    p: usize,
}

impl VecTokenStream {
    /// Numbers the tokens by position and appends EOF when missing.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if tokens.last().is_none_or(|t| !t.is_eof()) {
            let (line, column) = tokens.last().map_or((1, 0), |t| {
                let width = t.text.as_deref().map_or(0, |s| s.chars().count() as u32);
                (t.line, t.column + width)
            });
            tokens.push(Token::eof().at(line, column));
        }
        for (i, token) in tokens.iter_mut().enumerate() {
            token.index = Some(i);
        }
        Self { tokens, p: 0 }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn eof_index(&self) -> usize {
        self.tokens.len() - 1
    }
}

impl TokenStream for VecTokenStream {
    fn la(&self, i: isize) -> TokenType {
        self.lt(i).map_or(EOF, |t| t.token_type)
    }

    fn lt(&self, i: isize) -> Option<&Token> {
        if i == 0 {
            return None;
        }
        if i < 0 {
            let back = i.unsigned_abs();
            return self.p.checked_sub(back).and_then(|j| self.tokens.get(j));
        }
        let j = (self.p + i as usize - 1).min(self.eof_index());
        self.tokens.get(j)
    }

    fn index(&self) -> usize {
        self.p
    }

    fn size(&self) -> usize {
        self.tokens.len()
    }

    fn consume(&mut self) {
        if self.p < self.eof_index() {
            self.p += 1;
        }
    }

    fn seek(&mut self, index: usize) {
        self.p = index.min(self.eof_index());
    }

    fn mark(&mut self) -> isize {
        -1
    }

    fn release(&mut self, _marker: isize) {}

    fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    fn text(&self, start: usize, stop: usize) -> String {
        let stop = stop.min(self.eof_index());
        if stop < start {
            return String::new();
        }
        self.tokens[start..=stop]
            .iter()
            .take_while(|t| !t.is_eof())
            .filter_map(|t| t.text.as_deref())
            .collect()
    }
}
