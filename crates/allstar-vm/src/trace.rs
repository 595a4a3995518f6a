//! Tracing infrastructure for debugging interpretation.
//!
//! The tracer is a zero-cost abstraction: with [`NoopTracer`] every hook is
//! an empty `#[inline(always)]` function and the calls compile away.
//! Display-only state, such as the stack of rule names used to label exits,
//! lives in the tracer rather than in the interpreter.

use allstar_core::atn::{Atn, AtnState, StateId};
use allstar_core::{Colors, Token, Vocabulary};

use crate::error::RecognitionError;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Rule entry and exit, matched tokens, predictions and errors.
    #[default]
    Default,
    /// Also DFA cache hits, DFA misses and full-context retries.
    Verbose,
    /// Also every ATN state visited.
    VeryVerbose,
}

/// How a prediction was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionSource {
    /// Forced by a decision override.
    Override,
    /// SLL prediction, from the DFA or freshly simulated.
    Sll,
    /// Full-context LL prediction.
    Ll,
}

/// Interpreter instrumentation.
///
/// Methods receive raw ids; names are resolved by the implementation.
pub trait Tracer {
    /// Called before the interpreter handles an ATN state.
    fn trace_state(&mut self, state: &AtnState);

    /// Called when a rule is entered at its start state.
    fn trace_enter_rule(&mut self, rule_index: usize, state: StateId);

    /// Called when a rule returns to its caller.
    fn trace_exit_rule(&mut self, rule_index: usize);

    /// Called after a token was matched and consumed.
    fn trace_match(&mut self, token: &Token);

    /// Called when adaptive prediction starts for `decision`.
    fn trace_predict_start(&mut self, decision: usize, input_index: usize);

    /// Called when prediction follows a cached DFA edge.
    fn trace_dfa_hit(&mut self, decision: usize, from: usize, to: Option<usize>);

    /// Called when prediction computes and caches a new DFA edge.
    fn trace_dfa_miss(&mut self, decision: usize, from: usize, to: Option<usize>);

    /// Called when SLL conflicted and full-context prediction starts.
    fn trace_full_context(&mut self, decision: usize);

    /// Called when a decision has been resolved.
    fn trace_prediction(&mut self, decision: usize, alt: usize, source: PredictionSource);

    /// Called when a recognition error is about to be recovered from.
    fn trace_error(&mut self, error: &RecognitionError);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_state(&mut self, _state: &AtnState) {}

    #[inline(always)]
    fn trace_enter_rule(&mut self, _rule_index: usize, _state: StateId) {}

    #[inline(always)]
    fn trace_exit_rule(&mut self, _rule_index: usize) {}

    #[inline(always)]
    fn trace_match(&mut self, _token: &Token) {}

    #[inline(always)]
    fn trace_predict_start(&mut self, _decision: usize, _input_index: usize) {}

    #[inline(always)]
    fn trace_dfa_hit(&mut self, _decision: usize, _from: usize, _to: Option<usize>) {}

    #[inline(always)]
    fn trace_dfa_miss(&mut self, _decision: usize, _from: usize, _to: Option<usize>) {}

    #[inline(always)]
    fn trace_full_context(&mut self, _decision: usize) {}

    #[inline(always)]
    fn trace_prediction(&mut self, _decision: usize, _alt: usize, _source: PredictionSource) {}

    #[inline(always)]
    fn trace_error(&mut self, _error: &RecognitionError) {}
}

/// Tracer that collects lines for printing.
pub struct PrintTracer {
    verbosity: Verbosity,
    lines: Vec<String>,
    rule_names: Vec<String>,
    vocabulary: Vocabulary,
    /// Parallel stack of entered rules, for indentation.
    depth: usize,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(atn: &Atn, vocabulary: &Vocabulary, verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            verbosity,
            lines: Vec::new(),
            rule_names: atn.rule_names.clone(),
            vocabulary: vocabulary.clone(),
            depth: 0,
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn rule_name(&self, rule_index: usize) -> &str {
        self.rule_names
            .get(rule_index)
            .map_or("?", String::as_str)
    }

    fn push(&mut self, symbol: &str, content: String) {
        let indent = "  ".repeat(self.depth);
        self.lines.push(format!("{indent}{symbol} {content}"));
    }
}

impl Tracer for PrintTracer {
    fn trace_state(&mut self, state: &AtnState) {
        if self.verbosity != Verbosity::VeryVerbose {
            return;
        }
        let c = self.colors;
        let content = format!("{}{}{} {}", c.dim, state.number, c.reset, state.kind_name());
        self.push(".", content);
    }

    fn trace_enter_rule(&mut self, rule_index: usize, state: StateId) {
        let c = self.colors;
        let name = c.paint(c.blue, self.rule_name(rule_index));
        let content = format!("{name} {}@{state}{}", c.dim, c.reset);
        self.push(">", content);
        self.depth += 1;
    }

    fn trace_exit_rule(&mut self, rule_index: usize) {
        self.depth = self.depth.saturating_sub(1);
        let c = self.colors;
        let name = c.paint(c.blue, self.rule_name(rule_index));
        self.push("<", name);
    }

    fn trace_match(&mut self, token: &Token) {
        let c = self.colors;
        let content = format!(
            "{} {}",
            self.vocabulary.display_name(token.token_type),
            c.paint(c.green, &token.error_display())
        );
        self.push("=", content);
    }

    fn trace_predict_start(&mut self, decision: usize, input_index: usize) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let c = self.colors;
        let content = format!("{}d{decision}{} at {input_index}", c.blue, c.reset);
        self.push("?", content);
    }

    fn trace_dfa_hit(&mut self, decision: usize, from: usize, to: Option<usize>) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let target = to.map_or("error".to_string(), |t| format!("s{t}"));
        self.push(" ", format!("d{decision} s{from} -> {target} (cached)"));
    }

    fn trace_dfa_miss(&mut self, decision: usize, from: usize, to: Option<usize>) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let target = to.map_or("error".to_string(), |t| format!("s{t}"));
        self.push(" ", format!("d{decision} s{from} -> {target}"));
    }

    fn trace_full_context(&mut self, decision: usize) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.push(" ", format!("d{decision} full context"));
    }

    fn trace_prediction(&mut self, decision: usize, alt: usize, source: PredictionSource) {
        let c = self.colors;
        let how = match source {
            PredictionSource::Override => "override",
            PredictionSource::Sll => "sll",
            PredictionSource::Ll => "ll",
        };
        let content = format!("{}d{decision}{} => {alt} {}({how}){}", c.blue, c.reset, c.dim, c.reset);
        self.push("?", content);
    }

    fn trace_error(&mut self, error: &RecognitionError) {
        let c = self.colors;
        self.push("!", c.paint(c.red, &error.to_string()));
    }
}
