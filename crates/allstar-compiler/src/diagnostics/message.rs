use allstar_core::grammar::Span;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// Reference errors come first: a rule that cannot be resolved makes every
/// later analysis of that rule unreliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Name resolution
    DuplicateRule,
    UndefinedRule,
    UndefinedToken,

    // Left-recursion rewrite
    NonconformingLeftRecursion,
    NoNonLeftRecursiveAlts,
    LeftRecursionCycles,

    // Closure checks on the built network
    EpsilonLeftRecursiveFollow,
    EpsilonClosure,
    EpsilonOptional,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::EpsilonOptional => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this kind suppresses `other` when both point at the same rule.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::NonconformingLeftRecursion => {
                Some("a left-recursive alternative must start with a bare self reference")
            }
            Self::NoNonLeftRecursiveAlts => Some("add a primary alternative, e.g. `e : e '+' e | INT`"),
            Self::LeftRecursionCycles => {
                Some("indirect left recursion is not rewritten; inline the called rules")
            }
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::DuplicateRule => "duplicate rule",
            Self::UndefinedRule => "undefined rule",
            Self::UndefinedToken => "undefined token",

            Self::NonconformingLeftRecursion => {
                "rule is left recursive but doesn't conform to a supported pattern"
            }
            Self::NoNonLeftRecursiveAlts => {
                "left-recursive rule must contain an alternative which is not left recursive"
            }
            Self::LeftRecursionCycles => "rules are mutually left-recursive",

            Self::EpsilonLeftRecursiveFollow => {
                "left-recursive alternative can be followed by the empty string"
            }
            Self::EpsilonClosure => "closure has an alternative that can match an empty string",
            Self::EpsilonOptional => {
                "optional block has an alternative that can match an empty string"
            }
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateRule => "rule `{}` is already defined".to_string(),
            Self::UndefinedRule => "rule `{}` is not defined".to_string(),
            Self::UndefinedToken => "token `{}` is not defined".to_string(),

            Self::NonconformingLeftRecursion => {
                "rule `{}` is left recursive but doesn't conform to a supported pattern"
                    .to_string()
            }
            Self::NoNonLeftRecursiveAlts => {
                "left-recursive rule `{}` must contain an alternative which is not left recursive"
                    .to_string()
            }
            Self::LeftRecursionCycles => {
                "the following sets of rules are mutually left-recursive {}".to_string()
            }

            Self::EpsilonLeftRecursiveFollow => {
                "left-recursive rule `{}` contains a left-recursive alternative which can be followed by the empty string".to_string()
            }
            Self::EpsilonClosure => {
                "rule `{}` contains a closure with at least one alternative that can match an empty string".to_string()
            }
            Self::EpsilonOptional => {
                "rule `{}` contains an optional block with at least one alternative that can match an empty string".to_string()
            }
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Rule the diagnostic is about, if any.
    pub(crate) rule: Option<String>,
    /// Grammar source range; absent for grammars built in code.
    pub(crate) span: Option<Span>,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, span: Option<Span>, message: impl Into<String>) -> Self {
        Self {
            kind,
            rule: None,
            span,
            message: message.into(),
            related: Vec::new(),
            hints: kind.default_hint().map(str::to_string).into_iter().collect(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self::new(kind, span, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity())?;
        if let Some(span) = self.span {
            write!(f, " at {}..{}", span.start, span.end)?;
        }
        write!(f, ": {}", self.message)?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message, related.span.start, related.span.end
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
