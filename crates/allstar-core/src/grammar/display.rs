//! Grammar notation rendering, used for dumps and test snapshots.

use std::fmt;

use super::types::{Alternative, Assoc, Element, Grammar, Quantifier, Rule};

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : ", self.name)?;
        write_alternatives(f, &self.alternatives)?;
        write!(f, " ;")
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assoc == Assoc::Right {
            write!(f, "<assoc=right> ")?;
        }
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{element}")?;
        }
        if let Some(label) = &self.label {
            write!(f, " # {label}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Token { name, label } => {
                if let Some(label) = label {
                    write!(f, "{label}=")?;
                }
                write!(f, "{name}")
            }
            Element::Rule {
                name,
                label,
                args,
                precedence,
            } => {
                if let Some(label) = label {
                    write!(f, "{label}=")?;
                }
                write!(f, "{name}")?;
                match (precedence, args) {
                    (Some(p), _) => write!(f, "[{p}]"),
                    (None, Some(args)) => write!(f, "[{args}]"),
                    (None, None) => Ok(()),
                }
            }
            Element::Wildcard => write!(f, "."),
            Element::Set { names } => write!(f, "({})", names.join(" | ")),
            Element::NotSet { names } => write!(f, "~({})", names.join(" | ")),
            Element::Block {
                alternatives,
                quantifier,
            } => {
                write!(f, "( ")?;
                write_alternatives(f, alternatives)?;
                write!(f, " )")?;
                match quantifier {
                    Quantifier::One => Ok(()),
                    Quantifier::Optional => write!(f, "?"),
                    Quantifier::Star => write!(f, "*"),
                    Quantifier::Plus => write!(f, "+"),
                }
            }
            Element::Action { index } => write!(f, "{{action {index}}}"),
            Element::Predicate { index, .. } => write!(f, "{{pred {index}}}?"),
            Element::PrecedencePredicate { precedence } => write!(f, "{{precpred {precedence}}}?"),
        }
    }
}

fn write_alternatives(f: &mut fmt::Formatter<'_>, alternatives: &[Alternative]) -> fmt::Result {
    for (i, alt) in alternatives.iter().enumerate() {
        if i > 0 {
            write!(f, " | ")?;
        }
        write!(f, "{alt}")?;
    }
    Ok(())
}
