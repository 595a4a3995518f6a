//! Sets of token types stored as sorted, disjoint, inclusive intervals.

use std::fmt;

use crate::token::{EOF, EPSILON, TokenType};
use crate::vocabulary::Vocabulary;

/// Inclusive `[start, end]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: TokenType,
    pub end: TokenType,
}

impl Interval {
    pub fn new(start: TokenType, end: TokenType) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Sorted, non-overlapping, non-adjacent intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(element: TokenType) -> Self {
        Self::of_range(element, element)
    }

    pub fn of_range(start: TokenType, end: TokenType) -> Self {
        let mut set = Self::new();
        set.add_range(start, end);
        set
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of elements (not intervals).
    pub fn len(&self) -> usize {
        self.intervals.iter().map(Interval::len).sum()
    }

    pub fn add(&mut self, element: TokenType) {
        self.add_range(element, element);
    }

    pub fn add_range(&mut self, start: TokenType, end: TokenType) {
        if end < start {
            return;
        }
        let mut merged = Interval::new(start, end);
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        let mut placed = false;
        for &iv in &self.intervals {
            // Adjacent intervals are merged as well.
            if iv.end.saturating_add(1) < merged.start {
                out.push(iv);
            } else if merged.end.saturating_add(1) < iv.start {
                if !placed {
                    out.push(merged);
                    placed = true;
                }
                out.push(iv);
            } else {
                merged = Interval::new(merged.start.min(iv.start), merged.end.max(iv.end));
            }
        }
        if !placed {
            out.push(merged);
        }
        self.intervals = out;
    }

    pub fn add_all(&mut self, other: &IntervalSet) {
        for iv in &other.intervals {
            self.add_range(iv.start, iv.end);
        }
    }

    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = self.clone();
        result.add_all(other);
        result
    }

    pub fn remove(&mut self, element: TokenType) {
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        for &iv in &self.intervals {
            if element < iv.start || element > iv.end {
                out.push(iv);
                continue;
            }
            if iv.start < element {
                out.push(Interval::new(iv.start, element - 1));
            }
            if element < iv.end {
                out.push(Interval::new(element + 1, iv.end));
            }
        }
        self.intervals = out;
    }

    pub fn contains(&self, element: TokenType) -> bool {
        self.intervals
            .binary_search_by(|iv| {
                if iv.end < element {
                    std::cmp::Ordering::Less
                } else if iv.start > element {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn min_element(&self) -> Option<TokenType> {
        self.intervals.first().map(|iv| iv.start)
    }

    /// Elements of `[min, max]` that are not in this set.
    pub fn complement(&self, min: TokenType, max: TokenType) -> IntervalSet {
        let mut result = IntervalSet::of_range(min, max);
        for iv in &self.intervals {
            let mut next = Vec::new();
            for &r in &result.intervals {
                if iv.end < r.start || iv.start > r.end {
                    next.push(r);
                    continue;
                }
                if r.start < iv.start {
                    next.push(Interval::new(r.start, iv.start - 1));
                }
                if iv.end < r.end {
                    next.push(Interval::new(iv.end + 1, r.end));
                }
            }
            result.intervals = next;
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.intervals.iter().flat_map(|iv| iv.start..=iv.end)
    }

    /// Renders elements with vocabulary names: `A` or `{A, B}`.
    pub fn to_string_with(&self, vocabulary: &Vocabulary) -> String {
        if self.is_empty() {
            return "{}".to_string();
        }
        let names: Vec<String> = self
            .iter()
            .map(|t| match t {
                EOF => "<EOF>".to_string(),
                EPSILON => "<EPSILON>".to_string(),
                _ => vocabulary.display_name(t),
            })
            .collect();
        if names.len() == 1 {
            return names.into_iter().next().unwrap_or_default();
        }
        format!("{{{}}}", names.join(", "))
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|iv| {
                let name = |t: TokenType| {
                    if t == EOF {
                        "<EOF>".to_string()
                    } else {
                        t.to_string()
                    }
                };
                if iv.start == iv.end {
                    name(iv.start)
                } else {
                    format!("{}..{}", name(iv.start), name(iv.end))
                }
            })
            .collect();
        if self.len() > 1 {
            write!(f, "{{{}}}", parts.join(", "))
        } else {
            write!(f, "{}", parts[0])
        }
    }
}

impl FromIterator<TokenType> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = TokenType>>(iter: I) -> Self {
        let mut set = IntervalSet::new();
        for t in iter {
            set.add(t);
        }
        set
    }
}
