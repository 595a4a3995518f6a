use std::collections::BTreeSet;
use std::fmt;

/// Set of alternative numbers, ordered. Alternatives are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AltSet(BTreeSet<usize>);

impl AltSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(alt: usize) -> Self {
        Self(BTreeSet::from([alt]))
    }

    pub fn insert(&mut self, alt: usize) {
        self.0.insert(alt);
    }

    pub fn contains(&self, alt: usize) -> bool {
        self.0.contains(&alt)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<usize> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn union_with(&mut self, other: &AltSet) {
        self.0.extend(other.iter());
    }
}

impl FromIterator<usize> for AltSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for AltSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, alt) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{alt}")?;
        }
        write!(f, "}}")
    }
}
