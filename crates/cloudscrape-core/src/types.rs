//! Dimension types shared by discovery, fetch and sample assembly.

use std::fmt;

/// A single CloudWatch dimension: a name bound to a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One concrete series under a rule, as an ordered list of dimensions.
///
/// An empty set is valid and stands for a metric queried without any
/// dimension breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DimensionSet(Vec<Dimension>);

impl DimensionSet {
    /// The set used for rules that declare no dimensions.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Dimension] {
        &self.0
    }
}

impl From<Vec<Dimension>> for DimensionSet {
    fn from(dimensions: Vec<Dimension>) -> Self {
        Self(dimensions)
    }
}

impl FromIterator<Dimension> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DimensionSet {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", d.name, d.value)?;
        }
        f.write_str("}")
    }
}
