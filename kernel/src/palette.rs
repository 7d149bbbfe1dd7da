//! Ordered color palette.

use serde::{Deserialize, Serialize};

/// Ordered sequence of opaque color labels.
///
/// Order is the try-order at every node. Duplicate labels are legal; two
/// equal labels are the same color for conflict purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteV1(Vec<String>);

impl PaletteV1 {
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Label at `index` in try-order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels that occur more than once, each reported once, in first-repeat order.
    #[must_use]
    pub fn duplicate_labels(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for label in self.iter() {
            if !seen.insert(label) && !dups.contains(&label) {
                dups.push(label);
            }
        }
        dups
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for PaletteV1 {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
