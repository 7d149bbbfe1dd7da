//! Commit-ordered partial coloring.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Mapping from node to committed color, iterated in commit order.
///
/// The solver commits and retracts in stack order, so on success the commit
/// order equals the graph's key order. Retracting a node that is not the most
/// recent commit is supported but costs a reindex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentV1 {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AssignmentV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `color` to `node`, replacing any previous color in place.
    pub fn commit(&mut self, node: &str, color: &str) {
        if let Some(&pos) = self.index.get(node) {
            self.entries[pos].1 = color.to_string();
            return;
        }
        self.index.insert(node.to_string(), self.entries.len());
        self.entries.push((node.to_string(), color.to_string()));
    }

    /// Remove `node`, returning the color it held.
    pub fn retract(&mut self, node: &str) -> Option<String> {
        let pos = self.index.remove(node)?;
        let (_, color) = self.entries.remove(pos);
        if pos < self.entries.len() {
            for (i, (n, _)) in self.entries.iter().enumerate().skip(pos) {
                self.index.insert(n.clone(), i);
            }
        }
        Some(color)
    }

    #[must_use]
    pub fn color_of(&self, node: &str) -> Option<&str> {
        self.index
            .get(node)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(node, color)` pairs in commit order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl Serialize for AssignmentV1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (node, color) in &self.entries {
            map.serialize_entry(node, color)?;
        }
        map.end()
    }
}
