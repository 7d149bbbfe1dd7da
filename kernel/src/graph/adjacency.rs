//! `AdjacencyV1`: the order-preserving adjacency map.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::GraphError;

/// Mapping from node identifier to its ordered neighbor list.
///
/// Keys keep first-seen order; that order is the solver's variable order.
/// Lookups through [`AdjacencyV1::neighbors`] are total: an identifier that is
/// not a key has no neighbors.
///
/// Neighbor references are not required to resolve to keys. Use
/// [`AdjacencyV1::dangling_neighbors`] or [`AdjacencyV1::ensure_closed`] to
/// detect them at a boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyV1 {
    entries: Vec<(String, Vec<String>)>,
    /// `node -> position in entries`.
    index: HashMap<String, usize>,
}

impl AdjacencyV1 {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(node, neighbors)` entries in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if a node key repeats.
    pub fn from_entries<I>(entries: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut graph = Self::new();
        for (node, neighbors) in entries {
            graph.insert(node, neighbors)?;
        }
        Ok(graph)
    }

    /// Append a node with its neighbor list.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if `node` is already a key.
    pub fn insert(&mut self, node: String, neighbors: Vec<String>) -> Result<(), GraphError> {
        if self.index.contains_key(&node) {
            return Err(GraphError::DuplicateNode { node });
        }
        self.index.insert(node.clone(), self.entries.len());
        self.entries.push((node, neighbors));
        Ok(())
    }

    /// Node identifiers in first-seen order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(|(node, _)| node.as_str())
    }

    /// `(node, neighbors)` pairs in first-seen order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(node, neighbors)| (node.as_str(), neighbors.as_slice()))
    }

    /// Neighbor list of `node`; empty when `node` is not a key.
    #[must_use]
    pub fn neighbors(&self, node: &str) -> &[String] {
        match self.index.get(node) {
            Some(&pos) => &self.entries[pos].1,
            None => &[],
        }
    }

    /// Position of `node` in key order.
    #[must_use]
    pub fn position(&self, node: &str) -> Option<usize> {
        self.index.get(node).copied()
    }

    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    /// Number of node keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of directed neighbor entries across all lists.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.entries.iter().map(|(_, n)| n.len()).sum()
    }

    /// Every `(node, neighbor)` pair whose neighbor is not a node key, in
    /// adjacency order.
    #[must_use]
    pub fn dangling_neighbors(&self) -> Vec<(&str, &str)> {
        self.iter()
            .flat_map(|(node, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |n| !self.contains(n))
                    .map(move |n| (node, n.as_str()))
            })
            .collect()
    }

    /// Check that every neighbor reference resolves to a node key.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DanglingNeighbor`] for the first unresolved
    /// reference in adjacency order.
    pub fn ensure_closed(&self) -> Result<(), GraphError> {
        match self.dangling_neighbors().first() {
            Some(&(node, neighbor)) => Err(GraphError::DanglingNeighbor {
                node: node.to_string(),
                neighbor: neighbor.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Serialize for AdjacencyV1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (node, neighbors) in &self.entries {
            map.serialize_entry(node, neighbors)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AdjacencyV1 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AdjacencyVisitor;

        impl<'de> Visitor<'de> for AdjacencyVisitor {
            type Value = AdjacencyV1;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping node ids to neighbor id lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut graph = AdjacencyV1::new();
                while let Some((node, neighbors)) = map.next_entry::<String, Vec<String>>()? {
                    graph.insert(node, neighbors).map_err(de::Error::custom)?;
                }
                Ok(graph)
            }
        }

        deserializer.deserialize_map(AdjacencyVisitor)
    }
}
