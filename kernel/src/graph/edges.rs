//! Building a symmetric adjacency from an undirected edge list.

use std::collections::HashSet;

use super::{AdjacencyV1, GraphError};

/// Build a symmetric adjacency from declared nodes and undirected edges.
///
/// Every declared node becomes a key (in declaration order) even when it has
/// no edges. Each edge `(a, b)` appends `b` to `a`'s list and `a` to `b`'s
/// list unless already present, so repeated or reversed edges are harmless.
/// A self-edge `(a, a)` lists `a` once as its own neighbor.
///
/// # Errors
///
/// - [`GraphError::DuplicateNode`] if a node is declared twice.
/// - [`GraphError::UnknownEndpoint`] if an edge endpoint was not declared.
pub fn from_edges<N, E>(nodes: N, edges: E) -> Result<AdjacencyV1, GraphError>
where
    N: IntoIterator<Item = String>,
    E: IntoIterator<Item = (String, String)>,
{
    let nodes: Vec<String> = nodes.into_iter().collect();
    let mut lists: Vec<Vec<String>> = vec![Vec::new(); nodes.len()];
    let mut seen: Vec<HashSet<String>> = vec![HashSet::new(); nodes.len()];

    let mut declared = AdjacencyV1::new();
    for node in &nodes {
        declared.insert(node.clone(), Vec::new())?;
    }

    for (a, b) in edges {
        let pa = declared
            .position(&a)
            .ok_or_else(|| GraphError::UnknownEndpoint { endpoint: a.clone() })?;
        let pb = declared
            .position(&b)
            .ok_or_else(|| GraphError::UnknownEndpoint { endpoint: b.clone() })?;
        if seen[pa].insert(b.clone()) {
            lists[pa].push(b);
        }
        if seen[pb].insert(a.clone()) {
            lists[pb].push(a);
        }
    }

    AdjacencyV1::from_entries(nodes.into_iter().zip(lists))
}

impl AdjacencyV1 {
    /// See [`from_edges`].
    ///
    /// # Errors
    ///
    /// Same as [`from_edges`].
    pub fn from_edges<N, E>(nodes: N, edges: E) -> Result<Self, GraphError>
    where
        N: IntoIterator<Item = String>,
        E: IntoIterator<Item = (String, String)>,
    {
        from_edges(nodes, edges)
    }
}
