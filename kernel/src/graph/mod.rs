//! Graph model: ordered adjacency lists keyed by node identifier.
//!
//! Node order is the order keys were first seen. It fixes the search order
//! of the solver, so it is part of the problem identity (see
//! [`crate::proof::digest`]).

pub mod adjacency;
pub mod edges;

pub use adjacency::AdjacencyV1;

/// Typed failure for graph construction and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node key appeared twice while building the adjacency.
    DuplicateNode { node: String },
    /// A neighbor reference does not resolve to any node key.
    DanglingNeighbor { node: String, neighbor: String },
    /// An edge endpoint was not declared as a node.
    UnknownEndpoint { endpoint: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNode { node } => write!(f, "duplicate node key: {node:?}"),
            Self::DanglingNeighbor { node, neighbor } => {
                write!(f, "node {node:?} lists unknown neighbor {neighbor:?}")
            }
            Self::UnknownEndpoint { endpoint } => {
                write!(f, "edge endpoint {endpoint:?} is not a declared node")
            }
        }
    }
}

impl std::error::Error for GraphError {}
