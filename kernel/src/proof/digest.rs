//! Problem identity.
//!
//! A problem is the pair `(graph, palette)` with both orders significant.
//! Its canonical form is
//!
//! ```text
//! {"nodes":[[node,[neighbor,...]],...],"palette":[label,...]}
//! ```
//!
//! Nodes are an array of pairs rather than an object so that key order,
//! which drives the search, survives canonicalization.

use serde_json::{json, Value};

use super::canon::canonical_json_bytes;
use super::hash::{canonical_hash, ContentHash, HashDomain};
use crate::graph::AdjacencyV1;
use crate::palette::PaletteV1;

/// Canonical JSON value of a problem.
#[must_use]
pub fn problem_value(graph: &AdjacencyV1, palette: &PaletteV1) -> Value {
    let nodes: Vec<Value> = graph
        .iter()
        .map(|(node, neighbors)| json!([node, neighbors]))
        .collect();
    json!({
        "nodes": nodes,
        "palette": palette.as_slice(),
    })
}

/// Canonical bytes of a problem.
#[must_use]
pub fn problem_bytes(graph: &AdjacencyV1, palette: &PaletteV1) -> Vec<u8> {
    // Only strings and arrays: canonicalization cannot fail.
    canonical_json_bytes(&problem_value(graph, palette)).unwrap_or_default()
}

/// Domain-separated digest identifying a `(graph, palette)` problem.
#[must_use]
pub fn problem_digest(graph: &AdjacencyV1, palette: &PaletteV1) -> ContentHash {
    canonical_hash(HashDomain::Problem, &problem_bytes(graph, palette))
}
