//! The one constraint check of the search.

use chroma_kernel::assignment::AssignmentV1;
use chroma_kernel::graph::AdjacencyV1;

/// Whether `color` may be committed to `node` under `assignment`.
///
/// False iff some neighbor of `node` is already assigned a label equal to
/// `color`. Unassigned and dangling neighbors never conflict. A node listed
/// as its own neighbor is never assigned while it is being checked, so
/// self-loops are harmless.
#[must_use]
pub fn is_safe(node: &str, color: &str, assignment: &AssignmentV1, graph: &AdjacencyV1) -> bool {
    graph
        .neighbors(node)
        .iter()
        .all(|neighbor| assignment.color_of(neighbor) != Some(color))
}

/// The first neighbor of `node` whose color equals `color`, if any.
#[must_use]
pub fn first_conflict<'g>(
    node: &str,
    color: &str,
    assignment: &AssignmentV1,
    graph: &'g AdjacencyV1,
) -> Option<&'g str> {
    graph
        .neighbors(node)
        .iter()
        .find(|neighbor| assignment.color_of(neighbor) == Some(color))
        .map(String::as_str)
}
