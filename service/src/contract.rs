//! Wire contract for `POST /api/solve`.
//!
//! ```text
//! request:  { "adjacency": {node: [neighbor...]}, "colors": [label...], "include_state"?: bool }
//! response: { "status": "solved"|"impossible", "solution": {node: label} | null,
//!             "steps": [{ "type", "node", "color", "current_state"? }] }
//! ```
//!
//! `steps` is the full search trace in emission order. `color` is `null` on
//! backtrack steps. `current_state` is the committed assignment after the
//! step and appears only when the request sets `include_state`.

use serde::{Deserialize, Serialize};

use chroma_kernel::assignment::AssignmentV1;
use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use chroma_kernel::proof::canon::{canonical_bytes_of, CanonError};
use chroma_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use chroma_search::event::TraceEventV1;
use chroma_search::replay::state_after_each_step;

/// A coloring problem as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequestV1 {
    pub adjacency: AdjacencyV1,
    pub colors: PaletteV1,
    #[serde(default)]
    pub include_state: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Solved,
    Impossible,
}

impl SolveStatus {
    #[must_use]
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Solved
        } else {
            Self::Impossible
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solved => "solved",
            Self::Impossible => "impossible",
        }
    }
}

/// One trace event on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepV1 {
    #[serde(flatten)]
    pub event: TraceEventV1,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<AssignmentV1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveResponseV1 {
    pub status: SolveStatus,
    /// Complete assignment in node order; `None` when impossible.
    pub solution: Option<AssignmentV1>,
    pub steps: Vec<StepV1>,
}

impl SolveResponseV1 {
    /// Assemble a response from a finished search.
    ///
    /// A failed search always reports `solution: null`, whatever
    /// `assignment` holds.
    #[must_use]
    pub fn from_trace(
        success: bool,
        assignment: AssignmentV1,
        trace: Vec<TraceEventV1>,
        include_state: bool,
    ) -> Self {
        let steps = if include_state {
            let states = state_after_each_step(&trace);
            trace
                .into_iter()
                .zip(states)
                .map(|(event, state)| StepV1 {
                    event,
                    current_state: Some(state),
                })
                .collect()
        } else {
            trace
                .into_iter()
                .map(|event| StepV1 {
                    event,
                    current_state: None,
                })
                .collect()
        };
        Self {
            status: SolveStatus::from_success(success),
            solution: success.then_some(assignment),
            steps,
        }
    }

    /// Content hash of the response in canonical JSON form.
    ///
    /// Two responses with the same digest carry the same status, solution,
    /// and steps.
    ///
    /// # Errors
    ///
    /// [`CanonError`] if the response cannot be canonicalized.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_bytes_of(self)?;
        Ok(canonical_hash(HashDomain::Response, &bytes))
    }
}
