//! Trace replay: structural integrity, re-solve verification, and per-step
//! assignment snapshots.
//!
//! [`check_integrity`] validates a trace on its own terms, without
//! re-running the search. [`replay_verify`] re-runs the search and compares
//! event by event, stopping at the first difference, so its cost is bounded
//! by the length of the trace under test.

use chroma_kernel::assignment::AssignmentV1;
use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;

use crate::error::SolveError;
use crate::event::TraceEventV1;
use crate::safety::first_conflict;
use crate::sink::{StepView, TraceSink, TraceSinkError};
use crate::solver::solve_with_sink;

/// A trace that cannot have been produced by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Event names a node that is not a graph key.
    UnknownNode { step_index: usize, node: String },
    /// Event names a color that is not in the palette.
    UnknownColor { step_index: usize, color: String },
    /// `Try` for a node other than the next unassigned node in key order.
    OutOfOrder {
        step_index: usize,
        expected: Option<String>,
        got: String,
    },
    /// `Assign` not immediately preceded by `Try` of the same node and color.
    AssignWithoutTry { step_index: usize },
    /// `Assign` of a color already held by an assigned neighbor.
    UnsafeAssign {
        step_index: usize,
        node: String,
        neighbor: String,
    },
    /// `Backtrack` of a node that is not the most recent commit.
    BacktrackWithoutAssign { step_index: usize, node: String },
    /// Event after every node was assigned.
    EventAfterSolution { step_index: usize },
}

impl std::fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode { step_index, node } => {
                write!(f, "step {step_index}: unknown node {node:?}")
            }
            Self::UnknownColor { step_index, color } => {
                write!(f, "step {step_index}: color {color:?} is not in the palette")
            }
            Self::OutOfOrder {
                step_index,
                expected,
                got,
            } => match expected {
                Some(expected) => {
                    write!(f, "step {step_index}: try on {got:?}, expected {expected:?}")
                }
                None => write!(f, "step {step_index}: try on {got:?} with no node left"),
            },
            Self::AssignWithoutTry { step_index } => {
                write!(f, "step {step_index}: assign without a matching try")
            }
            Self::UnsafeAssign {
                step_index,
                node,
                neighbor,
            } => write!(
                f,
                "step {step_index}: {node:?} assigned the color of neighbor {neighbor:?}"
            ),
            Self::BacktrackWithoutAssign { step_index, node } => {
                write!(f, "step {step_index}: backtrack on {node:?} closes no open assign")
            }
            Self::EventAfterSolution { step_index } => {
                write!(f, "step {step_index}: event after a complete assignment")
            }
        }
    }
}

impl std::error::Error for IntegrityViolation {}

/// Replay `trace` against `(graph, palette)` and return the final assignment.
///
/// Enforced:
/// - every node and color is known;
/// - `Try` targets the next unassigned node in key order;
/// - `Assign{n,c}` directly follows `Try{n,c}` and respects the safety invariant;
/// - `Backtrack{n}` retracts the most recent commit, which must be `n`;
/// - nothing follows a complete assignment.
///
/// # Errors
///
/// The first [`IntegrityViolation`] found.
pub fn check_integrity(
    graph: &AdjacencyV1,
    palette: &PaletteV1,
    trace: &[TraceEventV1],
) -> Result<AssignmentV1, IntegrityViolation> {
    let nodes: Vec<&str> = graph.nodes().collect();
    let mut assignment = AssignmentV1::new();

    for (step_index, event) in trace.iter().enumerate() {
        if !nodes.is_empty() && assignment.len() == nodes.len() {
            return Err(IntegrityViolation::EventAfterSolution { step_index });
        }
        let node = event.node();
        if !graph.contains(node) {
            return Err(IntegrityViolation::UnknownNode {
                step_index,
                node: node.to_string(),
            });
        }
        if let Some(color) = event.color() {
            if !palette.iter().any(|c| c == color) {
                return Err(IntegrityViolation::UnknownColor {
                    step_index,
                    color: color.to_string(),
                });
            }
        }

        match event {
            TraceEventV1::Try { node, .. } => {
                let expected = nodes.get(assignment.len()).copied();
                if expected != Some(node.as_str()) {
                    return Err(IntegrityViolation::OutOfOrder {
                        step_index,
                        expected: expected.map(str::to_string),
                        got: node.clone(),
                    });
                }
            }
            TraceEventV1::Assign { node, color } => {
                let preceded = step_index
                    .checked_sub(1)
                    .and_then(|i| trace.get(i))
                    .is_some_and(|prev| {
                        matches!(prev, TraceEventV1::Try { node: n, color: c } if n == node && c == color)
                    });
                if !preceded {
                    return Err(IntegrityViolation::AssignWithoutTry { step_index });
                }
                if let Some(neighbor) = first_conflict(node, color, &assignment, graph) {
                    return Err(IntegrityViolation::UnsafeAssign {
                        step_index,
                        node: node.clone(),
                        neighbor: neighbor.to_string(),
                    });
                }
                assignment.commit(node, color);
            }
            TraceEventV1::Backtrack { node } => {
                let last = assignment.iter().last().map(|(n, _)| n);
                if last != Some(node.as_str()) {
                    return Err(IntegrityViolation::BacktrackWithoutAssign {
                        step_index,
                        node: node.clone(),
                    });
                }
                assignment.retract(node);
            }
        }
    }

    Ok(assignment)
}

/// Outcome of [`replay_verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayVerdict {
    Match,
    /// First index at which the traces differ. When one trace is a prefix of
    /// the other, this is the shorter length.
    Divergence { step_index: usize },
}

/// Sink that checks each emitted event against a recorded trace and stops
/// the search at the first mismatch.
struct RecordedTrace<'t> {
    trace: &'t [TraceEventV1],
    next: usize,
}

impl TraceSink for RecordedTrace<'_> {
    fn on_step(&mut self, step: &StepView<'_>) -> Result<(), TraceSinkError> {
        let same = self.trace.get(self.next).is_some_and(|recorded| {
            recorded.kind() == step.kind
                && recorded.node() == step.node
                && recorded.color() == step.color
        });
        if !same {
            return Err(TraceSinkError::Diverged {
                step_index: self.next,
            });
        }
        self.next += 1;
        Ok(())
    }

    fn on_termination(&mut self, _success: bool) -> Result<(), TraceSinkError> {
        Ok(())
    }
}

/// Re-solve `(graph, palette)` and compare against `trace` event by event.
///
/// The search is abandoned at the first event that does not match, so at
/// most `trace.len() + 1` events are produced however hard the problem is.
#[must_use]
pub fn replay_verify(
    graph: &AdjacencyV1,
    palette: &PaletteV1,
    trace: &[TraceEventV1],
) -> ReplayVerdict {
    let mut recorded = RecordedTrace { trace, next: 0 };
    match solve_with_sink(graph, palette, &mut recorded) {
        Ok(_) if recorded.next == trace.len() => ReplayVerdict::Match,
        Ok(_) => ReplayVerdict::Divergence {
            step_index: recorded.next,
        },
        Err(SolveError::Sink(TraceSinkError::Diverged { step_index })) => {
            ReplayVerdict::Divergence { step_index }
        }
        Err(SolveError::Sink(_)) => ReplayVerdict::Divergence {
            step_index: recorded.next,
        },
    }
}

/// Total entries across all [`state_after_each_step`] snapshots, computed
/// without building them.
#[must_use]
pub fn snapshot_entry_count(trace: &[TraceEventV1]) -> usize {
    let mut depth = 0usize;
    let mut total = 0usize;
    for event in trace {
        match event {
            TraceEventV1::Assign { .. } => depth += 1,
            TraceEventV1::Backtrack { .. } => depth = depth.saturating_sub(1),
            TraceEventV1::Try { .. } => {}
        }
        total = total.saturating_add(depth);
    }
    total
}

/// Committed assignment after each event, one snapshot per event.
///
/// `Assign` commits, `Backtrack` retracts, `Try` leaves the state unchanged.
#[must_use]
pub fn state_after_each_step(trace: &[TraceEventV1]) -> Vec<AssignmentV1> {
    let mut assignment = AssignmentV1::new();
    trace
        .iter()
        .map(|event| {
            match event {
                TraceEventV1::Assign { node, color } => assignment.commit(node, color),
                TraceEventV1::Backtrack { node } => {
                    assignment.retract(node);
                }
                TraceEventV1::Try { .. } => {}
            }
            assignment.clone()
        })
        .collect()
}
