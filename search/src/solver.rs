//! Depth-first backtracking over graph key order.
//!
//! The search assigns nodes in key order and tries palette colors in palette
//! order. Each attempt emits `Try`; a safe attempt commits and emits
//! `Assign`; a committed color whose subtree fails is withdrawn with
//! `Backtrack`. The first complete assignment ends the search.
//!
//! The recursion is carried on an explicit stack of [`Frame`]s, one per
//! node currently on the search path, so depth is bounded by memory rather
//! than by the call stack. The event sequence is the same one a recursive
//! formulation produces.

use chroma_kernel::assignment::AssignmentV1;
use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;

use crate::error::SolveError;
use crate::event::{TraceEventKind, TraceEventV1};
use crate::safety::is_safe;
use crate::sink::{StepView, TraceLog, TraceSink};

/// Complete result of [`solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub success: bool,
    /// Complete and consistent on success, empty otherwise.
    pub assignment: AssignmentV1,
    pub trace: Vec<TraceEventV1>,
    pub stats: SolveStats,
}

/// Result of [`solve_with_sink`]; the trace went to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub success: bool,
    pub assignment: AssignmentV1,
    pub stats: SolveStats,
}

/// Event counters for one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub tries: u64,
    pub assigns: u64,
    pub backtracks: u64,
    /// Deepest search path, in nodes.
    pub max_depth: usize,
}

impl SolveStats {
    /// Total number of events emitted.
    #[must_use]
    pub fn events(&self) -> u64 {
        self.tries + self.assigns + self.backtracks
    }
}

/// Per-node search state.
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    /// Next palette index to try at this node.
    next_color: usize,
    /// Whether this node currently holds a committed color.
    committed: bool,
}

/// Solve `(graph, palette)`, recording the full trace in memory.
#[must_use]
pub fn solve(graph: &AdjacencyV1, palette: &PaletteV1) -> SolveResult {
    let mut log = TraceLog::new();
    match solve_with_sink(graph, palette, &mut log) {
        Ok(outcome) => SolveResult {
            success: outcome.success,
            assignment: outcome.assignment,
            trace: log.into_events(),
            stats: outcome.stats,
        },
        Err(e) => unreachable!("TraceLog never refuses events: {e}"),
    }
}

/// Solve `(graph, palette)`, streaming every event to `sink`.
///
/// # Errors
///
/// [`SolveError::Sink`] if the sink refuses an event or the termination.
/// The search stops at the refused event.
pub fn solve_with_sink(
    graph: &AdjacencyV1,
    palette: &PaletteV1,
    sink: &mut dyn TraceSink,
) -> Result<SolveOutcome, SolveError> {
    let nodes: Vec<&str> = graph.nodes().collect();
    let mut assignment = AssignmentV1::new();
    let mut stats = SolveStats::default();

    let success = search(graph, palette, &nodes, &mut assignment, &mut stats, sink)?;
    sink.on_termination(success)?;

    if !success {
        assignment.clear();
    }
    Ok(SolveOutcome {
        success,
        assignment,
        stats,
    })
}

fn search(
    graph: &AdjacencyV1,
    palette: &PaletteV1,
    nodes: &[&str],
    assignment: &mut AssignmentV1,
    stats: &mut SolveStats,
    sink: &mut dyn TraceSink,
) -> Result<bool, SolveError> {
    if nodes.is_empty() {
        return Ok(true);
    }

    let mut stack: Vec<Frame> = vec![Frame::default()];
    stats.max_depth = 1;

    loop {
        let depth = stack.len() - 1;
        let node = nodes[depth];
        let Some(frame) = stack.last_mut() else {
            return Ok(false);
        };

        // Returning here with a committed color means the subtree below failed.
        if frame.committed {
            frame.committed = false;
            assignment.retract(node);
            stats.backtracks += 1;
            sink.on_step(&StepView {
                kind: TraceEventKind::Backtrack,
                node_index: depth,
                node,
                color_index: None,
                color: None,
                assignment,
            })?;
        }

        let color_index = frame.next_color;
        let Some(color) = palette.get(color_index) else {
            // Palette exhausted: this node fails, the parent resumes.
            stack.pop();
            if stack.is_empty() {
                return Ok(false);
            }
            continue;
        };
        frame.next_color += 1;

        stats.tries += 1;
        sink.on_step(&StepView {
            kind: TraceEventKind::Try,
            node_index: depth,
            node,
            color_index: Some(color_index),
            color: Some(color),
            assignment,
        })?;

        if !is_safe(node, color, assignment, graph) {
            continue;
        }

        assignment.commit(node, color);
        frame.committed = true;
        stats.assigns += 1;
        sink.on_step(&StepView {
            kind: TraceEventKind::Assign,
            node_index: depth,
            node,
            color_index: Some(color_index),
            color: Some(color),
            assignment,
        })?;

        if depth + 1 == nodes.len() {
            return Ok(true);
        }
        stack.push(Frame::default());
        stats.max_depth = stats.max_depth.max(stack.len());
    }
}
