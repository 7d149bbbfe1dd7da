//! Chroma Search: deterministic backtracking graph coloring with an auditable
//! trace.
//!
//! This crate depends only on `chroma_kernel`. It performs no I/O and does
//! not log; the service crate owns both.
//!
//! # Crate dependency graph
//!
//! ```text
//! chroma_kernel  ←  chroma_search  ←  chroma_service
//! (model, hashing)   (solver, tape)    (HTTP, CLI, config)
//! ```
//!
//! # Key items
//!
//! - [`solver::solve`] / [`solver::solve_with_sink`] -- the search
//! - [`safety::is_safe`] -- the neighbor constraint check
//! - [`event::TraceEventV1`] -- one search decision
//! - [`sink::TraceSink`] -- event receivers (`TraceLog`, `BoundedTraceLog`, `TapeWriter`)
//! - [`tape_reader::read_tape`] / [`tape_render::render_trace`] -- binary trace tape
//! - [`replay`] -- integrity checks and re-solve verification

#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod replay;
pub mod safety;
pub mod sink;
pub mod solver;
pub mod tape;
pub mod tape_reader;
pub mod tape_render;
pub mod tape_writer;

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;

use crate::error::SolveError;
use crate::sink::{TeeSink, TraceLog, TraceSinkError};
use crate::solver::{solve_with_sink, SolveResult};
use crate::tape::TapeOutput;
use crate::tape_writer::TapeWriter;

/// Solve and record both the in-memory trace and a binary tape.
///
/// # Errors
///
/// [`SolveError::Sink`] if the tape writer fails.
pub fn solve_with_tape(
    graph: &AdjacencyV1,
    palette: &PaletteV1,
) -> Result<(SolveResult, TapeOutput), SolveError> {
    let mut writer = TapeWriter::for_problem(graph, palette).map_err(TraceSinkError::from)?;
    let mut log = TraceLog::new();
    let outcome = {
        let mut tee = TeeSink::new(&mut log, &mut writer);
        solve_with_sink(graph, palette, &mut tee)?
    };
    let tape = writer.finish().map_err(TraceSinkError::from)?;
    Ok((
        SolveResult {
            success: outcome.success,
            assignment: outcome.assignment,
            trace: log.into_events(),
            stats: outcome.stats,
        },
        tape,
    ))
}
