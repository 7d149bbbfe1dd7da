//! Solve runner: validates a request, runs the search, builds the response.
//!
//! The runner is synchronous and owns all logging for a solve. The HTTP
//! server and the CLI both call into it.
//!
//! # Pipeline
//!
//! ```text
//! validate() → solve_with_sink(BoundedTraceLog [+ TapeWriter])
//!   → SolveResponseV1::from_trace() → summary event
//! ```

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use chroma_kernel::assignment::AssignmentV1;
use chroma_kernel::proof::digest::problem_digest;
use chroma_search::replay::{check_integrity, replay_verify, snapshot_entry_count, ReplayVerdict};
use chroma_search::sink::{BoundedTraceLog, TeeSink};
use chroma_search::solver::{solve_with_sink, SolveOutcome};
use chroma_search::tape::TapeOutput;
use chroma_search::tape_reader::read_tape;
use chroma_search::tape_render::render_trace;
use chroma_search::tape_writer::TapeWriter;

use crate::config::ServerConfig;
use crate::contract::{SolveRequestV1, SolveResponseV1, SolveStatus};
use crate::error::ServiceError;

/// Check a request against the configured limits.
///
/// Duplicate palette labels are accepted with a warning: equal labels are
/// the same color, so the later duplicates can never succeed where the
/// first failed.
///
/// # Errors
///
/// - [`ServiceError::TooManyNodes`] / [`ServiceError::TooManyColors`] past the limits.
/// - [`ServiceError::InvalidGraph`] for a dangling neighbor, unless allowed.
pub fn validate(request: &SolveRequestV1, config: &ServerConfig) -> Result<(), ServiceError> {
    let nodes = request.adjacency.len();
    if nodes > config.max_nodes {
        return Err(ServiceError::TooManyNodes {
            count: nodes,
            limit: config.max_nodes,
        });
    }
    let colors = request.colors.len();
    if colors > config.max_colors {
        return Err(ServiceError::TooManyColors {
            count: colors,
            limit: config.max_colors,
        });
    }

    if config.allow_dangling_neighbors {
        let dangling = request.adjacency.dangling_neighbors();
        if !dangling.is_empty() {
            debug!(count = dangling.len(), "accepting dangling neighbors");
        }
    } else {
        request.adjacency.ensure_closed()?;
    }

    let duplicates = request.colors.duplicate_labels();
    if !duplicates.is_empty() {
        warn!(labels = ?duplicates, "palette contains duplicate labels");
    }
    Ok(())
}

/// Validate and solve `request`.
///
/// # Errors
///
/// - Any [`validate`] error.
/// - [`ServiceError::TraceBudgetExceeded`] if the search emits more than
///   `config.max_trace_events` events.
/// - [`ServiceError::StateTooLarge`] if `include_state` would attach more
///   than `config.max_state_entries` snapshot entries.
pub fn run_solve(
    request: &SolveRequestV1,
    config: &ServerConfig,
) -> Result<SolveResponseV1, ServiceError> {
    execute(request, config, false).map(|(response, _)| response)
}

/// Like [`run_solve`], and also record a binary trace tape.
///
/// # Errors
///
/// Same as [`run_solve`], plus [`ServiceError::Internal`] if the tape
/// cannot be written.
pub fn run_solve_with_tape(
    request: &SolveRequestV1,
    config: &ServerConfig,
) -> Result<(SolveResponseV1, TapeOutput), ServiceError> {
    let (response, tape) = execute(request, config, true)?;
    let tape = tape.ok_or_else(|| ServiceError::Internal {
        detail: "tape requested but not produced".into(),
    })?;
    Ok((response, tape))
}

fn execute(
    request: &SolveRequestV1,
    config: &ServerConfig,
    with_tape: bool,
) -> Result<(SolveResponseV1, Option<TapeOutput>), ServiceError> {
    validate(request, config)?;

    let graph = &request.adjacency;
    let palette = &request.colors;
    let digest = problem_digest(graph, palette);
    let started = Instant::now();

    let mut log = BoundedTraceLog::new(config.max_trace_events);
    let mut writer = if with_tape {
        Some(TapeWriter::for_problem(graph, palette).map_err(|e| ServiceError::Internal {
            detail: e.to_string(),
        })?)
    } else {
        None
    };

    let solved: Result<SolveOutcome, _> = match writer.as_mut() {
        Some(w) => {
            let mut tee = TeeSink::new(&mut log, w);
            solve_with_sink(graph, palette, &mut tee)
        }
        None => solve_with_sink(graph, palette, &mut log),
    };
    let outcome = match solved {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = ServiceError::from(e);
            warn!(
                problem = %digest,
                nodes = graph.len(),
                colors = palette.len(),
                error = %err,
                "solve aborted"
            );
            return Err(err);
        }
    };

    let tape = match writer {
        Some(w) => Some(w.finish().map_err(|e| ServiceError::Internal {
            detail: e.to_string(),
        })?),
        None => None,
    };

    let status = SolveStatus::from_success(outcome.success);
    info!(
        problem = %digest,
        nodes = graph.len(),
        neighbor_entries = graph.edge_count(),
        colors = palette.len(),
        status = status.as_str(),
        steps = log.events().len(),
        tries = outcome.stats.tries,
        backtracks = outcome.stats.backtracks,
        max_depth = outcome.stats.max_depth,
        elapsed_ms = started.elapsed().as_millis(),
        "solve finished"
    );

    if request.include_state {
        let entries = snapshot_entry_count(log.events());
        if entries > config.max_state_entries {
            let err = ServiceError::StateTooLarge {
                entries,
                limit: config.max_state_entries,
            };
            warn!(
                problem = %digest,
                steps = log.events().len(),
                error = %err,
                "state rejected"
            );
            return Err(err);
        }
    }

    let response = SolveResponseV1::from_trace(
        outcome.success,
        outcome.assignment,
        log.into_events(),
        request.include_state,
    );
    Ok((response, tape))
}

// ---------------------------------------------------------------------------
// Tape verification
// ---------------------------------------------------------------------------

/// Summary of a verified tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeReport {
    pub problem_digest: String,
    pub nodes: usize,
    pub colors: usize,
    pub record_count: u64,
    pub events: usize,
    pub status: SolveStatus,
    pub final_chain_hash: String,
    /// Assignment reconstructed from the trace; `None` when impossible.
    pub solution: Option<AssignmentV1>,
}

/// Read a tape and check it end to end.
///
/// Checks, in order: framing and hash chain, header and problem digest,
/// event integrity against the embedded problem, agreement with a fresh
/// solve, and that the recorded verdict matches the final assignment.
///
/// # Errors
///
/// [`ServiceError::InvalidTape`] naming the first check that failed.
pub fn verify_tape(bytes: &[u8]) -> Result<TapeReport, ServiceError> {
    let invalid = |detail: String| ServiceError::InvalidTape { detail };

    let tape = read_tape(bytes).map_err(|e| invalid(e.to_string()))?;
    let rendered = render_trace(&tape).map_err(|e| invalid(e.to_string()))?;
    let assignment = check_integrity(&rendered.graph, &rendered.palette, &rendered.events)
        .map_err(|e| invalid(e.to_string()))?;

    if let ReplayVerdict::Divergence { step_index } =
        replay_verify(&rendered.graph, &rendered.palette, &rendered.events)
    {
        return Err(invalid(format!(
            "trace diverges from a fresh solve at step {step_index}"
        )));
    }

    let complete = assignment.len() == rendered.graph.len();
    if complete != rendered.success {
        return Err(invalid(format!(
            "recorded success={} but the trace ends with {} of {} nodes colored",
            rendered.success,
            assignment.len(),
            rendered.graph.len()
        )));
    }

    Ok(TapeReport {
        problem_digest: problem_digest(&rendered.graph, &rendered.palette)
            .as_str()
            .to_string(),
        nodes: rendered.graph.len(),
        colors: rendered.palette.len(),
        record_count: tape.footer.record_count,
        events: rendered.events.len(),
        status: SolveStatus::from_success(rendered.success),
        final_chain_hash: hex::encode(tape.footer.final_chain_hash),
        solution: rendered.success.then_some(assignment),
    })
}
