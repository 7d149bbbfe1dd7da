//! Deterministic report over a fixed set of fixture problems.
//!
//! One line per problem, `key=value` fields separated by spaces:
//!
//! ```text
//! house/3 status=solved steps=20 problem=sha256:... trace=sha256:... response=sha256:... tape_chain=...
//! ```
//!
//! The same function backs the `solve_fixture` binary and the in-process
//! side of the cross-process comparison.

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::proof::digest::problem_digest;
use chroma_search::event::trace_digest;
use chroma_service::config::ServerConfig;
use chroma_service::contract::SolveRequestV1;
use chroma_service::fixtures;
use chroma_service::runner::run_solve_with_tape;

/// `(name, colors)` pairs covered by the report.
pub const REPORT_CASES: [(&str, usize); 8] = [
    ("pair", 2),
    ("triangle", 2),
    ("triangle", 3),
    ("house", 3),
    ("k4", 3),
    ("cycle-7", 2),
    ("wheel-5", 3),
    ("grid-3x3", 2),
];

/// Build the request for a report case.
///
/// # Panics
///
/// Panics if `name` is not a fixture name.
#[must_use]
pub fn case_request(name: &str, colors: usize) -> SolveRequestV1 {
    let adjacency: AdjacencyV1 = fixtures::by_name(name, usize::MAX).unwrap();
    SolveRequestV1 {
        adjacency,
        colors: fixtures::default_palette(colors),
        include_state: true,
    }
}

/// Render the full report.
///
/// # Panics
///
/// Panics if any case fails to solve under the default configuration.
#[must_use]
pub fn fixture_report() -> String {
    let config = ServerConfig::default();
    let mut out = String::new();
    for (name, colors) in REPORT_CASES {
        let request = case_request(name, colors);
        let (response, tape) = run_solve_with_tape(&request, &config).unwrap();
        let events: Vec<_> = response.steps.iter().map(|s| s.event.clone()).collect();
        out.push_str(&format!(
            "{name}/{colors} status={} steps={} problem={} trace={} response={} tape_chain={}\n",
            response.status.as_str(),
            response.steps.len(),
            problem_digest(&request.adjacency, &request.colors),
            trace_digest(&events).unwrap(),
            response.digest().unwrap(),
            tape.chain_hash_hex(),
        ));
    }
    out
}
