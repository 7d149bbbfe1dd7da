//! Shared helpers for chroma benchmark suites.
//!
//! A [`Regime`] is one named `(graph, palette)` problem chosen to stress a
//! particular shape of search: a shallow solve, a long forced chain, a deep
//! dead end, or an exhaustive refutation.

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use chroma_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use chroma_search::event::trace_bytes;
use chroma_search::solver::{solve, SolveResult};
use chroma_search::solve_with_tape;
use chroma_search::tape::TapeOutput;
use chroma_service::config::ServerConfig;
use chroma_service::contract::{SolveRequestV1, SolveResponseV1};
use chroma_service::fixtures;
use chroma_service::runner::run_solve;

/// One benchmark problem.
pub struct Regime {
    /// Stable identifier used in criterion ids and reports.
    pub name: &'static str,
    /// What the regime stresses.
    pub description: &'static str,
    pub graph: AdjacencyV1,
    pub palette: PaletteV1,
    /// Expected verdict; checked before any timing.
    pub expect_success: bool,
}

impl Regime {
    /// Request form for the service path.
    #[must_use]
    pub fn request(&self, include_state: bool) -> SolveRequestV1 {
        SolveRequestV1 {
            adjacency: self.graph.clone(),
            colors: self.palette.clone(),
            include_state,
        }
    }
}

/// Complete graph on `n` nodes.
///
/// # Panics
///
/// Never in practice; edges only name declared nodes.
#[must_use]
pub fn complete(n: usize) -> AdjacencyV1 {
    let nodes = (0..n).map(|i| i.to_string());
    let edges = (0..n).flat_map(|a| ((a + 1)..n).map(move |b| (a.to_string(), b.to_string())));
    AdjacencyV1::from_edges(nodes, edges).expect("complete graph edges are declared")
}

/// Simple path on `n` nodes.
///
/// # Panics
///
/// Never in practice; edges only name declared nodes.
#[must_use]
pub fn path(n: usize) -> AdjacencyV1 {
    let nodes = (0..n).map(|i| i.to_string());
    let edges = (1..n).map(|i| ((i - 1).to_string(), i.to_string()));
    AdjacencyV1::from_edges(nodes, edges).expect("path edges are declared")
}

/// All benchmark regimes, in report order.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "house_3",
            description: "demo problem, one backtrack",
            graph: fixtures::house(),
            palette: fixtures::default_palette(3),
            expect_success: true,
        },
        Regime {
            name: "grid_16x16_2",
            description: "bipartite lattice, no backtracking",
            graph: fixtures::grid(16, 16),
            palette: fixtures::default_palette(2),
            expect_success: true,
        },
        Regime {
            name: "path_20000_2",
            description: "long forced chain, deep search path",
            graph: path(20_000),
            palette: fixtures::default_palette(2),
            expect_success: true,
        },
        Regime {
            name: "cycle_1001_2",
            description: "odd cycle, failure found at full depth then unwound",
            graph: fixtures::cycle(1001),
            palette: fixtures::default_palette(2),
            expect_success: false,
        },
        Regime {
            name: "wheel_41_3",
            description: "odd wheel, every hub color refuted",
            graph: fixtures::wheel(41),
            palette: fixtures::default_palette(3),
            expect_success: false,
        },
        Regime {
            name: "k8_7",
            description: "exhaustive refutation over all partial colorings",
            graph: complete(8),
            palette: fixtures::default_palette(7),
            expect_success: false,
        },
    ]
}

/// Look up a regime by name.
#[must_use]
pub fn regime(name: &str) -> Option<Regime> {
    regimes().into_iter().find(|r| r.name == name)
}

/// Limits wide enough for every regime.
#[must_use]
pub fn bench_config() -> ServerConfig {
    ServerConfig {
        max_nodes: usize::MAX,
        max_colors: usize::MAX,
        max_trace_events: usize::MAX,
        max_state_entries: usize::MAX,
        ..ServerConfig::default()
    }
}

/// Run the solver alone with an in-memory trace.
#[must_use]
pub fn run_solver_only(regime: &Regime) -> SolveResult {
    solve(&regime.graph, &regime.palette)
}

/// Run the solver with a tape writer teed behind the trace log.
///
/// # Panics
///
/// Panics if the tape writer fails. Benchmark runs are expected to succeed.
#[must_use]
pub fn run_solver_with_tape(regime: &Regime) -> (SolveResult, TapeOutput) {
    solve_with_tape(&regime.graph, &regime.palette)
        .expect("solve_with_tape should succeed in benchmarks")
}

/// Run the full service path: validation, bounded trace, response shaping.
///
/// # Panics
///
/// Panics if the service rejects the request.
#[must_use]
pub fn run_service(regime: &Regime, include_state: bool) -> SolveResponseV1 {
    run_solve(&regime.request(include_state), &bench_config())
        .expect("run_solve should succeed in benchmarks")
}

/// Digest of a run's verdict and trace, for checking that timed iterations
/// all did the same work.
///
/// # Panics
///
/// Panics if the trace cannot be canonicalized.
#[must_use]
pub fn guard_digest(result: &SolveResult) -> ContentHash {
    let mut bytes = vec![u8::from(result.success)];
    bytes.extend(trace_bytes(&result.trace).expect("trace canonicalizes"));
    canonical_hash(HashDomain::BenchGuard, &bytes)
}
