//! Edge-case lock tests for the public solve surface.
//!
//! Each case pins the full verdict and, where short, the exact trace.

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use chroma_search::event::TraceEventV1;
use chroma_search::solver::solve;
use chroma_service::config::ServerConfig;
use chroma_service::contract::{SolveRequestV1, SolveStatus};
use chroma_service::error::ServiceError;
use chroma_service::runner::run_solve;

fn graph(json: &str) -> AdjacencyV1 {
    serde_json::from_str(json).unwrap()
}

fn palette(labels: &[&str]) -> PaletteV1 {
    labels.iter().copied().collect()
}

fn try_(node: &str, color: &str) -> TraceEventV1 {
    TraceEventV1::Try {
        node: node.into(),
        color: color.into(),
    }
}

fn assign(node: &str, color: &str) -> TraceEventV1 {
    TraceEventV1::Assign {
        node: node.into(),
        color: color.into(),
    }
}

fn backtrack(node: &str) -> TraceEventV1 {
    TraceEventV1::Backtrack { node: node.into() }
}

#[test]
fn empty_graph_succeeds_with_empty_trace() {
    let result = solve(&AdjacencyV1::new(), &palette(&[]));
    assert!(result.success);
    assert!(result.assignment.is_empty());
    assert!(result.trace.is_empty());
}

#[test]
fn empty_palette_fails_without_events() {
    let result = solve(&graph(r#"{"A":[]}"#), &palette(&[]));
    assert!(!result.success);
    assert!(result.trace.is_empty());
}

#[test]
fn isolated_nodes_take_first_color() {
    let result = solve(&graph(r#"{"A":[],"B":[],"C":[]}"#), &palette(&["red", "blue"]));
    assert!(result.success);
    assert_eq!(
        result.trace,
        [
            try_("A", "red"),
            assign("A", "red"),
            try_("B", "red"),
            assign("B", "red"),
            try_("C", "red"),
            assign("C", "red"),
        ]
    );
}

#[test]
fn self_loop_is_ignored() {
    let result = solve(&graph(r#"{"A":["A"]}"#), &palette(&["red"]));
    assert!(result.success);
    assert_eq!(result.assignment.color_of("A"), Some("red"));
}

#[test]
fn triangle_with_two_colors_exhausts() {
    let result = solve(
        &graph(r#"{"A":["B","C"],"B":["A","C"],"C":["A","B"]}"#),
        &palette(&["r", "g"]),
    );
    assert!(!result.success);
    assert_eq!(
        result.trace,
        [
            try_("A", "r"),
            assign("A", "r"),
            try_("B", "r"),
            try_("B", "g"),
            assign("B", "g"),
            try_("C", "r"),
            try_("C", "g"),
            backtrack("B"),
            backtrack("A"),
            try_("A", "g"),
            assign("A", "g"),
            try_("B", "r"),
            assign("B", "r"),
            try_("C", "r"),
            try_("C", "g"),
            backtrack("B"),
            try_("B", "g"),
            backtrack("A"),
        ]
    );
}

#[test]
fn asymmetric_adjacency_is_checked_one_way() {
    // B lists A, A does not list B. B is checked against A, so the pair
    // still gets distinct colors.
    let result = solve(&graph(r#"{"A":[],"B":["A"]}"#), &palette(&["r", "g"]));
    assert!(result.success);
    assert_eq!(result.assignment.color_of("B"), Some("g"));

    // A lists B, but B is colored after A, so no conflict is ever seen.
    let result = solve(&graph(r#"{"A":["B"],"B":[]}"#), &palette(&["r", "g"]));
    assert!(result.success);
    assert_eq!(result.assignment.color_of("B"), Some("r"));
}

#[test]
fn duplicate_labels_conflict_by_value() {
    let result = solve(&graph(r#"{"A":["B"],"B":["A"]}"#), &palette(&["x", "x"]));
    assert!(!result.success);
}

#[test]
fn key_order_drives_search_order() {
    let g = graph(r#"{"z":["a"],"a":["z"]}"#);
    let result = solve(&g, &palette(&["r", "g"]));
    assert_eq!(result.trace[0], try_("z", "r"));
    let order: Vec<&str> = result.assignment.iter().map(|(n, _)| n).collect();
    assert_eq!(order, ["z", "a"]);
}

#[test]
fn service_rejects_dangling_but_solver_tolerates_it() {
    let g = graph(r#"{"A":["ghost"]}"#);
    assert!(solve(&g, &palette(&["r"])).success);

    let request = SolveRequestV1 {
        adjacency: g,
        colors: palette(&["r"]),
        include_state: false,
    };
    assert!(matches!(
        run_solve(&request, &ServerConfig::default()),
        Err(ServiceError::InvalidGraph(_))
    ));
    let lenient = ServerConfig {
        allow_dangling_neighbors: true,
        ..ServerConfig::default()
    };
    assert_eq!(
        run_solve(&request, &lenient).unwrap().status,
        SolveStatus::Solved
    );
}

#[test]
fn long_path_does_not_overflow_the_stack() {
    let n = 50_000;
    let edges = (1..n).map(|i| ((i - 1).to_string(), i.to_string()));
    let g = AdjacencyV1::from_edges((0..n).map(|i| i.to_string()), edges).unwrap();
    let result = solve(&g, &palette(&["r", "g"]));
    assert!(result.success);
    assert_eq!(result.assignment.len(), n);
    assert_eq!(result.stats.max_depth, n);
}
