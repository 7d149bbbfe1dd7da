//! Solver soundness and completeness against exhaustive enumeration.
//!
//! For every small random problem:
//! - `success` agrees with brute force;
//! - a reported solution is a proper total coloring;
//! - the trace passes the integrity replay and matches a fresh solve;
//! - stats agree with the trace.

use proptest::prelude::*;

use chroma_kernel::palette::PaletteV1;
use chroma_search::event::TraceEventKind;
use chroma_search::replay::{check_integrity, replay_verify, ReplayVerdict};
use chroma_search::solver::solve;
use lock_tests::brute_force::{colorable, graph_from_edges, is_proper};

fn problem_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, usize)> {
    (0usize..=8).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n.max(1), 0..n.max(1)), 0..=n * 2);
        (Just(n), edges, 0usize..=4)
    })
}

fn palette(k: usize) -> PaletteV1 {
    (0..k).map(|i| format!("c{i}")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn success_matches_brute_force((n, edges, k) in problem_strategy()) {
        let graph = graph_from_edges(n, &edges);
        let palette = palette(k);
        let result = solve(&graph, &palette);

        prop_assert_eq!(result.success, colorable(&graph, &palette));
        if result.success {
            prop_assert!(is_proper(&graph, &palette, &result.assignment));
            let order: Vec<&str> = result.assignment.iter().map(|(n, _)| n).collect();
            prop_assert_eq!(order, graph.nodes().collect::<Vec<_>>());
        }
    }

    #[test]
    fn trace_is_internally_consistent((n, edges, k) in problem_strategy()) {
        let graph = graph_from_edges(n, &edges);
        let palette = palette(k);
        let result = solve(&graph, &palette);

        let replayed = check_integrity(&graph, &palette, &result.trace);
        prop_assert!(replayed.is_ok(), "{:?}", replayed);
        if result.success {
            prop_assert_eq!(replayed.unwrap(), result.assignment.clone());
        }
        prop_assert_eq!(
            replay_verify(&graph, &palette, &result.trace),
            ReplayVerdict::Match
        );

        let count = |kind| result.trace.iter().filter(|e| e.kind() == kind).count() as u64;
        prop_assert_eq!(result.stats.tries, count(TraceEventKind::Try));
        prop_assert_eq!(result.stats.assigns, count(TraceEventKind::Assign));
        prop_assert_eq!(result.stats.backtracks, count(TraceEventKind::Backtrack));
        prop_assert_eq!(result.stats.events(), result.trace.len() as u64);
    }

    #[test]
    fn every_assign_either_survives_or_is_backtracked((n, edges, k) in problem_strategy()) {
        let graph = graph_from_edges(n, &edges);
        let result = solve(&graph, &palette(k));
        let assigns = result.stats.assigns;
        let backtracks = result.stats.backtracks;
        let survivors = result.assignment.len() as u64;
        if result.success {
            prop_assert_eq!(assigns, backtracks + survivors);
        } else {
            prop_assert_eq!(assigns, backtracks);
        }
    }
}
