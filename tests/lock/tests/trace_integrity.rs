//! Trace integrity over every fixture case.
//!
//! The response trace must replay cleanly, its state snapshots must follow
//! the events, and a solved trace must end in the reported solution.

use chroma_search::event::TraceEventV1;
use chroma_search::replay::{check_integrity, replay_verify, ReplayVerdict};
use chroma_service::config::ServerConfig;
use chroma_service::contract::SolveStatus;
use chroma_service::runner::run_solve;
use lock_tests::solve_report::{case_request, REPORT_CASES};

#[test]
fn every_case_replays_cleanly() {
    for (name, colors) in REPORT_CASES {
        let request = case_request(name, colors);
        let response = run_solve(&request, &ServerConfig::default()).unwrap();
        let events: Vec<TraceEventV1> = response.steps.iter().map(|s| s.event.clone()).collect();

        let final_state = check_integrity(&request.adjacency, &request.colors, &events)
            .unwrap_or_else(|e| panic!("{name}/{colors}: {e}"));
        assert_eq!(
            replay_verify(&request.adjacency, &request.colors, &events),
            ReplayVerdict::Match,
            "{name}/{colors}"
        );

        match response.status {
            SolveStatus::Solved => assert_eq!(Some(final_state), response.solution),
            SolveStatus::Impossible => {
                assert!(final_state.is_empty(), "{name}/{colors}");
                assert_eq!(response.solution, None);
            }
        }
    }
}

#[test]
fn snapshots_follow_events() {
    for (name, colors) in REPORT_CASES {
        let request = case_request(name, colors);
        let response = run_solve(&request, &ServerConfig::default()).unwrap();

        let mut previous_len = 0usize;
        for (i, step) in response.steps.iter().enumerate() {
            let state = step.current_state.as_ref().unwrap();
            match &step.event {
                TraceEventV1::Try { .. } => assert_eq!(state.len(), previous_len),
                TraceEventV1::Assign { node, color } => {
                    assert_eq!(state.len(), previous_len + 1);
                    assert_eq!(state.color_of(node), Some(color.as_str()));
                }
                TraceEventV1::Backtrack { node } => {
                    assert_eq!(state.len() + 1, previous_len, "{name}/{colors} step {i}");
                    assert!(!state.contains(node));
                }
            }
            previous_len = state.len();
        }
    }
}

#[test]
fn backtracks_only_retract_the_latest_assignment() {
    for (name, colors) in REPORT_CASES {
        let request = case_request(name, colors);
        let response = run_solve(&request, &ServerConfig::default()).unwrap();
        let mut stack: Vec<&str> = Vec::new();
        for step in &response.steps {
            match &step.event {
                TraceEventV1::Assign { node, .. } => stack.push(node),
                TraceEventV1::Backtrack { node } => {
                    assert_eq!(stack.pop(), Some(node.as_str()), "{name}/{colors}");
                }
                TraceEventV1::Try { .. } => {}
            }
        }
    }
}
