//! Trace tape lock tests.
//!
//! - Round trip through a file: the tape written by `solve --tape` style
//!   runs reads back to the exact response trace.
//! - Tamper detection: every single-byte flip is rejected.
//! - Resealed forgeries (valid framing and chain, wrong content) are caught
//!   by semantic verification.
//! - Forged tapes over hard problems are rejected without a full re-solve.

use std::io::Write;

use chroma_kernel::assignment::AssignmentV1;
use chroma_kernel::graph::AdjacencyV1;
use chroma_search::event::TraceEventKind;
use chroma_search::sink::{StepView, TraceSink};
use chroma_search::tape::{TapeRecordV1, TraceTapeV1};
use chroma_search::tape_reader::read_tape;
use chroma_search::tape_render::render_trace;
use chroma_search::tape_writer::TapeWriter;
use chroma_service::config::ServerConfig;
use chroma_service::contract::SolveStatus;
use chroma_service::error::ServiceError;
use chroma_service::fixtures;
use chroma_service::runner::{run_solve_with_tape, verify_tape};
use lock_tests::solve_report::case_request;

fn tape_for(name: &str, colors: usize) -> Vec<u8> {
    let request = case_request(name, colors);
    run_solve_with_tape(&request, &ServerConfig::default())
        .unwrap()
        .1
        .bytes
}

/// Re-encode `records` under the source tape's header with a valid chain.
fn reseal(tape: &TraceTapeV1, records: &[TapeRecordV1]) -> Vec<u8> {
    let empty = AssignmentV1::new();
    let mut writer = TapeWriter::new(&tape.header.json_bytes);
    for record in records {
        let (kind, node, color) = match *record {
            TapeRecordV1::Try { node, color } => (TraceEventKind::Try, node, Some(color)),
            TapeRecordV1::Assign { node, color } => (TraceEventKind::Assign, node, Some(color)),
            TapeRecordV1::Backtrack { node } => (TraceEventKind::Backtrack, node, None),
            TapeRecordV1::Termination { success } => {
                writer.on_termination(success).unwrap();
                continue;
            }
        };
        writer
            .on_step(&StepView {
                kind,
                node_index: node as usize,
                node: "",
                color_index: color.map(|c| c as usize),
                color: None,
                assignment: &empty,
            })
            .unwrap();
    }
    writer.finish().unwrap().bytes
}

#[test]
fn file_round_trip_matches_response() {
    let request = case_request("house", 3);
    let (response, tape) = run_solve_with_tape(&request, &ServerConfig::default()).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&tape.bytes).unwrap();
    let bytes = std::fs::read(file.path()).unwrap();

    let rendered = render_trace(&read_tape(&bytes).unwrap()).unwrap();
    let events: Vec<_> = response.steps.iter().map(|s| s.event.clone()).collect();
    assert_eq!(rendered.events, events);
    assert_eq!(rendered.graph, request.adjacency);
    assert_eq!(rendered.palette, request.colors);

    let report = verify_tape(&bytes).unwrap();
    assert_eq!(report.status, SolveStatus::Solved);
    assert_eq!(report.solution, response.solution);
}

#[test]
fn every_byte_flip_is_rejected() {
    let bytes = tape_for("triangle", 2);
    assert!(verify_tape(&bytes).is_ok());
    for i in 0..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;
        assert!(
            matches!(verify_tape(&tampered), Err(ServiceError::InvalidTape { .. })),
            "flip at byte {i} of {} went undetected",
            bytes.len()
        );
    }
}

#[test]
fn appended_bytes_rejected() {
    let mut bytes = tape_for("pair", 2);
    bytes.push(0);
    assert!(verify_tape(&bytes).is_err());
}

#[test]
fn reseal_without_changes_still_verifies() {
    let bytes = tape_for("house", 3);
    let tape = read_tape(&bytes).unwrap();
    assert_eq!(reseal(&tape, &tape.records), bytes);
}

#[test]
fn resealed_flipped_verdict_rejected() {
    let bytes = tape_for("house", 3);
    let tape = read_tape(&bytes).unwrap();
    let mut records = tape.records.clone();
    let last = records.len() - 1;
    records[last] = TapeRecordV1::Termination { success: false };

    let forged = reseal(&tape, &records);
    assert!(read_tape(&forged).is_ok());
    let err = verify_tape(&forged).unwrap_err();
    assert!(err.to_string().contains("recorded success"), "{err}");
}

#[test]
fn resealed_truncated_trace_rejected() {
    let bytes = tape_for("triangle", 3);
    let tape = read_tape(&bytes).unwrap();
    let mut records = tape.records.clone();
    let termination = records.pop().unwrap();
    records.pop();
    records.push(termination);

    let err = verify_tape(&reseal(&tape, &records)).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTape { .. }));
}

#[test]
fn resealed_unsafe_assign_rejected() {
    // Recolor B to A's color in the first assignment pair of `pair`.
    let bytes = tape_for("pair", 2);
    let tape = read_tape(&bytes).unwrap();
    let records: Vec<TapeRecordV1> = tape
        .records
        .iter()
        .map(|r| match *r {
            TapeRecordV1::Try { node: 1, .. } => TapeRecordV1::Try { node: 1, color: 0 },
            TapeRecordV1::Assign { node: 1, .. } => TapeRecordV1::Assign { node: 1, color: 0 },
            other => other,
        })
        .collect();

    let err = verify_tape(&reseal(&tape, &records)).unwrap_err();
    assert!(err.to_string().contains("invalid tape"), "{err}");
}

#[test]
fn empty_trace_over_hard_problem_rejected_quickly() {
    // A 40-node path feeding into K4: 3-coloring fails only after
    // exhausting every coloring of the path.
    let nodes = (0..44).map(|i| i.to_string());
    let path = (1..41).map(|i| ((i - 1).to_string(), i.to_string()));
    let clique = [(40, 41), (40, 42), (40, 43), (41, 42), (41, 43), (42, 43)]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()));
    let graph = AdjacencyV1::from_edges(nodes, path.chain(clique)).unwrap();
    let palette = fixtures::default_palette(3);

    let mut writer = TapeWriter::for_problem(&graph, &palette).unwrap();
    writer.on_termination(false).unwrap();
    let forged = writer.finish().unwrap().bytes;

    assert!(read_tape(&forged).is_ok());
    let err = verify_tape(&forged).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTape { .. }));
    assert!(err.to_string().contains("diverges"), "{err}");
}
