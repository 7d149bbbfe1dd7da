//! Determinism lock tests.
//!
//! In-process: N=10 repeated solves of every report case produce identical
//! responses, traces, and tapes.
//!
//! Cross-process: the `solve_fixture` binary produces the same report under
//! several environment variants, and that report equals the one computed in
//! this process. Proves that hashing and serialization do not depend on
//! process-level state (cwd, locale, env vars, hash seeds).

use std::path::Path;
use std::process::Command;

use chroma_service::config::ServerConfig;
use chroma_service::runner::run_solve_with_tape;
use lock_tests::solve_report::{case_request, fixture_report, REPORT_CASES};

// ---------------------------------------------------------------------------
// In-process
// ---------------------------------------------------------------------------

#[test]
fn solve_determinism_inproc_n10() {
    let config = ServerConfig::default();
    for (name, colors) in REPORT_CASES {
        let request = case_request(name, colors);
        let (first_response, first_tape) = run_solve_with_tape(&request, &config).unwrap();
        for _ in 1..10 {
            let (response, tape) = run_solve_with_tape(&request, &config).unwrap();
            assert_eq!(response, first_response, "{name}/{colors}: response differs");
            assert_eq!(tape.bytes, first_tape.bytes, "{name}/{colors}: tape differs");
        }
    }
}

#[test]
fn report_is_stable_inproc() {
    assert_eq!(fixture_report(), fixture_report());
}

#[test]
fn report_has_one_line_per_case() {
    let report = fixture_report();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), REPORT_CASES.len());
    for line in lines {
        assert!(line.contains(" problem=sha256:"), "{line}");
        assert!(line.contains(" trace=sha256:"), "{line}");
        assert!(line.contains(" response=sha256:"), "{line}");
    }
    assert!(report.contains("triangle/2 status=impossible"));
    assert!(report.contains("house/3 status=solved"));
}

// ---------------------------------------------------------------------------
// Cross-process
// ---------------------------------------------------------------------------

/// Resolve the path to the compiled `solve_fixture` binary.
///
/// Test binaries live in `target/<profile>/deps/`; workspace binaries one
/// level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("solve_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the binary with the given cwd and environment overrides.
/// Returns stdout as a string.
fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();

    let mut command = Command::new(&bin);
    command.current_dir(work_dir);
    command
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "solve_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    let alt_cwd = std::env::temp_dir();
    let alt_cwd = alt_cwd.to_string_lossy();
    assert_eq!(
        baseline,
        run_variant(&alt_cwd, &[]),
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );

    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("CHROMA_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("RUST_LOG", "trace"),
            ],
        ),
        "output differs with spurious env vars (CHROMA_NOISE, TZ, RUST_LOG)"
    );
}

#[test]
fn crossproc_matches_inproc() {
    let subprocess = run_variant(&workspace_root(), &[]);
    assert_eq!(subprocess, fixture_report());
}
