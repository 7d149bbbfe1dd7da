//! Shared support for the lock tests and the `solve_fixture` binary.

pub mod solve_report;
