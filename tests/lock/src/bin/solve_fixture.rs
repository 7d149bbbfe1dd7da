//! Prints the fixture report for cross-process determinism checks.
//!
//! Usage: `solve_fixture`
//! Output: one `key=value` line per case (see `lock_tests::solve_report`).

fn main() {
    print!("{}", lock_tests::solve_report::fixture_report());
}
