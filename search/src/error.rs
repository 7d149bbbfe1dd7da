//! Typed solve errors.
//!
//! An unsatisfiable problem is not an error: it is a normal outcome with
//! `success == false`. `SolveError` only reports that the search was cut
//! short by its sink, so no verdict was reached.

use crate::sink::TraceSinkError;

/// Typed failure of a solve that did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The trace sink refused an event or the termination record.
    Sink(TraceSinkError),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sink(e) => write!(f, "solve stopped by trace sink: {e}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sink(e) => Some(e),
        }
    }
}

impl From<TraceSinkError> for SolveError {
    fn from(e: TraceSinkError) -> Self {
        Self::Sink(e)
    }
}
