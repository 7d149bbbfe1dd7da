//! Service-level failure, mapped to an HTTP status at the server boundary.

use chroma_kernel::graph::GraphError;
use chroma_search::error::SolveError;
use chroma_search::sink::TraceSinkError;

/// Why a solve request was not answered with a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The body was not a well-formed request.
    MalformedRequest { detail: String },
    /// The graph has more nodes than the configured limit.
    TooManyNodes { count: usize, limit: usize },
    /// The palette has more labels than the configured limit.
    TooManyColors { count: usize, limit: usize },
    /// The graph failed validation (e.g. a dangling neighbor).
    InvalidGraph(GraphError),
    /// Per-step snapshots would exceed the configured entry limit.
    StateTooLarge { entries: usize, limit: usize },
    /// The search emitted more events than the trace budget allows.
    TraceBudgetExceeded { limit: usize },
    /// The search did not finish within the configured time.
    Timeout { millis: u128 },
    /// A tape could not be read or failed verification.
    InvalidTape { detail: String },
    /// Anything else. Indicates a bug, not a bad request.
    Internal { detail: String },
}

impl ServiceError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedRequest { .. } => 400,
            Self::TooManyNodes { .. }
            | Self::TooManyColors { .. }
            | Self::StateTooLarge { .. } => 413,
            Self::InvalidGraph(_) | Self::TraceBudgetExceeded { .. } | Self::InvalidTape { .. } => {
                422
            }
            Self::Timeout { .. } => 503,
            Self::Internal { .. } => 500,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRequest { detail } => write!(f, "malformed request: {detail}"),
            Self::TooManyNodes { count, limit } => {
                write!(f, "graph has {count} nodes; the limit is {limit}")
            }
            Self::TooManyColors { count, limit } => {
                write!(f, "palette has {count} colors; the limit is {limit}")
            }
            Self::InvalidGraph(e) => write!(f, "invalid graph: {e}"),
            Self::StateTooLarge { entries, limit } => write!(
                f,
                "per-step state would hold {entries} entries; the limit is {limit}"
            ),
            Self::TraceBudgetExceeded { limit } => {
                write!(f, "search exceeded the trace budget of {limit} events")
            }
            Self::Timeout { millis } => write!(f, "search did not finish within {millis} ms"),
            Self::InvalidTape { detail } => write!(f, "invalid tape: {detail}"),
            Self::Internal { detail } => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGraph(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GraphError> for ServiceError {
    fn from(e: GraphError) -> Self {
        Self::InvalidGraph(e)
    }
}

impl From<SolveError> for ServiceError {
    fn from(e: SolveError) -> Self {
        match e {
            SolveError::Sink(TraceSinkError::BudgetExceeded { limit }) => {
                Self::TraceBudgetExceeded { limit }
            }
            SolveError::Sink(other) => Self::Internal {
                detail: other.to_string(),
            },
        }
    }
}
