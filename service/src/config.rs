//! Service configuration.
//!
//! [`ServerConfig`] bounds every request the service will solve. The solver
//! itself has no limits; the service rejects oversized problems before the
//! search starts and caps the trace while it runs.

use std::time::Duration;

/// Largest graph accepted by default.
pub const DEFAULT_MAX_NODES: usize = 512;
/// Largest palette accepted by default.
pub const DEFAULT_MAX_COLORS: usize = 64;
/// Trace events recorded before a solve is abandoned.
pub const DEFAULT_MAX_TRACE_EVENTS: usize = 1_000_000;
/// Assignment entries across all per-step snapshots of one response.
pub const DEFAULT_MAX_STATE_ENTRIES: usize = 1_000_000;
/// Wall-clock budget for one solve.
pub const DEFAULT_SOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits and HTTP settings for the solve service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Allowed CORS origins.
    ///
    /// Empty means no CORS headers are sent. `["*"]` allows any origin.
    ///
    /// # Security
    ///
    /// A wildcard lets any web page call the solver from a browser.
    pub allowed_origins: Vec<String>,

    pub max_nodes: usize,

    pub max_colors: usize,

    /// Cap on recorded trace events. A search that would emit more is
    /// rejected rather than truncated.
    pub max_trace_events: usize,

    /// Cap on the summed size of `current_state` snapshots when a request
    /// sets `include_state`. Each snapshot holds the whole assignment, so
    /// the total grows with events times depth.
    pub max_state_entries: usize,

    /// Accept graphs whose neighbor lists name undeclared nodes.
    ///
    /// Such neighbors can never be colored, so they never conflict.
    pub allow_dangling_neighbors: bool,

    pub solve_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_nodes: DEFAULT_MAX_NODES,
            max_colors: DEFAULT_MAX_COLORS,
            max_trace_events: DEFAULT_MAX_TRACE_EVENTS,
            max_state_entries: DEFAULT_MAX_STATE_ENTRIES,
            allow_dangling_neighbors: false,
            solve_timeout: DEFAULT_SOLVE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Permissive settings for local development.
    ///
    /// # Security
    ///
    /// Allows requests from any origin. Do not expose to a network.
    #[must_use]
    pub fn development() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            ..Self::default()
        }
    }

    /// A warning to log at startup when the configuration is permissive.
    #[must_use]
    pub fn security_warning(&self) -> Option<&'static str> {
        if self.allows_any_origin() {
            Some("CORS allows any origin; any web page can submit solve requests")
        } else {
            None
        }
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}
