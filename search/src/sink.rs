//! Trace sinks: where the solver sends its events.
//!
//! The solver calls [`TraceSink::on_step`] once per event, in order, and
//! [`TraceSink::on_termination`] exactly once at the end. A sink may refuse an
//! event by returning an error; the solve then stops and reports it. That is
//! the only way a solve ends early.

use chroma_kernel::assignment::AssignmentV1;

use crate::event::{TraceEventKind, TraceEventV1};
use crate::tape::TapeWriteError;

/// Borrowed view of one event as the solver emits it.
///
/// `assignment` is the committed assignment *after* the event took effect.
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    pub kind: TraceEventKind,
    /// Position of `node` in graph key order (equals search depth).
    pub node_index: usize,
    pub node: &'a str,
    /// Position of `color` in the palette; `None` for `Backtrack`.
    pub color_index: Option<usize>,
    pub color: Option<&'a str>,
    pub assignment: &'a AssignmentV1,
}

impl StepView<'_> {
    /// Owned event for this step.
    #[must_use]
    pub fn to_event(&self) -> TraceEventV1 {
        let node = self.node.to_string();
        let color = self.color.unwrap_or_default().to_string();
        match self.kind {
            TraceEventKind::Try => TraceEventV1::Try { node, color },
            TraceEventKind::Assign => TraceEventV1::Assign { node, color },
            TraceEventKind::Backtrack => TraceEventV1::Backtrack { node },
        }
    }
}

/// Sink refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceSinkError {
    /// A bounded sink reached its event cap.
    BudgetExceeded { limit: usize },
    /// The tape writer rejected the event.
    Tape(TapeWriteError),
    /// The event differs from the recorded trace at `step_index`, or the
    /// recorded trace ended before it.
    Diverged { step_index: usize },
}

impl std::fmt::Display for TraceSinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BudgetExceeded { limit } => {
                write!(f, "trace exceeded the budget of {limit} events")
            }
            Self::Tape(e) => write!(f, "tape write failed: {e}"),
            Self::Diverged { step_index } => {
                write!(f, "event {step_index} differs from the recorded trace")
            }
        }
    }
}

impl std::error::Error for TraceSinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tape(e) => Some(e),
            Self::BudgetExceeded { .. } | Self::Diverged { .. } => None,
        }
    }
}

impl From<TapeWriteError> for TraceSinkError {
    fn from(e: TapeWriteError) -> Self {
        Self::Tape(e)
    }
}

/// Receiver of solver events.
pub trait TraceSink {
    /// Record one event.
    ///
    /// # Errors
    ///
    /// Returning an error stops the solve.
    fn on_step(&mut self, step: &StepView<'_>) -> Result<(), TraceSinkError>;

    /// Record the outcome. Called once, after the last step.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn on_termination(&mut self, success: bool) -> Result<(), TraceSinkError>;
}

/// Unbounded in-memory trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLog {
    events: Vec<TraceEventV1>,
    success: Option<bool>,
}

impl TraceLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEventV1] {
        &self.events
    }

    /// Outcome, once the solve terminated.
    #[must_use]
    pub fn success(&self) -> Option<bool> {
        self.success
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEventV1> {
        self.events
    }
}

impl TraceSink for TraceLog {
    fn on_step(&mut self, step: &StepView<'_>) -> Result<(), TraceSinkError> {
        self.events.push(step.to_event());
        Ok(())
    }

    fn on_termination(&mut self, success: bool) -> Result<(), TraceSinkError> {
        self.success = Some(success);
        Ok(())
    }
}

/// In-memory trace that refuses events past `limit`.
#[derive(Debug, Clone)]
pub struct BoundedTraceLog {
    inner: TraceLog,
    limit: usize,
}

impl BoundedTraceLog {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            inner: TraceLog::new(),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEventV1] {
        self.inner.events()
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEventV1> {
        self.inner.into_events()
    }
}

impl TraceSink for BoundedTraceLog {
    fn on_step(&mut self, step: &StepView<'_>) -> Result<(), TraceSinkError> {
        if self.inner.events.len() >= self.limit {
            return Err(TraceSinkError::BudgetExceeded { limit: self.limit });
        }
        self.inner.on_step(step)
    }

    fn on_termination(&mut self, success: bool) -> Result<(), TraceSinkError> {
        self.inner.on_termination(success)
    }
}

/// Forwards every event to two sinks, first `a` then `b`.
pub struct TeeSink<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl<'a> TeeSink<'a> {
    #[must_use]
    pub fn new(a: &'a mut dyn TraceSink, b: &'a mut dyn TraceSink) -> Self {
        Self { a, b }
    }
}

impl TraceSink for TeeSink<'_> {
    fn on_step(&mut self, step: &StepView<'_>) -> Result<(), TraceSinkError> {
        self.a.on_step(step)?;
        self.b.on_step(step)
    }

    fn on_termination(&mut self, success: bool) -> Result<(), TraceSinkError> {
        self.a.on_termination(success)?;
        self.b.on_termination(success)
    }
}
