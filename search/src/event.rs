//! Trace events: the audit log of every search decision.
//!
//! A trace is append-only and strictly chronological. Its JSON form is
//! `{"type": "try"|"assign"|"backtrack", "node": .., "color": ..|null}`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use chroma_kernel::proof::canon::{canonical_json_bytes, CanonError};
use chroma_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Event discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEventKind {
    Try,
    Assign,
    Backtrack,
}

impl TraceEventKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Try => "try",
            Self::Assign => "assign",
            Self::Backtrack => "backtrack",
        }
    }
}

impl std::fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TraceEventV1 {
    /// A color was considered for a node. Emitted before the safety check.
    Try { node: String, color: String },
    /// The color passed the safety check and was committed.
    Assign { node: String, color: String },
    /// A committed color was withdrawn after its subtree failed.
    Backtrack { node: String },
}

impl TraceEventV1 {
    #[must_use]
    pub fn kind(&self) -> TraceEventKind {
        match self {
            Self::Try { .. } => TraceEventKind::Try,
            Self::Assign { .. } => TraceEventKind::Assign,
            Self::Backtrack { .. } => TraceEventKind::Backtrack,
        }
    }

    #[must_use]
    pub fn node(&self) -> &str {
        match self {
            Self::Try { node, .. } | Self::Assign { node, .. } | Self::Backtrack { node } => node,
        }
    }

    /// Color label; `None` for `Backtrack`.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Try { color, .. } | Self::Assign { color, .. } => Some(color),
            Self::Backtrack { .. } => None,
        }
    }

    #[must_use]
    pub fn to_json_value(&self) -> Value {
        json!({
            "type": self.kind().as_str(),
            "node": self.node(),
            "color": self.color(),
        })
    }
}

impl Serialize for TraceEventV1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TraceEventV1", 3)?;
        s.serialize_field("type", self.kind().as_str())?;
        s.serialize_field("node", self.node())?;
        s.serialize_field("color", &self.color())?;
        s.end()
    }
}

/// Canonical JSON bytes of a whole trace (an array of event objects).
///
/// # Errors
///
/// Propagates [`CanonError`]; events only contain strings and nulls, so this
/// does not fail in practice.
pub fn trace_bytes(trace: &[TraceEventV1]) -> Result<Vec<u8>, CanonError> {
    let value = Value::Array(trace.iter().map(TraceEventV1::to_json_value).collect());
    canonical_json_bytes(&value)
}

/// Domain-separated digest of a trace.
///
/// # Errors
///
/// See [`trace_bytes`].
pub fn trace_digest(trace: &[TraceEventV1]) -> Result<ContentHash, CanonError> {
    Ok(canonical_hash(HashDomain::TraceEvents, &trace_bytes(trace)?))
}
