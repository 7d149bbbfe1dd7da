//! `TraceTapeV1`: binary trace log types, constants, and errors.
//!
//! The tape is a compact binary record of one solve, written as the search
//! runs. The JSON trace is a derived view of it (see [`crate::tape_render`]).
//!
//! # Wire format
//!
//! ```text
//! [magic:4 "CTAP"][version:u16le=1][header_len:u32le][header: canonical JSON]
//! [record_0][record_1]...[record_N]
//! [footer: 44 bytes fixed]
//! ```
//!
//! Records are framed as `[len:u32le][type:u8][body...]`, where `len` counts
//! the type byte and body. Bodies:
//!
//! | type | body |
//! |---|---|
//! | `TRY`, `ASSIGN` | `node:u32le` `color:u32le` |
//! | `BACKTRACK` | `node:u32le` |
//! | `TERMINATION` | `success:u8` (0 or 1) |
//!
//! `node` indexes the header's `nodes` array and `color` indexes its
//! `palette` array, so duplicate palette labels stay distinguishable.
//!
//! Footer: `[record_count:u64le][final_chain_hash:32][footer_magic:4 "PATC"]`.
//!
//! # Hash chain
//!
//! `h0 = H(TraceTape, header_bytes)`, then for each frame
//! `h_i = H(TraceTapeChain, h_{i-1} || frame_bytes)`. The footer carries `h_N`.

use serde_json::{json, Value};

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use chroma_kernel::proof::canon::canonical_json_bytes;
use chroma_kernel::proof::digest::{problem_digest, problem_value};
use chroma_kernel::proof::hash::HashDomain;

// ---------------------------------------------------------------------------
// Magic bytes and version
// ---------------------------------------------------------------------------

/// File magic bytes for `.ctap` files.
pub const TRACE_TAPE_MAGIC: [u8; 4] = *b"CTAP";

/// Footer magic bytes (reverse of header magic; truncation sentinel).
pub const TRACE_TAPE_FOOTER_MAGIC: [u8; 4] = *b"PATC";

/// Wire format version. Readers reject anything else.
pub const TRACE_TAPE_VERSION: u16 = 1;

/// Fixed footer size: `u64` (`record_count`) + 32 (chain hash) + 4 (magic).
pub const FOOTER_SIZE: usize = 8 + 32 + 4;

/// Value of the header's `schema_version` field.
pub const TRACE_TAPE_SCHEMA_VERSION: &str = "trace_tape.v1";

/// `h0 = H(DOMAIN_TRACE_TAPE, header_bytes)`
pub const DOMAIN_TRACE_TAPE: HashDomain = HashDomain::TraceTape;

/// `h_i = H(DOMAIN_TRACE_TAPE_CHAIN, h_{i-1} || frame_bytes)`
pub const DOMAIN_TRACE_TAPE_CHAIN: HashDomain = HashDomain::TraceTapeChain;

// ---------------------------------------------------------------------------
// Record type tags
// ---------------------------------------------------------------------------

pub const RECORD_TYPE_TRY: u8 = 1;
pub const RECORD_TYPE_ASSIGN: u8 = 2;
pub const RECORD_TYPE_BACKTRACK: u8 = 3;
/// Exactly one, always last.
pub const RECORD_TYPE_TERMINATION: u8 = 4;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header JSON binding a tape to its problem.
///
/// `{"nodes":[[node,[neighbors]]..],"palette":[..],"problem_digest":"sha256:..",
/// "schema_version":"trace_tape.v1"}`
#[must_use]
pub fn tape_header_value(graph: &AdjacencyV1, palette: &PaletteV1) -> Value {
    let problem = problem_value(graph, palette);
    json!({
        "schema_version": TRACE_TAPE_SCHEMA_VERSION,
        "problem_digest": problem_digest(graph, palette).as_str(),
        "nodes": problem["nodes"],
        "palette": problem["palette"],
    })
}

/// Canonical header bytes for a problem.
///
/// # Errors
///
/// [`TapeWriteError::CanonError`] if canonicalization fails.
pub fn tape_header_bytes(graph: &AdjacencyV1, palette: &PaletteV1) -> Result<Vec<u8>, TapeWriteError> {
    canonical_json_bytes(&tape_header_value(graph, palette))
        .map_err(|e| TapeWriteError::CanonError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors during tape writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeWriteError {
    /// A node or color index does not fit in `u32`.
    IndexOutOfRange { field: &'static str, index: usize },
    /// A step arrived without the index the record needs.
    MissingIndex { field: &'static str },
    /// Header canonicalization failed.
    CanonError(String),
    /// Termination was already written.
    AlreadyTerminated,
    /// `finish()` was called before termination was written.
    NotTerminated,
}

impl std::fmt::Display for TapeWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { field, index } => {
                write!(f, "{field} index {index} does not fit in u32")
            }
            Self::MissingIndex { field } => write!(f, "step has no {field} index"),
            Self::CanonError(detail) => write!(f, "canonical JSON error: {detail}"),
            Self::AlreadyTerminated => write!(f, "termination already written"),
            Self::NotTerminated => {
                write!(f, "finish() called before termination was written")
            }
        }
    }
}

impl std::error::Error for TapeWriteError {}

/// Errors during tape parsing (fail-closed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeParseError {
    /// Too short for the minimum valid tape.
    TooShort,
    BadMagic,
    UnsupportedVersion { got: u16 },
    /// Header length exceeds available data.
    HeaderTruncated,
    /// Header is not valid JSON.
    InvalidHeaderJson(String),
    /// Header lacks a field the reader needs, or it has the wrong shape.
    InvalidHeaderField { field: &'static str },
    /// Record frame truncated.
    RecordTruncated { record_index: u64 },
    UnknownRecordType { tag: u8, record_index: u64 },
    /// Record body shorter than its fields.
    RecordBodyTruncated { record_index: u64 },
    /// Record parser did not consume the whole frame body.
    FrameBodyNotFullyConsumed { record_index: u64, remaining: usize },
    /// Node index is not below the header's node count.
    NodeIndexOutOfRange { index: u32, record_index: u64 },
    /// Color index is not below the header's palette length.
    ColorIndexOutOfRange { index: u32, record_index: u64 },
    /// Termination success byte is not 0 or 1.
    InvalidSuccessFlag { flag: u8, record_index: u64 },
    BadFooterMagic,
    /// Footer `record_count` does not match decoded count.
    RecordCountMismatch { expected: u64, actual: u64 },
    /// Footer chain hash does not match the recomputed chain.
    ChainHashMismatch,
    /// Bytes after the footer.
    TrailingBytes { excess: usize },
    /// Termination record is not the last record.
    TerminationNotLast { record_index: u64 },
    MissingTermination,
}

impl std::fmt::Display for TapeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for TapeParseError {}

/// Errors during tape to trace rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeRenderError {
    MissingHeaderField(&'static str),
    InvalidHeaderField { field: &'static str, detail: String },
    /// Header `problem_digest` disagrees with the embedded problem.
    ProblemDigestMismatch { declared: String, computed: String },
    /// Should have been caught by the reader.
    NoTermination,
}

impl std::fmt::Display for TapeRenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for TapeRenderError {}

// ---------------------------------------------------------------------------
// Parsed tape types (reader output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TraceTapeHeaderV1 {
    /// Raw canonical JSON bytes of the header.
    pub json_bytes: Vec<u8>,
    pub json: Value,
}

#[derive(Debug, Clone)]
pub struct TraceTapeFooterV1 {
    pub record_count: u64,
    pub final_chain_hash: [u8; 32],
}

/// A complete parsed tape.
#[derive(Debug, Clone)]
pub struct TraceTapeV1 {
    pub header: TraceTapeHeaderV1,
    pub records: Vec<TapeRecordV1>,
    pub footer: TraceTapeFooterV1,
}

/// One parsed record. Indices refer to the header's arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeRecordV1 {
    Try { node: u32, color: u32 },
    Assign { node: u32, color: u32 },
    Backtrack { node: u32 },
    Termination { success: bool },
}

/// Output from a completed tape write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapeOutput {
    /// Complete tape bytes, magic through footer.
    pub bytes: Vec<u8>,
    /// Same as the footer's chain hash.
    pub final_chain_hash: [u8; 32],
    pub record_count: u64,
}

impl TapeOutput {
    /// Lowercase hex of the final chain hash.
    #[must_use]
    pub fn chain_hash_hex(&self) -> String {
        hex::encode(self.final_chain_hash)
    }
}
