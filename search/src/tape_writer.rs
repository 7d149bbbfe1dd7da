//! `TapeWriter`: streaming binary tape output implementing [`TraceSink`].
//!
//! Writes framed records to an in-memory buffer, maintaining a running hash
//! chain. `on_termination()` writes the Termination record inline;
//! `finish()` writes only the footer and checks that termination was
//! written.

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use chroma_kernel::proof::hash::{raw_hash, raw_hash2};

use crate::event::TraceEventKind;
use crate::sink::{StepView, TraceSink, TraceSinkError};
use crate::tape::{
    tape_header_bytes, TapeOutput, TapeWriteError, DOMAIN_TRACE_TAPE, DOMAIN_TRACE_TAPE_CHAIN,
    FOOTER_SIZE, RECORD_TYPE_ASSIGN, RECORD_TYPE_BACKTRACK, RECORD_TYPE_TERMINATION,
    RECORD_TYPE_TRY, TRACE_TAPE_FOOTER_MAGIC, TRACE_TAPE_MAGIC, TRACE_TAPE_VERSION,
};

/// Streaming binary tape writer.
pub struct TapeWriter {
    /// Magic, version, header, and records so far.
    buf: Vec<u8>,
    chain_hash: [u8; 32],
    record_count: u64,
    terminated: bool,
    /// Record body under construction. `buf` is untouched if building fails.
    scratch: Vec<u8>,
}

impl TapeWriter {
    /// Create a writer and emit magic, version, and header.
    ///
    /// The chain is seeded as `h0 = raw_hash(DOMAIN_TRACE_TAPE, header_json_bytes)`.
    #[must_use]
    pub fn new(header_json_bytes: &[u8]) -> Self {
        let header_len = header_json_bytes.len();
        let mut buf = Vec::with_capacity(10 + header_len + 4096);

        buf.extend_from_slice(&TRACE_TAPE_MAGIC);
        buf.extend_from_slice(&TRACE_TAPE_VERSION.to_le_bytes());
        #[allow(clippy::cast_possible_truncation)]
        let header_len_u32 = header_len as u32;
        buf.extend_from_slice(&header_len_u32.to_le_bytes());
        buf.extend_from_slice(header_json_bytes);

        Self {
            buf,
            chain_hash: raw_hash(DOMAIN_TRACE_TAPE, header_json_bytes),
            record_count: 0,
            terminated: false,
            scratch: Vec::with_capacity(16),
        }
    }

    /// Writer whose header binds `(graph, palette)`.
    ///
    /// # Errors
    ///
    /// [`TapeWriteError::CanonError`] if the header cannot be canonicalized.
    pub fn for_problem(graph: &AdjacencyV1, palette: &PaletteV1) -> Result<Self, TapeWriteError> {
        Ok(Self::new(&tape_header_bytes(graph, palette)?))
    }

    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Write the footer and return the finished tape.
    ///
    /// # Errors
    ///
    /// [`TapeWriteError::NotTerminated`] if no termination was written.
    pub fn finish(mut self) -> Result<TapeOutput, TapeWriteError> {
        if !self.terminated {
            return Err(TapeWriteError::NotTerminated);
        }

        let final_chain_hash = self.chain_hash;
        let record_count = self.record_count;

        self.buf.reserve(FOOTER_SIZE);
        self.buf.extend_from_slice(&record_count.to_le_bytes());
        self.buf.extend_from_slice(&final_chain_hash);
        self.buf.extend_from_slice(&TRACE_TAPE_FOOTER_MAGIC);

        Ok(TapeOutput {
            bytes: self.buf,
            final_chain_hash,
            record_count,
        })
    }

    /// Append `scratch` as a framed record and advance the chain.
    ///
    /// Frame: `[len:u32le][type:u8][body...]`, `len` = 1 + body length.
    fn commit_record(&mut self, record_type: u8) {
        #[allow(clippy::cast_possible_truncation)]
        let frame_len = (1 + self.scratch.len()) as u32;
        let frame_start = self.buf.len();

        self.buf.extend_from_slice(&frame_len.to_le_bytes());
        self.buf.push(record_type);
        self.buf.extend_from_slice(&self.scratch);

        let frame_bytes = &self.buf[frame_start..];
        self.chain_hash = raw_hash2(DOMAIN_TRACE_TAPE_CHAIN, &self.chain_hash, frame_bytes);
        self.record_count += 1;
    }

    fn write_step(&mut self, step: &StepView<'_>) -> Result<(), TapeWriteError> {
        if self.terminated {
            return Err(TapeWriteError::AlreadyTerminated);
        }

        self.scratch.clear();
        push_index(&mut self.scratch, "node", step.node_index)?;

        let record_type = match step.kind {
            TraceEventKind::Try | TraceEventKind::Assign => {
                let color_index = step
                    .color_index
                    .ok_or(TapeWriteError::MissingIndex { field: "color" })?;
                push_index(&mut self.scratch, "color", color_index)?;
                if step.kind == TraceEventKind::Try {
                    RECORD_TYPE_TRY
                } else {
                    RECORD_TYPE_ASSIGN
                }
            }
            TraceEventKind::Backtrack => RECORD_TYPE_BACKTRACK,
        };

        self.commit_record(record_type);
        Ok(())
    }

    fn write_termination(&mut self, success: bool) -> Result<(), TapeWriteError> {
        if self.terminated {
            return Err(TapeWriteError::AlreadyTerminated);
        }
        self.scratch.clear();
        self.scratch.push(u8::from(success));
        self.commit_record(RECORD_TYPE_TERMINATION);
        self.terminated = true;
        Ok(())
    }
}

fn push_index(buf: &mut Vec<u8>, field: &'static str, index: usize) -> Result<(), TapeWriteError> {
    let index_u32 =
        u32::try_from(index).map_err(|_| TapeWriteError::IndexOutOfRange { field, index })?;
    buf.extend_from_slice(&index_u32.to_le_bytes());
    Ok(())
}

impl TraceSink for TapeWriter {
    fn on_step(&mut self, step: &StepView<'_>) -> Result<(), TraceSinkError> {
        Ok(self.write_step(step)?)
    }

    fn on_termination(&mut self, success: bool) -> Result<(), TraceSinkError> {
        Ok(self.write_termination(success)?)
    }
}
