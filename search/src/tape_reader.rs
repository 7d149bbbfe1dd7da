//! Fail-closed tape deserialization with chain verification.
//!
//! Parses `.ctap` bytes into [`TraceTapeV1`], enforcing every structural
//! invariant. Any violation is a typed [`TapeParseError`].

use chroma_kernel::proof::hash::{raw_hash, raw_hash2};

use crate::tape::{
    TapeParseError, TapeRecordV1, TraceTapeFooterV1, TraceTapeHeaderV1, TraceTapeV1,
    DOMAIN_TRACE_TAPE, DOMAIN_TRACE_TAPE_CHAIN, FOOTER_SIZE, RECORD_TYPE_ASSIGN,
    RECORD_TYPE_BACKTRACK, RECORD_TYPE_TERMINATION, RECORD_TYPE_TRY, TRACE_TAPE_FOOTER_MAGIC,
    TRACE_TAPE_MAGIC, TRACE_TAPE_VERSION,
};

/// Parse a complete tape, verifying all invariants.
///
/// # Errors
///
/// Returns [`TapeParseError`] on any structural or integrity violation.
pub fn read_tape(bytes: &[u8]) -> Result<TraceTapeV1, TapeParseError> {
    // magic(4) + version(2) + header_len(4) + footer
    let min_size = 4 + 2 + 4 + FOOTER_SIZE;
    if bytes.len() < min_size {
        return Err(TapeParseError::TooShort);
    }

    let mut cursor = Cursor::new(bytes);

    // --- Magic and version ---
    let magic = cursor.read_bytes(4).map_err(|()| TapeParseError::TooShort)?;
    if magic != TRACE_TAPE_MAGIC {
        return Err(TapeParseError::BadMagic);
    }
    let version = cursor.read_u16().map_err(|()| TapeParseError::TooShort)?;
    if version != TRACE_TAPE_VERSION {
        return Err(TapeParseError::UnsupportedVersion { got: version });
    }

    // --- Header ---
    let header_len = cursor.read_u32().map_err(|()| TapeParseError::TooShort)? as usize;
    if cursor.remaining() < header_len + FOOTER_SIZE {
        return Err(TapeParseError::HeaderTruncated);
    }
    let header_bytes = cursor
        .read_bytes(header_len)
        .map_err(|()| TapeParseError::HeaderTruncated)?
        .to_vec();
    let json: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|e| TapeParseError::InvalidHeaderJson(e.to_string()))?;
    let node_count = header_array_len(&json, "nodes")?;
    let palette_len = header_array_len(&json, "palette")?;

    let mut chain_hash = raw_hash(DOMAIN_TRACE_TAPE, &header_bytes);

    // --- Records ---
    let footer_start = bytes.len() - FOOTER_SIZE;
    let mut records = Vec::new();
    let mut record_index: u64 = 0;

    while cursor.pos < footer_start {
        let frame_start = cursor.pos;
        let frame_len = cursor
            .read_u32()
            .map_err(|()| TapeParseError::RecordTruncated { record_index })?
            as usize;
        if footer_start.saturating_sub(cursor.pos) < frame_len {
            return Err(TapeParseError::RecordTruncated { record_index });
        }

        // Parse from a bounded sub-cursor so parsers cannot over-read.
        let mut frame = Cursor::new(&bytes[cursor.pos..cursor.pos + frame_len]);
        cursor.pos += frame_len;

        let record_type = frame
            .read_u8()
            .map_err(|()| TapeParseError::RecordTruncated { record_index })?;
        let truncated = |()| TapeParseError::RecordBodyTruncated { record_index };

        let record = match record_type {
            RECORD_TYPE_TRY | RECORD_TYPE_ASSIGN => {
                let node = frame.read_u32().map_err(truncated)?;
                let color = frame.read_u32().map_err(truncated)?;
                check_node(node, node_count, record_index)?;
                if color as usize >= palette_len {
                    return Err(TapeParseError::ColorIndexOutOfRange {
                        index: color,
                        record_index,
                    });
                }
                if record_type == RECORD_TYPE_TRY {
                    TapeRecordV1::Try { node, color }
                } else {
                    TapeRecordV1::Assign { node, color }
                }
            }
            RECORD_TYPE_BACKTRACK => {
                let node = frame.read_u32().map_err(truncated)?;
                check_node(node, node_count, record_index)?;
                TapeRecordV1::Backtrack { node }
            }
            RECORD_TYPE_TERMINATION => {
                let flag = frame.read_u8().map_err(truncated)?;
                let success = match flag {
                    0 => false,
                    1 => true,
                    _ => {
                        return Err(TapeParseError::InvalidSuccessFlag { flag, record_index });
                    }
                };
                TapeRecordV1::Termination { success }
            }
            tag => return Err(TapeParseError::UnknownRecordType { tag, record_index }),
        };

        if frame.remaining() > 0 {
            return Err(TapeParseError::FrameBodyNotFullyConsumed {
                record_index,
                remaining: frame.remaining(),
            });
        }

        let full_frame = &bytes[frame_start..frame_start + 4 + frame_len];
        chain_hash = raw_hash2(DOMAIN_TRACE_TAPE_CHAIN, &chain_hash, full_frame);

        records.push(record);
        record_index += 1;
    }

    // --- Footer ---
    let footer_record_count = cursor
        .read_u64()
        .map_err(|()| TapeParseError::BadFooterMagic)?;
    let mut footer_chain_hash = [0u8; 32];
    footer_chain_hash.copy_from_slice(
        cursor
            .read_bytes(32)
            .map_err(|()| TapeParseError::BadFooterMagic)?,
    );
    let footer_magic = cursor
        .read_bytes(4)
        .map_err(|()| TapeParseError::BadFooterMagic)?;
    if footer_magic != TRACE_TAPE_FOOTER_MAGIC {
        return Err(TapeParseError::BadFooterMagic);
    }
    if cursor.remaining() > 0 {
        return Err(TapeParseError::TrailingBytes {
            excess: cursor.remaining(),
        });
    }
    if footer_record_count != record_index {
        return Err(TapeParseError::RecordCountMismatch {
            expected: footer_record_count,
            actual: record_index,
        });
    }
    if chain_hash != footer_chain_hash {
        return Err(TapeParseError::ChainHashMismatch);
    }

    validate_termination(&records)?;

    Ok(TraceTapeV1 {
        header: TraceTapeHeaderV1 {
            json_bytes: header_bytes,
            json,
        },
        records,
        footer: TraceTapeFooterV1 {
            record_count: record_index,
            final_chain_hash: footer_chain_hash,
        },
    })
}

fn header_array_len(json: &serde_json::Value, field: &'static str) -> Result<usize, TapeParseError> {
    json.get(field)
        .and_then(serde_json::Value::as_array)
        .map(Vec::len)
        .ok_or(TapeParseError::InvalidHeaderField { field })
}

fn check_node(node: u32, node_count: usize, record_index: u64) -> Result<(), TapeParseError> {
    if node as usize >= node_count {
        return Err(TapeParseError::NodeIndexOutOfRange {
            index: node,
            record_index,
        });
    }
    Ok(())
}

/// Exactly one termination, and it is the last record.
fn validate_termination(records: &[TapeRecordV1]) -> Result<(), TapeParseError> {
    let last = records.len().checked_sub(1);
    for (i, record) in records.iter().enumerate() {
        if matches!(record, TapeRecordV1::Termination { .. }) && Some(i) != last {
            return Err(TapeParseError::TerminationNotLast {
                record_index: i as u64,
            });
        }
    }
    match records.last() {
        Some(TapeRecordV1::Termination { .. }) => Ok(()),
        _ => Err(TapeParseError::MissingTermination),
    }
}

// ---------------------------------------------------------------------------
// Byte cursor
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ()> {
        if self.pos + n > self.data.len() {
            return Err(());
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ()> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ()> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, ()> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, ()> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
