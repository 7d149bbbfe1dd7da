//! Tape → trace renderer.
//!
//! Converts a parsed [`TraceTapeV1`] back into the problem it was recorded
//! for and the `Vec<TraceEventV1>` the solver emitted. For a tape written
//! alongside a [`crate::sink::TraceLog`], the rendered events equal the
//! logged events exactly.

use serde_json::Value;

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use chroma_kernel::proof::digest::problem_digest;

use crate::event::TraceEventV1;
use crate::tape::{TapeRecordV1, TapeRenderError, TraceTapeV1, TRACE_TAPE_SCHEMA_VERSION};

/// A tape rendered back into domain types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTraceV1 {
    pub graph: AdjacencyV1,
    pub palette: PaletteV1,
    pub events: Vec<TraceEventV1>,
    pub success: bool,
}

/// Render a parsed tape.
///
/// The header's `problem_digest` is recomputed from the embedded problem
/// and must match.
///
/// # Errors
///
/// Returns [`TapeRenderError`] if header fields are missing or malformed, or
/// if the digest does not match.
pub fn render_trace(tape: &TraceTapeV1) -> Result<RenderedTraceV1, TapeRenderError> {
    let header = &tape.header.json;

    let schema = header_str(header, "schema_version")?;
    if schema != TRACE_TAPE_SCHEMA_VERSION {
        return Err(TapeRenderError::InvalidHeaderField {
            field: "schema_version",
            detail: format!("unknown schema: {schema}"),
        });
    }

    let graph = header_graph(header)?;
    let palette = header_palette(header)?;

    let declared = header_str(header, "problem_digest")?;
    let computed = problem_digest(&graph, &palette);
    if declared != computed.as_str() {
        return Err(TapeRenderError::ProblemDigestMismatch {
            declared: declared.to_string(),
            computed: computed.as_str().to_string(),
        });
    }

    let nodes: Vec<&str> = graph.nodes().collect();
    let node_label = |i: u32| -> Result<String, TapeRenderError> {
        nodes
            .get(i as usize)
            .map(|n| (*n).to_string())
            .ok_or_else(|| index_error("nodes", i))
    };
    let color_label = |i: u32| -> Result<String, TapeRenderError> {
        palette
            .get(i as usize)
            .map(str::to_string)
            .ok_or_else(|| index_error("palette", i))
    };

    let mut events = Vec::with_capacity(tape.records.len().saturating_sub(1));
    let mut success = None;
    for record in &tape.records {
        match *record {
            TapeRecordV1::Try { node, color } => events.push(TraceEventV1::Try {
                node: node_label(node)?,
                color: color_label(color)?,
            }),
            TapeRecordV1::Assign { node, color } => events.push(TraceEventV1::Assign {
                node: node_label(node)?,
                color: color_label(color)?,
            }),
            TapeRecordV1::Backtrack { node } => events.push(TraceEventV1::Backtrack {
                node: node_label(node)?,
            }),
            TapeRecordV1::Termination { success: s } => success = Some(s),
        }
    }

    Ok(RenderedTraceV1 {
        graph,
        palette,
        events,
        success: success.ok_or(TapeRenderError::NoTermination)?,
    })
}

fn index_error(field: &'static str, index: u32) -> TapeRenderError {
    TapeRenderError::InvalidHeaderField {
        field,
        detail: format!("index {index} out of range"),
    }
}

fn header_str<'a>(header: &'a Value, field: &'static str) -> Result<&'a str, TapeRenderError> {
    header
        .get(field)
        .ok_or(TapeRenderError::MissingHeaderField(field))?
        .as_str()
        .ok_or_else(|| TapeRenderError::InvalidHeaderField {
            field,
            detail: "expected a string".into(),
        })
}

fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, TapeRenderError> {
    let invalid = || TapeRenderError::InvalidHeaderField {
        field,
        detail: "expected an array of strings".into(),
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

fn header_graph(header: &Value) -> Result<AdjacencyV1, TapeRenderError> {
    let invalid = |detail: String| TapeRenderError::InvalidHeaderField {
        field: "nodes",
        detail,
    };
    let entries = header
        .get("nodes")
        .ok_or(TapeRenderError::MissingHeaderField("nodes"))?
        .as_array()
        .ok_or_else(|| invalid("expected an array".into()))?;

    let mut graph = AdjacencyV1::new();
    for entry in entries {
        let (node, neighbors) = match entry.as_array().map(Vec::as_slice) {
            Some([Value::String(node), neighbors]) => (node.clone(), string_list(neighbors, "nodes")?),
            _ => return Err(invalid("expected [node, [neighbors]] pairs".into())),
        };
        graph.insert(node, neighbors).map_err(|e| invalid(e.to_string()))?;
    }
    Ok(graph)
}

fn header_palette(header: &Value) -> Result<PaletteV1, TapeRenderError> {
    let value = header
        .get("palette")
        .ok_or(TapeRenderError::MissingHeaderField("palette"))?;
    Ok(PaletteV1::new(string_list(value, "palette")?))
}
