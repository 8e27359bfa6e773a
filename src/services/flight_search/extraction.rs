//! Normalization of heterogeneous provider responses into candidate lists.
//!
//! The provider may answer with a raw array of flight-like records, a trace
//! of agent steps carrying tool-call results, a bare tool result exposing a
//! `data` array, or free text that merely embeds a JSON array. All of these
//! collapse into a flat, order-preserving `Vec<Value>` of candidates. Decode
//! failures anywhere are swallowed as "no candidates from this block":
//! partial extraction from partially-malformed responses is expected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Name of the tool whose results carry flight candidates; results from any
/// other tool in a step trace are ignored.
pub const FLIGHT_SEARCH_TOOL: &str = "search_flights";

/// The known provider response shapes. Decoding picks the first variant that
/// fits; `Text` is the explicit last resort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderResponse {
    /// A trace of agent execution steps with embedded tool-call results.
    Steps { steps: Vec<AgentStep> },
    /// A tool result exposing its `data` array directly.
    ToolResult(ToolResultPayload),
    /// A raw array of flight-like records.
    Array(Vec<Value>),
    /// Free text, possibly containing an embedded JSON array.
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStep {
    #[serde(default)]
    pub tool_results: Vec<ToolCallResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub tool_name: String,
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultPayload {
    pub data: Vec<Value>,
}

/// Candidates pulled out of one response, plus whether the free-text fallback
/// path was taken (surfaced in result metadata).
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub candidates: Vec<Value>,
    pub used_text_fallback: bool,
}

/// Flattens one provider response into candidates, preserving step order.
pub fn extract_candidates(response: ProviderResponse) -> ExtractionOutcome {
    match response {
        ProviderResponse::Array(items) => ExtractionOutcome {
            candidates: items,
            used_text_fallback: false,
        },
        ProviderResponse::ToolResult(payload) => ExtractionOutcome {
            candidates: payload.data,
            used_text_fallback: false,
        },
        ProviderResponse::Steps { steps } => {
            let mut candidates = Vec::new();
            for step in steps {
                for result in step.tool_results {
                    if result.tool_name != FLIGHT_SEARCH_TOOL {
                        debug!(tool = %result.tool_name, "skipping non-search tool result");
                        continue;
                    }
                    if let Some(blocks) = result.content {
                        for block in blocks {
                            if let ContentBlock::Text { text } = block {
                                candidates.extend(decode_candidate_array(&text));
                            }
                        }
                    }
                    if let Some(data) = result.data {
                        candidates.extend(data);
                    }
                }
            }
            ExtractionOutcome {
                candidates,
                used_text_fallback: false,
            }
        }
        ProviderResponse::Text(text) => {
            warn!("no structured tool results in provider response, trying free-text fallback");
            ExtractionOutcome {
                candidates: first_embedded_array(&text),
                used_text_fallback: true,
            }
        }
    }
}

/// Decodes a text block holding either a JSON array of candidates or an
/// object wrapping one under `data`. Anything else yields nothing.
fn decode_candidate_array(text: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(mut map)) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Ok(_) => Vec::new(),
        Err(e) => {
            debug!(error = %e, "text block is not valid candidate JSON, skipping");
            Vec::new()
        }
    }
}

/// Last-resort parse of the first JSON array literal embedded in free text.
///
/// Scans from the first `[` to its matching `]`, tracking bracket depth and
/// skipping brackets inside string literals, so trailing bracketed prose
/// (citations, footnotes) cannot swallow the array. Malformed or absent JSON
/// yields an empty list, never an error.
fn first_embedded_array(text: &str) -> Vec<Value> {
    let Some(start) = text.find('[') else {
        return Vec::new();
    };
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    let literal = &text[start..=start + offset];
                    return match serde_json::from_str::<Vec<Value>>(literal) {
                        Ok(items) => items,
                        Err(e) => {
                            debug!(error = %e, "embedded text is not a JSON array, treating as zero candidates");
                            Vec::new()
                        }
                    };
                }
            }
            _ => {}
        }
    }
    debug!("unterminated JSON array in free text, treating as zero candidates");
    Vec::new()
}
