//! The outcome wrapper every public operation returns.
//!
//! Serialized with `success`, `output`/`error`, and `meta` as top-level keys
//! for cross-process consumption. `meta` is always populated, with usage
//! fields zeroed when the failure happened before any agent call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFailure {
    pub message: String,
    pub code: String,
    /// Whether a client-side retry of the whole operation is worth attempting.
    pub recoverable: bool,
}

impl ExecutionFailure {
    pub fn from_app_error(err: &AppError) -> Self {
        Self {
            message: err.to_string(),
            code: err.envelope_code().to_string(),
            recoverable: err.recoverable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMeta {
    pub execution_id: Uuid,
    pub duration_ms: u64,
    pub tokens_used: u64,
    pub cost_usd: f64,
    /// Pairs whose provider call failed and degraded to zero results.
    pub failed_pairs: u32,
    /// Candidates dropped by schema validation.
    pub dropped_candidates: u32,
    /// Provider responses that needed the free-text JSON fallback.
    pub fallback_extractions: u32,
}

impl ExecutionMeta {
    /// Metadata for a run that failed before any usage was accrued.
    pub fn zeroed(execution_id: Uuid, duration_ms: u64) -> Self {
        Self {
            execution_id,
            duration_ms,
            tokens_used: 0,
            cost_usd: 0.0,
            failed_pairs: 0,
            dropped_candidates: 0,
            fallback_extractions: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExecutionFailure>,
    pub meta: ExecutionMeta,
}

impl<T> ExecutionEnvelope<T> {
    pub fn success(output: T, meta: ExecutionMeta) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            meta,
        }
    }

    pub fn failure(error: ExecutionFailure, meta: ExecutionMeta) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_serializes_top_level_keys() {
        let meta = ExecutionMeta::zeroed(Uuid::new_v4(), 12);
        let envelope: ExecutionEnvelope<()> = ExecutionEnvelope::failure(
            ExecutionFailure {
                message: "boom".to_string(),
                code: "EXECUTION_ERROR".to_string(),
                recoverable: true,
            },
            meta,
        );
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert!(value.get("output").is_none());
        assert_eq!(value["error"]["code"], "EXECUTION_ERROR");
        assert_eq!(value["meta"]["tokensUsed"], 0);
    }

    #[test]
    fn from_app_error_carries_code_and_hint() {
        let failure =
            ExecutionFailure::from_app_error(&AppError::InvalidInput("no origins".to_string()));
        assert_eq!(failure.code, "INVALID_INPUT");
        assert!(!failure.recoverable);
        assert!(failure.message.contains("no origins"));
    }
}
