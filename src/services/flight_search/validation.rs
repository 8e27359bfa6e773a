//! Candidate validation and coercion into `FlightRecord`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::models::flights::FlightRecord;

/// Validated records plus how many candidates were dropped on the way.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub flights: Vec<FlightRecord>,
    pub dropped: u32,
}

/// Coerces each candidate into a `FlightRecord`, preserving input order.
///
/// A candidate without an id gets one synthesized before validation. A
/// candidate that fails schema validation, or carries a negative price, is
/// dropped; one bad candidate never aborts the batch. Drops are counted for
/// result metadata but not surfaced as errors.
pub fn validate_candidates(candidates: Vec<Value>, batch_started: DateTime<Utc>) -> ValidationOutcome {
    let mut outcome = ValidationOutcome {
        flights: Vec::with_capacity(candidates.len()),
        dropped: 0,
    };

    for (index, mut candidate) in candidates.into_iter().enumerate() {
        if candidate_id(&candidate).is_none() {
            let id = synthesize_id(&candidate, index, batch_started);
            if let Some(map) = candidate.as_object_mut() {
                map.insert("id".to_string(), Value::String(id));
            }
        }

        match serde_json::from_value::<FlightRecord>(candidate) {
            Ok(flight) if flight.price >= 0.0 => outcome.flights.push(flight),
            Ok(flight) => {
                let err = AppError::ValidationError(format!(
                    "price {} on candidate '{}' is negative",
                    flight.price, flight.id
                ));
                debug!(index, error = %err, "dropping candidate with negative price");
                outcome.dropped += 1;
            }
            Err(e) => {
                let err = AppError::ValidationError(e.to_string());
                debug!(index, error = %err, "dropping candidate that failed schema validation");
                outcome.dropped += 1;
            }
        }
    }

    outcome
}

fn candidate_id(candidate: &Value) -> Option<&str> {
    candidate
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Deterministic per-call identifier for a candidate the provider returned
/// without one: the dedup-relevant fields plus the batch position and a
/// batch-local timestamp, rendered as opaque URL-safe base64.
fn synthesize_id(candidate: &Value, index: usize, batch_started: DateTime<Utc>) -> String {
    let origin = candidate
        .get("origin")
        .and_then(Value::as_str)
        .unwrap_or("unk");
    let destination = candidate
        .get("destination")
        .and_then(Value::as_str)
        .unwrap_or("unk");
    let price = candidate.get("price").and_then(Value::as_f64).unwrap_or(0.0);
    let seed = format!(
        "{origin}|{destination}|{price}|{index}|{}",
        batch_started.timestamp_millis()
    );
    URL_SAFE_NO_PAD.encode(seed)
}
