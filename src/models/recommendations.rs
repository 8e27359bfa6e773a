//! Recommendation objects produced by the AI agent.
//!
//! The agent references flights only by id; `services::flight_search::enrichment`
//! resolves those references against the finalized flight set and backfills
//! booking links. The id fields themselves are never rewritten.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecommendation {
    pub outbound_flight_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_flight_id: Option<String>,
    pub total_price: f64,
    /// Short label for the strategy behind this pick, e.g. "cheapest" or
    /// "best value".
    pub strategy: String,
    /// Agent confidence in [0, 1].
    pub confidence: f32,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_booking_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_booking_link: Option<String>,
}

/// The agent's full answer: one primary recommendation, optional alternatives,
/// and the natural-language analysis shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub analysis: String,
    pub recommendation: FlightRecommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<FlightRecommendation>>,
}
