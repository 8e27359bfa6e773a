//! Canonical flight entities exchanged between the search orchestrator, the
//! recommendation agent, and API clients.
//!
//! Field names serialize as camelCase because the provider and the agent both
//! speak the same JSON dialect; the serde derives on `FlightRecord` double as
//! the candidate schema validation (see `services::flight_search::validation`).

use serde::{Deserialize, Serialize};

/// Which half of a round trip a flight belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outbound,
    Return,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Return => "return",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One origin/destination combination to search. Ephemeral, generated per
/// request by the pair expander.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPair {
    pub origin: String,
    pub destination: String,
}

impl SearchPair {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

/// Departure or arrival instant in both UTC and airport-local rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightTimes {
    pub utc: String,
    pub local: String,
}

/// An intermediate stop, ordered chronologically within the itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layover {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

/// Canonical flight offer after candidate validation.
///
/// `id` is unique within one result batch; `price` is never negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub origin_city: String,
    pub destination_city: String,
    pub departure: FlightTimes,
    pub arrival: FlightTimes,
    pub duration_seconds: u32,
    pub price: f64,
    pub currency: String,
    pub deep_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layovers: Option<Vec<Layover>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// Client request driving one orchestrated search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    /// ISO date, e.g. "2026-09-14".
    pub departure_date: String,
    /// Present for round trips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Direction::Outbound).unwrap(),
            json!("outbound")
        );
        assert_eq!(
            serde_json::to_value(Direction::Return).unwrap(),
            json!("return")
        );
    }

    #[test]
    fn flight_record_round_trips_camel_case() {
        let value = json!({
            "id": "F1",
            "origin": "MXP",
            "destination": "BCN",
            "originCity": "Milan",
            "destinationCity": "Barcelona",
            "departure": {"utc": "2026-09-14T06:00:00Z", "local": "2026-09-14T08:00:00"},
            "arrival": {"utc": "2026-09-14T08:00:00Z", "local": "2026-09-14T10:00:00"},
            "durationSeconds": 7200,
            "price": 81.5,
            "currency": "EUR",
            "deepLink": "https://book/F1"
        });
        let record: FlightRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.origin_city, "Milan");
        assert!(record.layovers.is_none());
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn flight_record_rejects_missing_required_fields() {
        let value = json!({
            "id": "F1",
            "origin": "MXP",
            "price": 81.5
        });
        assert!(serde_json::from_value::<FlightRecord>(value).is_err());
    }
}
