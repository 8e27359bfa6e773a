//! Shared mocks and fixtures for unit and integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm::{AgentRunOutcome, AgentUsage, RecommendationInput, RecommendationProducer};
use crate::models::flights::FlightSearchRequest;
use crate::models::recommendations::{FlightRecommendation, RecommendationSet};
use crate::services::flight_search::executor::{FlightSearchProvider, ProviderQuery};
use crate::services::flight_search::extraction::ProviderResponse;

/// Builds a fully valid candidate object as the provider would return it.
pub fn candidate_json(id: &str, origin: &str, destination: &str, price: f64) -> Value {
    json!({
        "id": id,
        "origin": origin,
        "destination": destination,
        "originCity": origin,
        "destinationCity": destination,
        "departure": {"utc": "2026-09-14T06:00:00Z", "local": "2026-09-14T08:00:00"},
        "arrival": {"utc": "2026-09-14T08:00:00Z", "local": "2026-09-14T10:00:00"},
        "durationSeconds": 7200,
        "price": price,
        "currency": "EUR",
        "deepLink": format!("https://book/{id}")
    })
}

pub fn basic_request(origins: &[&str], destinations: &[&str]) -> FlightSearchRequest {
    FlightSearchRequest {
        origins: origins.iter().map(|c| c.to_string()).collect(),
        destinations: destinations.iter().map(|c| c.to_string()).collect(),
        departure_date: "2026-09-14".to_string(),
        return_date: None,
    }
}

pub fn basic_recommendation(outbound_id: &str) -> FlightRecommendation {
    FlightRecommendation {
        outbound_flight_id: outbound_id.to_string(),
        return_flight_id: None,
        total_price: 80.0,
        strategy: "cheapest".to_string(),
        confidence: 0.9,
        reasoning: "lowest fare in the set".to_string(),
        booking_link: None,
        outbound_booking_link: None,
        return_booking_link: None,
    }
}

/// Provider mock scripted per (origin, destination) pair. Unscripted pairs
/// return an empty array; pairs registered via `fail_pair` return an error.
#[derive(Default)]
pub struct MockFlightSearchProvider {
    responses: Mutex<HashMap<(String, String), Vec<ProviderResponse>>>,
    failing: Mutex<HashSet<(String, String)>>,
    pub calls: Mutex<Vec<ProviderQuery>>,
}

impl MockFlightSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for a pair; repeated calls for the same pair are
    /// served in registration order, the last response repeating thereafter.
    pub fn script_pair(&self, origin: &str, destination: &str, response: ProviderResponse) {
        self.responses
            .lock()
            .expect("provider mock poisoned")
            .entry((origin.to_string(), destination.to_string()))
            .or_default()
            .push(response);
    }

    pub fn fail_pair(&self, origin: &str, destination: &str) {
        self.failing
            .lock()
            .expect("provider mock poisoned")
            .insert((origin.to_string(), destination.to_string()));
    }
}

#[async_trait]
impl FlightSearchProvider for MockFlightSearchProvider {
    async fn search(&self, query: &ProviderQuery) -> Result<ProviderResponse, AppError> {
        self.calls
            .lock()
            .expect("provider mock poisoned")
            .push(query.clone());
        let key = (query.origin.clone(), query.destination.clone());
        if self.failing.lock().expect("provider mock poisoned").contains(&key) {
            return Err(AppError::ProviderCallError("scripted failure".to_string()));
        }
        let mut responses = self.responses.lock().expect("provider mock poisoned");
        match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => Ok(queue.remove(0)),
            Some(queue) => Ok(queue[0].clone()),
            None => Ok(ProviderResponse::Array(Vec::new())),
        }
    }
}

/// Producer mock returning one scripted outcome, or echoing a recommendation
/// for the cheapest outbound flight when left unscripted.
#[derive(Default)]
pub struct MockRecommendationProducer {
    outcome: Mutex<Option<Result<AgentRunOutcome, AppError>>>,
}

impl MockRecommendationProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, outcome: Result<AgentRunOutcome, AppError>) {
        *self.outcome.lock().expect("producer mock poisoned") = Some(outcome);
    }

    pub fn scripted_failure(message: &str, code: &str, recoverable: bool, tokens: u64) -> Self {
        let producer = Self::new();
        producer.script(Ok(AgentRunOutcome::Failure {
            message: message.to_string(),
            code: code.to_string(),
            recoverable,
            usage: AgentUsage {
                tokens,
                cost_usd: 0.0,
            },
        }));
        producer
    }
}

#[async_trait]
impl RecommendationProducer for MockRecommendationProducer {
    async fn recommend(&self, input: RecommendationInput) -> Result<AgentRunOutcome, AppError> {
        if let Some(outcome) = self.outcome.lock().expect("producer mock poisoned").take() {
            return outcome;
        }
        let cheapest = input
            .outbound_flights
            .first()
            .map(|f| f.id.clone())
            .unwrap_or_else(|| "none".to_string());
        Ok(AgentRunOutcome::Success {
            recommendations: RecommendationSet {
                analysis: "picked the cheapest outbound flight".to_string(),
                recommendation: basic_recommendation(&cheapest),
                alternatives: None,
            },
            usage: AgentUsage {
                tokens: 1200,
                cost_usd: 0.004,
            },
        })
    }
}
