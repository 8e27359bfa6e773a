use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::flights::{FlightRecord, FlightSearchRequest};
use crate::models::recommendations::RecommendationSet;

/// Token and cost usage reported by the agent runtime for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentUsage {
    pub tokens: u64,
    pub cost_usd: f64,
}

/// What the agent runtime reports back for one delegated run.
///
/// A structured `Failure` keeps the agent's own message/code/recoverable
/// triple plus whatever partial usage it accrued; an `Err(AppError)` from the
/// trait method is treated by the orchestrator as an uncaught execution
/// failure with zeroed usage.
#[derive(Debug, Clone)]
pub enum AgentRunOutcome {
    Success {
        recommendations: RecommendationSet,
        usage: AgentUsage,
    },
    Failure {
        message: String,
        code: String,
        recoverable: bool,
        usage: AgentUsage,
    },
}

/// Everything the agent needs to analyze a finalized flight set.
#[derive(Debug, Clone)]
pub struct RecommendationInput {
    pub request: FlightSearchRequest,
    pub outbound_flights: Vec<FlightRecord>,
    pub return_flights: Option<Vec<FlightRecord>>,
}

/// Trait defining the interface to the AI recommendation runtime.
///
/// The runtime receives the finalized flight set and returns recommendation
/// objects referencing flights by id, together with a natural-language
/// analysis payload.
#[async_trait]
pub trait RecommendationProducer: Send + Sync {
    async fn recommend(&self, input: RecommendationInput) -> Result<AgentRunOutcome, AppError>;
}
