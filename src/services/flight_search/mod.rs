//! Fan-out flight search orchestration.
//!
//! One run moves through a fixed lifecycle: the request is validated and
//! expanded into per-pair search tasks, every pair is searched concurrently,
//! candidates are extracted, validated, deduplicated and ranked per
//! direction, the recommendation agent analyzes the finalized set, and its
//! recommendations are enriched with booking links. The whole outcome is
//! wrapped in an `ExecutionEnvelope`: Initialized → Executing → terminal
//! Success or Failure, with no retry state; a retry is a new run.

pub mod dedup;
pub mod enrichment;
pub mod executor;
pub mod extraction;
pub mod pairs;
pub mod validation;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::errors::AppError;
use crate::llm::{AgentRunOutcome, AgentUsage, RecommendationInput};
use crate::models::envelope::{ExecutionEnvelope, ExecutionFailure, ExecutionMeta};
use crate::models::flights::{Direction, FlightRecord, FlightSearchRequest, SearchPair};
use crate::models::recommendations::FlightRecommendation;

use executor::FlightSearchProvider;

/// Pair counts above this per direction get a warning: fan-out is uncapped,
/// so large lists translate directly into provider load.
const FAN_OUT_WARN_THRESHOLD: usize = 10;

/// Successful output of one orchestrated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchOutput {
    pub outbound_flights: Vec<FlightRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_flights: Option<Vec<FlightRecord>>,
    pub analysis: String,
    pub recommendation: FlightRecommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<FlightRecommendation>>,
}

#[derive(Debug, Default)]
struct SearchCounters {
    failed_pairs: u32,
    dropped_candidates: u32,
    fallback_extractions: u32,
}

impl SearchCounters {
    fn meta(&self, execution_id: Uuid, duration_ms: u64, usage: AgentUsage) -> ExecutionMeta {
        ExecutionMeta {
            execution_id,
            duration_ms,
            tokens_used: usage.tokens,
            cost_usd: usage.cost_usd,
            failed_pairs: self.failed_pairs,
            dropped_candidates: self.dropped_candidates,
            fallback_extractions: self.fallback_extractions,
        }
    }
}

/// Search, validation and dedup results for one direction.
struct DirectionResult {
    flights: Vec<FlightRecord>,
    failed_pairs: u32,
    dropped_candidates: u32,
    fallback_extractions: u32,
}

enum RunError {
    /// Orchestration failed outright; mapped through the error taxonomy with
    /// usage metadata zeroed.
    Fatal(AppError),
    /// The delegated agent call reported a structured failure; its own
    /// message/code/recoverable triple and partial usage are kept.
    Agent {
        message: String,
        code: String,
        recoverable: bool,
        usage: AgentUsage,
    },
}

struct RequestDates {
    departure: NaiveDate,
    return_date: Option<NaiveDate>,
}

pub struct FlightSearchService {
    config: AgentConfig,
}

impl FlightSearchService {
    /// Both collaborators arrive injected via `AgentConfig`; there is no
    /// process-wide configuration state.
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    /// Runs one orchestrated search and always returns an envelope.
    ///
    /// Component-local degradations (a failed pair, a dropped candidate) are
    /// absorbed and counted into `meta`; only total-operation failures make
    /// the envelope unsuccessful. An agent failure fails the whole envelope
    /// even when flight data was gathered.
    #[instrument(skip(self, request), fields(
        origins = request.origins.len(),
        destinations = request.destinations.len(),
        round_trip = request.return_date.is_some()
    ))]
    pub async fn run(&self, request: FlightSearchRequest) -> ExecutionEnvelope<FlightSearchOutput> {
        let execution_id = Uuid::new_v4();
        let started = std::time::Instant::now();
        info!(%execution_id, "starting flight search run");

        let mut counters = SearchCounters::default();
        let result = self.execute(&request, &mut counters).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok((output, usage)) => {
                info!(
                    %execution_id,
                    duration_ms,
                    outbound = output.outbound_flights.len(),
                    tokens = usage.tokens,
                    "flight search run succeeded"
                );
                ExecutionEnvelope::success(output, counters.meta(execution_id, duration_ms, usage))
            }
            Err(RunError::Agent {
                message,
                code,
                recoverable,
                usage,
            }) => {
                error!(%execution_id, %code, "recommendation agent reported failure");
                ExecutionEnvelope::failure(
                    ExecutionFailure {
                        message,
                        code,
                        recoverable,
                    },
                    counters.meta(execution_id, duration_ms, usage),
                )
            }
            Err(RunError::Fatal(err)) => {
                error!(%execution_id, error = %err, "flight search run failed");
                ExecutionEnvelope::failure(
                    ExecutionFailure::from_app_error(&err),
                    counters.meta(execution_id, duration_ms, AgentUsage::default()),
                )
            }
        }
    }

    async fn execute(
        &self,
        request: &FlightSearchRequest,
        counters: &mut SearchCounters,
    ) -> Result<(FlightSearchOutput, AgentUsage), RunError> {
        let dates = validate_request(request).map_err(RunError::Fatal)?;

        let outbound_pairs =
            pairs::expand_pairs(&request.origins, &request.destinations).map_err(RunError::Fatal)?;
        // Return pairs are an independent swapped expansion, not a reuse of
        // the outbound set.
        let return_pairs = match dates.return_date {
            Some(_) => Some(
                pairs::expand_pairs(&request.destinations, &request.origins)
                    .map_err(RunError::Fatal)?,
            ),
            None => None,
        };
        if outbound_pairs.len() > FAN_OUT_WARN_THRESHOLD {
            warn!(
                pair_count = outbound_pairs.len(),
                "large uncapped fan-out, expect provider rate pressure"
            );
        }

        let provider = self.config.provider.as_ref();
        let (outbound, inbound) = tokio::join!(
            search_direction(
                provider,
                &outbound_pairs,
                dates.departure,
                dates.return_date,
                Direction::Outbound
            ),
            async {
                match (&return_pairs, dates.return_date) {
                    (Some(pairs), Some(date)) => Some(
                        search_direction(provider, pairs, date, None, Direction::Return).await,
                    ),
                    _ => None,
                }
            }
        );

        absorb(counters, &outbound);
        if let Some(inbound) = &inbound {
            absorb(counters, inbound);
        }

        let outbound_flights = outbound.flights;
        let return_flights = inbound.map(|d| d.flights);
        info!(
            outbound = outbound_flights.len(),
            inbound = return_flights.as_ref().map_or(0, Vec::len),
            failed_pairs = counters.failed_pairs,
            dropped = counters.dropped_candidates,
            "flight gathering complete, delegating to recommendation agent"
        );

        let outcome = self
            .config
            .producer
            .recommend(RecommendationInput {
                request: request.clone(),
                outbound_flights: outbound_flights.clone(),
                return_flights: return_flights.clone(),
            })
            .await
            .map_err(RunError::Fatal)?;

        match outcome {
            AgentRunOutcome::Success {
                recommendations,
                usage,
            } => {
                let combined: Vec<FlightRecord> = outbound_flights
                    .iter()
                    .chain(return_flights.iter().flatten())
                    .cloned()
                    .collect();
                let enriched = enrichment::enrich_recommendations(recommendations, &combined);
                Ok((
                    FlightSearchOutput {
                        outbound_flights,
                        return_flights,
                        analysis: enriched.analysis,
                        recommendation: enriched.recommendation,
                        alternatives: enriched.alternatives,
                    },
                    usage,
                ))
            }
            AgentRunOutcome::Failure {
                message,
                code,
                recoverable,
                usage,
            } => Err(RunError::Agent {
                message,
                code,
                recoverable,
                usage,
            }),
        }
    }
}

/// Fans out, extracts, validates, dedups and ranks one direction.
async fn search_direction(
    provider: &dyn FlightSearchProvider,
    pairs: &[SearchPair],
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    direction: Direction,
) -> DirectionResult {
    // The round trip is reassembled from two independently searched, tagged
    // result sets: outbound queries carry the trip's return date for
    // providers that price by travel window, return-leg queries depart on
    // the return date.
    let outcomes = executor::search_all_pairs(provider, pairs, departure_date, return_date).await;

    let mut failed_pairs = 0;
    let mut fallback_extractions = 0;
    let mut candidates = Vec::new();
    for outcome in outcomes {
        if outcome.call_failed {
            failed_pairs += 1;
        }
        if outcome.used_text_fallback {
            fallback_extractions += 1;
        }
        candidates.extend(outcome.candidates);
    }

    let validated = validation::validate_candidates(candidates, Utc::now());
    let merged = dedup::dedup_and_tag(validated.flights, direction);
    let ranked = dedup::rank_by_price(merged);

    DirectionResult {
        flights: ranked,
        failed_pairs,
        dropped_candidates: validated.dropped,
        fallback_extractions,
    }
}

fn absorb(counters: &mut SearchCounters, result: &DirectionResult) {
    counters.failed_pairs += result.failed_pairs;
    counters.dropped_candidates += result.dropped_candidates;
    counters.fallback_extractions += result.fallback_extractions;
}

/// Rejects malformed requests before any search begins.
fn validate_request(request: &FlightSearchRequest) -> Result<RequestDates, AppError> {
    if request.origins.is_empty() {
        return Err(AppError::InvalidInput(
            "origin airport list must not be empty".to_string(),
        ));
    }
    if request.destinations.is_empty() {
        return Err(AppError::InvalidInput(
            "destination airport list must not be empty".to_string(),
        ));
    }
    let departure = parse_date(&request.departure_date, "departureDate")?;
    let return_date = request
        .return_date
        .as_deref()
        .map(|raw| parse_date(raw, "returnDate"))
        .transpose()?;
    if let Some(return_date) = return_date {
        if return_date < departure {
            return Err(AppError::InvalidInput(format!(
                "returnDate {return_date} is before departureDate {departure}"
            )));
        }
    }
    Ok(RequestDates {
        departure,
        return_date,
    })
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::InvalidInput(format!("{field} '{raw}' is not a valid date: {e}")))
}
