//! Concurrent fan-out of provider searches, one call per pair.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::AppError;
use crate::models::flights::SearchPair;

use super::extraction::{self, ProviderResponse};

/// One provider search, scoped to a single origin/destination pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

/// Trait defining the interface to the upstream flight search provider.
///
/// A zero-result search must return an empty-shaped response, not an error;
/// transport or availability failures may return `Err` and are absorbed
/// per-pair by the executor.
#[async_trait]
pub trait FlightSearchProvider: Send + Sync {
    async fn search(&self, query: &ProviderQuery) -> Result<ProviderResponse, AppError>;
}

/// What one pair contributed after its provider call and extraction.
#[derive(Debug)]
pub struct PairOutcome {
    pub pair: SearchPair,
    pub candidates: Vec<Value>,
    pub call_failed: bool,
    pub used_text_fallback: bool,
}

/// Issues one search per pair, all concurrently with no cap, and joins them.
///
/// A failing call is logged and degrades to zero candidates for that pair; it
/// never aborts siblings and never propagates. Outcome order matches pair
/// order regardless of completion order.
#[instrument(skip(provider, pairs), fields(pair_count = pairs.len()))]
pub async fn search_all_pairs(
    provider: &dyn FlightSearchProvider,
    pairs: &[SearchPair],
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
) -> Vec<PairOutcome> {
    let searches: Vec<_> = pairs
        .iter()
        .map(|pair| {
            let query = ProviderQuery {
                origin: pair.origin.clone(),
                destination: pair.destination.clone(),
                departure_date,
                return_date,
            };
            async move {
                match provider.search(&query).await {
                    Ok(response) => {
                        let outcome = extraction::extract_candidates(response);
                        debug!(
                            origin = %query.origin,
                            destination = %query.destination,
                            candidates = outcome.candidates.len(),
                            "pair search completed"
                        );
                        PairOutcome {
                            pair: pair.clone(),
                            candidates: outcome.candidates,
                            call_failed: false,
                            used_text_fallback: outcome.used_text_fallback,
                        }
                    }
                    Err(e) => {
                        warn!(
                            origin = %query.origin,
                            destination = %query.destination,
                            error = %e,
                            "pair search failed, continuing with zero results"
                        );
                        PairOutcome {
                            pair: pair.clone(),
                            candidates: Vec::new(),
                            call_failed: true,
                            used_text_fallback: false,
                        }
                    }
                }
            }
        })
        .collect();

    join_all(searches).await
}
