use std::sync::Arc;

use skylattice::config::AgentConfig;
use skylattice::errors::AppError;
use skylattice::llm::{AgentRunOutcome, AgentUsage};
use skylattice::models::flights::Direction;
use skylattice::models::recommendations::RecommendationSet;
use skylattice::services::flight_search::extraction::ProviderResponse;
use skylattice::services::flight_search::FlightSearchService;
use skylattice::test_helpers::{
    basic_recommendation, basic_request, candidate_json, MockFlightSearchProvider,
    MockRecommendationProducer,
};

fn service(
    provider: Arc<MockFlightSearchProvider>,
    producer: Arc<MockRecommendationProducer>,
) -> FlightSearchService {
    let config = AgentConfig::builder()
        .provider(provider)
        .producer(producer)
        .build()
        .expect("mock config must build");
    FlightSearchService::new(config)
}

#[tokio::test]
async fn multi_origin_results_are_merged_and_ranked_by_price() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![
            candidate_json("mxp-1", "MXP", "BCN", 120.0),
            candidate_json("mxp-2", "MXP", "BCN", 80.0),
        ]),
    );
    provider.script_pair(
        "LIN",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("lin-1", "LIN", "BCN", 95.0)]),
    );

    let svc = service(provider, Arc::new(MockRecommendationProducer::new()));
    let envelope = svc.run(basic_request(&["MXP", "LIN"], &["BCN"])).await;

    assert!(envelope.success);
    let output = envelope.output.unwrap();
    let prices: Vec<f64> = output.outbound_flights.iter().map(|f| f.price).collect();
    assert_eq!(prices, vec![80.0, 95.0, 120.0]);
    let mut ids: Vec<&str> = output
        .outbound_flights
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(output
        .outbound_flights
        .iter()
        .all(|f| f.direction == Some(Direction::Outbound)));
}

#[tokio::test]
async fn identical_offers_from_equivalent_pairs_collapse_to_one() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("dup", "MXP", "BCN", 80.0)]),
    );

    // Two equivalent pair entries trigger two identical searches.
    let svc = service(provider.clone(), Arc::new(MockRecommendationProducer::new()));
    let envelope = svc.run(basic_request(&["MXP", "MXP"], &["BCN"])).await;

    assert_eq!(provider.calls.lock().unwrap().len(), 2);
    let output = envelope.output.unwrap();
    assert_eq!(output.outbound_flights.len(), 1);
    assert_eq!(output.outbound_flights[0].id, "dup");
}

#[tokio::test]
async fn failing_pair_degrades_to_empty_without_sinking_the_batch() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("mxp-1", "MXP", "BCN", 99.0)]),
    );
    provider.fail_pair("LIN", "BCN");

    let svc = service(provider, Arc::new(MockRecommendationProducer::new()));
    let envelope = svc.run(basic_request(&["MXP", "LIN"], &["BCN"])).await;

    assert!(envelope.success);
    let output = envelope.output.unwrap();
    assert_eq!(output.outbound_flights.len(), 1);
    assert_eq!(output.outbound_flights[0].id, "mxp-1");
    assert_eq!(envelope.meta.failed_pairs, 1);
}

#[tokio::test]
async fn round_trip_searches_swapped_pairs_and_tags_directions() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("out-1", "MXP", "BCN", 80.0)]),
    );
    provider.script_pair(
        "BCN",
        "MXP",
        ProviderResponse::Array(vec![candidate_json("back-1", "BCN", "MXP", 70.0)]),
    );

    let svc = service(provider.clone(), Arc::new(MockRecommendationProducer::new()));
    let mut request = basic_request(&["MXP"], &["BCN"]);
    request.return_date = Some("2026-09-21".to_string());
    let envelope = svc.run(request).await;

    let return_date = chrono::NaiveDate::from_ymd_opt(2026, 9, 21).unwrap();
    let calls = provider.calls.lock().unwrap();
    // outbound queries carry the trip's return date, return-leg queries
    // depart on it
    assert!(calls
        .iter()
        .any(|q| q.origin == "MXP"
            && q.destination == "BCN"
            && q.return_date == Some(return_date)));
    assert!(calls
        .iter()
        .any(|q| q.origin == "BCN"
            && q.destination == "MXP"
            && q.departure_date == return_date
            && q.return_date.is_none()));
    drop(calls);

    let output = envelope.output.unwrap();
    assert_eq!(output.outbound_flights[0].direction, Some(Direction::Outbound));
    let return_flights = output.return_flights.unwrap();
    assert_eq!(return_flights[0].direction, Some(Direction::Return));
    assert_eq!(return_flights[0].id, "back-1");
}

#[tokio::test]
async fn recommendation_links_are_backfilled_from_the_final_set() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("F1", "MXP", "BCN", 80.0)]),
    );

    let producer = Arc::new(MockRecommendationProducer::new());
    producer.script(Ok(AgentRunOutcome::Success {
        recommendations: RecommendationSet {
            analysis: "F1 is the best fare".to_string(),
            recommendation: basic_recommendation("F1"),
            alternatives: None,
        },
        usage: AgentUsage {
            tokens: 900,
            cost_usd: 0.003,
        },
    }));

    let svc = service(provider, producer);
    let envelope = svc.run(basic_request(&["MXP"], &["BCN"])).await;

    let output = envelope.output.unwrap();
    assert_eq!(
        output.recommendation.booking_link.as_deref(),
        Some("https://book/F1")
    );
    assert_eq!(
        output.recommendation.outbound_booking_link.as_deref(),
        Some("https://book/F1")
    );
    assert_eq!(envelope.meta.tokens_used, 900);
}

#[tokio::test]
async fn explicit_booking_link_survives_enrichment() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("F1", "MXP", "BCN", 80.0)]),
    );

    let producer = Arc::new(MockRecommendationProducer::new());
    let mut recommendation = basic_recommendation("F1");
    recommendation.booking_link = Some("https://custom".to_string());
    producer.script(Ok(AgentRunOutcome::Success {
        recommendations: RecommendationSet {
            analysis: "hand-picked".to_string(),
            recommendation,
            alternatives: None,
        },
        usage: AgentUsage::default(),
    }));

    let svc = service(provider, producer);
    let envelope = svc.run(basic_request(&["MXP"], &["BCN"])).await;
    assert_eq!(
        envelope.output.unwrap().recommendation.booking_link.as_deref(),
        Some("https://custom")
    );
}

#[tokio::test]
async fn agent_failure_fails_the_whole_envelope_with_its_own_code() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("F1", "MXP", "BCN", 80.0)]),
    );
    let producer = Arc::new(MockRecommendationProducer::scripted_failure(
        "model timed out",
        "AGENT_TIMEOUT",
        true,
        450,
    ));

    let svc = service(provider, producer);
    let envelope = svc.run(basic_request(&["MXP"], &["BCN"])).await;

    assert!(!envelope.success);
    assert!(envelope.output.is_none());
    let error = envelope.error.unwrap();
    assert_eq!(error.code, "AGENT_TIMEOUT");
    assert!(error.recoverable);
    // partial usage reported by the agent is kept
    assert_eq!(envelope.meta.tokens_used, 450);
}

#[tokio::test]
async fn uncaught_agent_error_maps_to_generic_execution_error_with_zeroed_usage() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("F1", "MXP", "BCN", 80.0)]),
    );
    let producer = Arc::new(MockRecommendationProducer::new());
    producer.script(Err(AppError::ExecutionError(
        "connection reset".to_string(),
    )));

    let svc = service(provider, producer);
    let envelope = svc.run(basic_request(&["MXP"], &["BCN"])).await;

    assert!(!envelope.success);
    assert_eq!(envelope.error.unwrap().code, "EXECUTION_ERROR");
    assert_eq!(envelope.meta.tokens_used, 0);
    assert_eq!(envelope.meta.cost_usd, 0.0);
}

#[tokio::test]
async fn empty_origin_list_is_rejected_before_any_provider_call() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    let svc = service(provider.clone(), Arc::new(MockRecommendationProducer::new()));
    let envelope = svc.run(basic_request(&[], &["BCN"])).await;

    assert!(!envelope.success);
    let error = envelope.error.unwrap();
    assert_eq!(error.code, "INVALID_INPUT");
    assert!(!error.recoverable);
    assert!(provider.calls.lock().unwrap().is_empty());
    assert_eq!(envelope.meta.tokens_used, 0);
}

#[tokio::test]
async fn free_text_fallback_is_counted_in_meta() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    let embedded = serde_json::to_string(&vec![candidate_json("F1", "MXP", "BCN", 80.0)]).unwrap();
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Text(format!("Here is what I found: {embedded}")),
    );

    let svc = service(provider, Arc::new(MockRecommendationProducer::new()));
    let envelope = svc.run(basic_request(&["MXP"], &["BCN"])).await;

    assert!(envelope.success);
    assert_eq!(envelope.meta.fallback_extractions, 1);
    assert_eq!(envelope.output.unwrap().outbound_flights.len(), 1);
}

#[tokio::test]
async fn envelope_serializes_with_expected_top_level_shape() {
    let provider = Arc::new(MockFlightSearchProvider::new());
    provider.script_pair(
        "MXP",
        "BCN",
        ProviderResponse::Array(vec![candidate_json("F1", "MXP", "BCN", 80.0)]),
    );

    let svc = service(provider, Arc::new(MockRecommendationProducer::new()));
    let envelope = svc.run(basic_request(&["MXP"], &["BCN"])).await;
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(value["success"], serde_json::json!(true));
    assert!(value["output"]["outboundFlights"].is_array());
    assert!(value.get("error").is_none());
    assert!(value["meta"]["executionId"].is_string());
    assert!(value["meta"]["durationMs"].is_number());
    assert!(value["meta"]["droppedCandidates"].is_number());
}
