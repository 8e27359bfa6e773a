//! Resolution of recommendation flight references into booking links.

use tracing::debug;

use crate::models::flights::FlightRecord;
use crate::models::recommendations::{FlightRecommendation, RecommendationSet};

/// Backfills booking links on the primary recommendation and, independently,
/// on every alternative.
pub fn enrich_recommendations(
    mut set: RecommendationSet,
    flights: &[FlightRecord],
) -> RecommendationSet {
    set.recommendation = enrich_recommendation(set.recommendation, flights);
    set.alternatives = set.alternatives.map(|alternatives| {
        alternatives
            .into_iter()
            .map(|alt| enrich_recommendation(alt, flights))
            .collect()
    });
    set
}

/// Resolves the recommendation's flight ids against the combined flight set
/// and fills in link fields. The id fields are never rewritten.
///
/// An explicitly-set, non-empty primary link is left untouched. When both
/// legs resolve, the outbound deep link doubles as the primary booking CTA;
/// this is a best-effort stand-in, not a true combined itinerary link. When
/// nothing resolves the recommendation passes through unmodified.
pub fn enrich_recommendation(
    mut rec: FlightRecommendation,
    flights: &[FlightRecord],
) -> FlightRecommendation {
    if rec
        .booking_link
        .as_deref()
        .is_some_and(|link| !link.is_empty())
    {
        return rec;
    }

    let outbound = flights.iter().find(|f| f.id == rec.outbound_flight_id);
    let inbound = rec
        .return_flight_id
        .as_deref()
        .and_then(|id| flights.iter().find(|f| f.id == id));

    match (outbound, inbound) {
        (Some(out), Some(back)) => {
            rec.return_booking_link = Some(back.deep_link.clone());
            rec.outbound_booking_link = Some(out.deep_link.clone());
            rec.booking_link = Some(out.deep_link.clone());
        }
        (Some(out), None) => {
            rec.outbound_booking_link = Some(out.deep_link.clone());
            rec.booking_link = Some(out.deep_link.clone());
        }
        (None, _) => {
            debug!(
                outbound_flight_id = %rec.outbound_flight_id,
                "recommendation references no known flight, leaving it unmodified"
            );
        }
    }
    rec
}
