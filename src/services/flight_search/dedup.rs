//! Cross-pair deduplication and price ranking for one search direction.

use std::collections::HashSet;

use tracing::debug;

use crate::models::flights::{Direction, FlightRecord};

/// Merges validated records from all pairs of one direction, dropping exact
/// duplicate offers and tagging each survivor with its direction.
///
/// Two records are the same offer when they share origin, destination, price
/// and local departure time; the first occurrence in pair-processing order
/// wins. Outbound and return batches are deduplicated independently, so the
/// same offer may legitimately appear once per direction.
pub fn dedup_and_tag(flights: Vec<FlightRecord>, direction: Direction) -> Vec<FlightRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(flights.len());
    let mut merged = Vec::with_capacity(flights.len());

    for mut flight in flights {
        let key = offer_key(&flight);
        if !seen.insert(key) {
            debug!(id = %flight.id, %direction, "dropping duplicate offer");
            continue;
        }
        flight.direction = Some(direction);
        merged.push(flight);
    }
    merged
}

/// Stable ascending sort by price; equal-price entries keep first-seen order.
pub fn rank_by_price(mut flights: Vec<FlightRecord>) -> Vec<FlightRecord> {
    flights.sort_by(|a, b| a.price.total_cmp(&b.price));
    flights
}

fn offer_key(flight: &FlightRecord) -> String {
    format!(
        "{}|{}|{}|{}",
        flight.origin, flight.destination, flight.price, flight.departure.local
    )
}
