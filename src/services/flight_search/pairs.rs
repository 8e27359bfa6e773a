//! Expansion of origin/destination lists into per-pair search tasks.

use crate::errors::AppError;
use crate::models::flights::SearchPair;

/// Builds the cross product of origins and destinations, origins as the outer
/// loop. For the return leg the caller invokes this again with the lists
/// swapped; return pairs are never derived from the outbound expansion.
pub fn expand_pairs(origins: &[String], destinations: &[String]) -> Result<Vec<SearchPair>, AppError> {
    if origins.is_empty() {
        return Err(AppError::InvalidInput(
            "origin airport list must not be empty".to_string(),
        ));
    }
    if destinations.is_empty() {
        return Err(AppError::InvalidInput(
            "destination airport list must not be empty".to_string(),
        ));
    }

    let mut pairs = Vec::with_capacity(origins.len() * destinations.len());
    for origin in origins {
        for destination in destinations {
            pairs.push(SearchPair::new(origin.clone(), destination.clone()));
        }
    }
    Ok(pairs)
}
