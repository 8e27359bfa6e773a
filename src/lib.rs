pub mod config;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod services;

// Re-export the service entry points for convenience
pub use config::AgentConfig;
pub use services::flight_search::{FlightSearchOutput, FlightSearchService};

// Conditionally compile test helpers only when testing
// pub mod test_helpers; // Now unconditionally compiled
pub mod test_helpers;
