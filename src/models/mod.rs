pub mod envelope;
pub mod flights;
pub mod recommendations;

pub use envelope::{ExecutionEnvelope, ExecutionFailure, ExecutionMeta};
pub use flights::{Direction, FlightRecord, FlightSearchRequest, FlightTimes, Layover, SearchPair};
pub use recommendations::{FlightRecommendation, RecommendationSet};
