//! Dependency injection for the flight search service.
//!
//! Both collaborators are supplied at construction time; there is no global
//! configure-once flag, so concurrent first use from multiple callers is safe
//! by construction.

use std::sync::Arc;

use crate::errors::AppError;
use crate::llm::RecommendationProducer;
use crate::services::flight_search::executor::FlightSearchProvider;

#[derive(Clone)]
pub struct AgentConfig {
    pub provider: Arc<dyn FlightSearchProvider>,
    pub producer: Arc<dyn RecommendationProducer>,
}

impl AgentConfig {
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct AgentConfigBuilder {
    provider: Option<Arc<dyn FlightSearchProvider>>,
    producer: Option<Arc<dyn RecommendationProducer>>,
}

impl AgentConfigBuilder {
    pub fn provider(mut self, provider: Arc<dyn FlightSearchProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn producer(mut self, producer: Arc<dyn RecommendationProducer>) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Fails synchronously when a collaborator is missing, so misconfiguration
    /// surfaces at startup rather than on the first request.
    pub fn build(self) -> Result<AgentConfig, AppError> {
        let provider = self.provider.ok_or_else(|| {
            AppError::ConfigError("flight search provider not configured".to_string())
        })?;
        let producer = self.producer.ok_or_else(|| {
            AppError::ConfigError("recommendation producer not configured".to_string())
        })?;
        Ok(AgentConfig { provider, producer })
    }
}
