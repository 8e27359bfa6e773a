// src/errors.rs
use thiserror::Error;

/// Error codes surfaced to clients inside a failed `ExecutionEnvelope`.
pub const CODE_INVALID_INPUT: &str = "INVALID_INPUT";
pub const CODE_CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
pub const CODE_EXECUTION_ERROR: &str = "EXECUTION_ERROR";

// AppError should automatically be Send + Sync if all its fields are.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    // --- Request/Input Errors ---
    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    // --- External Service Errors ---
    #[error("Provider call error: {0}")]
    ProviderCallError(String), // Use String instead of the provider's error type

    #[error("Recommendation agent error: {0}")]
    ExecutionError(String),

    // --- General/Internal Errors ---
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Serialization Error: {0}")]
    SerializationError(String), // Use String instead of serde_json::Error

    #[error("Internal Server Error: {0}")]
    InternalServerErrorGeneric(String),
}

impl AppError {
    /// Machine-checkable code for the envelope error payload.
    pub fn envelope_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => CODE_INVALID_INPUT,
            AppError::ConfigError(_) => CODE_CONFIGURATION_ERROR,
            AppError::ProviderCallError(_)
            | AppError::ExecutionError(_)
            | AppError::ValidationError(_)
            | AppError::SerializationError(_)
            | AppError::InternalServerErrorGeneric(_) => CODE_EXECUTION_ERROR,
        }
    }

    /// Whether a client-side retry of the whole operation is worth attempting.
    ///
    /// Malformed requests and missing configuration will fail identically on
    /// retry; transient provider/agent failures may not.
    pub fn recoverable(&self) -> bool {
        match self {
            AppError::InvalidInput(_) | AppError::ConfigError(_) | AppError::ValidationError(_) => {
                false
            }
            AppError::ProviderCallError(_)
            | AppError::ExecutionError(_)
            | AppError::SerializationError(_)
            | AppError::InternalServerErrorGeneric(_) => true,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerErrorGeneric(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_not_recoverable() {
        let err = AppError::InvalidInput("empty origin list".to_string());
        assert_eq!(err.envelope_code(), CODE_INVALID_INPUT);
        assert!(!err.recoverable());
    }

    #[test]
    fn candidate_validation_failures_are_not_worth_retrying() {
        let err = AppError::ValidationError("missing field `deepLink`".to_string());
        assert_eq!(err.envelope_code(), CODE_EXECUTION_ERROR);
        assert!(!err.recoverable());
    }

    #[test]
    fn provider_failures_are_recoverable() {
        let err = AppError::ProviderCallError("upstream 503".to_string());
        assert_eq!(err.envelope_code(), CODE_EXECUTION_ERROR);
        assert!(err.recoverable());
    }
}
