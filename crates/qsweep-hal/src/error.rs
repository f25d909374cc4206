//! Error types for the HAL crate.

use thiserror::Error;

use qsweep_model::ModelError;

/// Errors that can occur in sampler operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Sampler is not available.
    #[error("Sampler not available: {0}")]
    BackendUnavailable(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Model exceeds sampler capabilities.
    #[error("Model exceeds sampler capabilities: {0}")]
    ModelTooLarge(String),

    /// Invalid number of reads.
    #[error("Invalid reads: {0}")]
    InvalidReads(String),

    /// Anneal schedule is malformed or unsupported.
    #[error("Invalid anneal schedule: {0}")]
    InvalidSchedule(String),

    /// Reverse-anneal seed state does not fit the model.
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    /// Sampler returned a batch that violates the call contract.
    #[error("Malformed sample batch: {0}")]
    MalformedBatch(String),

    /// Sampler rejected the model or request.
    #[error("Request rejected: {}", reasons.join("; "))]
    Rejected {
        /// Reasons reported by validation.
        reasons: Vec<String>,
    },

    /// Sampling job failed on the backend.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model evaluation error.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout waiting for a sampling job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Unsupported feature.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_joins_reasons() {
        let err = HalError::Rejected {
            reasons: vec!["too many variables".into(), "reverse unsupported".into()],
        };
        assert_eq!(
            err.to_string(),
            "Request rejected: too many variables; reverse unsupported"
        );
    }

    #[test]
    fn test_model_error_converts() {
        let err: HalError = ModelError::StateLength {
            expected: 4,
            actual: 3,
        }
        .into();
        assert!(matches!(err, HalError::Model(_)));
        assert!(err.to_string().contains("4 variables"));
    }
}
