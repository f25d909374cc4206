//! Error types for the remote adapter.

use qsweep_hal::HalError;
use thiserror::Error;

/// Result type for remote sampler operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur when talking to a remote annealer.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing API token.
    #[error("Missing API token: set QSWEEP_REMOTE_TOKEN environment variable")]
    MissingToken,

    /// Missing API endpoint.
    #[error("Missing API endpoint: set QSWEEP_REMOTE_URL or the sampler endpoint")]
    MissingEndpoint,

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Problem not found.
    #[error("Problem not found: {0}")]
    ProblemNotFound(String),

    /// Problem failed on the solver.
    #[error("Problem failed: {0}")]
    ProblemFailed(String),

    /// Problem was cancelled before completion.
    #[error("Problem cancelled: {0}")]
    ProblemCancelled(String),

    /// Timeout waiting for problem completion.
    #[error("Timeout waiting for problem: {0}")]
    Timeout(String),

    /// Problem reported a status the client does not know.
    #[error("Problem {id} has unknown status '{status}'")]
    UnknownStatus { id: String, status: String },

    /// Completed problem returned an answer that does not fit the request.
    #[error("Malformed answer: {0}")]
    MalformedAnswer(String),
}

impl From<RemoteError> for HalError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Http(e) => HalError::Network(e),
            RemoteError::Json(e) => HalError::Serialization(e),
            RemoteError::MissingToken => HalError::AuthenticationFailed(e.to_string()),
            RemoteError::ApiError { status: 401, .. } => {
                HalError::AuthenticationFailed(e.to_string())
            }
            RemoteError::MissingEndpoint => HalError::Configuration(e.to_string()),
            RemoteError::ProblemFailed(msg) => HalError::JobFailed(msg),
            RemoteError::ProblemCancelled(id) => HalError::JobFailed(format!("{id} was cancelled")),
            RemoteError::Timeout(id) => HalError::Timeout(id),
            RemoteError::MalformedAnswer(msg) => HalError::MalformedBatch(msg),
            _ => HalError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_display() {
        assert!(RemoteError::MissingToken.to_string().contains("QSWEEP_REMOTE_TOKEN"));
    }

    #[test]
    fn test_api_error_display() {
        let err = RemoteError::ApiError {
            status: 503,
            message: "Service unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("Service unavailable"));
    }

    #[test]
    fn test_missing_token_to_hal() {
        let hal: HalError = RemoteError::MissingToken.into();
        assert!(matches!(hal, HalError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_unauthorized_to_hal() {
        let hal: HalError = RemoteError::ApiError {
            status: 401,
            message: "bad token".into(),
        }
        .into();
        assert!(matches!(hal, HalError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_malformed_answer_to_hal() {
        let hal: HalError = RemoteError::MalformedAnswer("no energies".into()).into();
        assert!(matches!(hal, HalError::MalformedBatch(msg) if msg == "no energies"));
    }

    #[test]
    fn test_timeout_to_hal() {
        let hal: HalError = RemoteError::Timeout("p-42".into()).into();
        assert!(matches!(hal, HalError::Timeout(id) if id == "p-42"));
    }

    #[test]
    fn test_json_error_to_hal() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let hal: HalError = RemoteError::from(err).into();
        assert!(matches!(hal, HalError::Serialization(_)));
    }

    #[test]
    fn test_api_error_to_hal() {
        let hal: HalError = RemoteError::ApiError {
            status: 500,
            message: "internal".into(),
        }
        .into();
        assert!(matches!(hal, HalError::Backend(_)));
    }
}
