//! Error types for the GitHub client

use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to GitHub
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Request quota exhausted
    #[error("rate limited, retry after {}s", .retry_after.as_secs())]
    RateLimited {
        /// Delay advised by the server
        retry_after: Duration,
    },

    /// Secondary rate limit / abuse detection tripped
    #[error("abuse detection triggered, retry after {}s", .retry_after.as_secs())]
    AbuseDetected {
        /// Delay advised by the server
        retry_after: Duration,
    },

    /// Write rejected because the target changed or already exists
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// GraphQL request returned errors
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if this is a write conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Network failures and 5xx responses, worth retrying as-is
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => self.is_server_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_helpers() {
        assert!(ClientError::api_error(502, "bad gateway").is_transient());
        assert!(!ClientError::api_error(404, "missing").is_transient());
        assert!(ClientError::api_error(404, "missing").is_not_found());
        assert!(ClientError::NotFound("org".to_string()).is_not_found());
        assert!(
            ClientError::Conflict {
                message: "exists".to_string()
            }
            .is_conflict()
        );
        assert!(
            !ClientError::RateLimited {
                retry_after: Duration::from_secs(1)
            }
            .is_transient()
        );
    }

    #[test]
    fn test_rate_limit_message() {
        let err = ClientError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert_eq!(err.to_string(), "rate limited, retry after 42s");
    }
}
