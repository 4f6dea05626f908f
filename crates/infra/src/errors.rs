//! Transport-specific error types
//!
//! Provides error classification for delivery attempts with retry metadata.
//! The pipeline itself retries by requeueing; the category metadata exists
//! for callers layering their own policy on top of the transport.

use beacon_domain::TelemetryError;
use thiserror::Error;

/// Categories of transport errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorCategory {
    /// Authentication errors (401, 403) - retry after credential refresh
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration errors - non-retryable
    Config,
}

/// Delivery attempt errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl TransportError {
    /// Get the error category for this error
    pub fn category(&self) -> TransportErrorCategory {
        match self {
            Self::Auth(_) => TransportErrorCategory::Authentication,
            Self::RateLimit(_) => TransportErrorCategory::RateLimit,
            Self::Server(_) => TransportErrorCategory::Server,
            Self::Client(_) => TransportErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => TransportErrorCategory::Network,
            Self::Config(_) => TransportErrorCategory::Config,
        }
    }

    /// Check whether a retry could plausibly succeed
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            TransportErrorCategory::Authentication
                | TransportErrorCategory::RateLimit
                | TransportErrorCategory::Server
                | TransportErrorCategory::Network
        )
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth(format!("collector returned {status}: {body}")),
            429 => Self::RateLimit(format!("collector returned {status}: {body}")),
            500..=599 => Self::Server(format!("collector returned {status}: {body}")),
            _ => Self::Client(format!("collector returned {status}: {body}")),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Convert into the workspace-wide error for the port boundary
impl From<TransportError> for TelemetryError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Config(message) => TelemetryError::Config(message),
            other => TelemetryError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_categories() {
        assert_eq!(
            TransportError::from_status(401, String::new()).category(),
            TransportErrorCategory::Authentication
        );
        assert_eq!(
            TransportError::from_status(429, String::new()).category(),
            TransportErrorCategory::RateLimit
        );
        assert_eq!(
            TransportError::from_status(503, String::new()).category(),
            TransportErrorCategory::Server
        );
        assert_eq!(
            TransportError::from_status(404, String::new()).category(),
            TransportErrorCategory::Client
        );
    }

    #[test]
    fn retryability_follows_category() {
        assert!(TransportError::from_status(500, String::new()).should_retry());
        assert!(TransportError::Network("reset".into()).should_retry());
        assert!(!TransportError::from_status(400, String::new()).should_retry());
        assert!(!TransportError::Config("bad url".into()).should_retry());
    }

    #[test]
    fn config_errors_stay_config_at_the_domain_boundary() {
        let err: TelemetryError = TransportError::Config("bad url".into()).into();
        assert!(matches!(err, TelemetryError::Config(_)));

        let err: TelemetryError = TransportError::Server("boom".into()).into();
        assert!(matches!(err, TelemetryError::Network(_)));
    }
}
