//! Error types for outbound document creation.

use thiserror::Error;

/// Result type alias for forwarding operations.
pub type Result<T> = std::result::Result<T, ForwardError>;

/// Failures that can occur while forwarding a document to the invoicing
/// API.
#[derive(Debug, Clone, Error)]
pub enum ForwardError {
    /// Transport-level connectivity failure.
    #[error("network failure reaching invoicing API: {message}")]
    Network {
        /// Error message describing the transport failure.
        message: String,
    },

    /// The bounded request timeout elapsed.
    #[error("invoicing API request timed out after {timeout_seconds}s")]
    Timeout {
        /// Number of seconds before the request timed out.
        timeout_seconds: u64,
    },

    /// The invoicing API answered with a non-2xx status.
    #[error("invoicing API rejected the document: HTTP {status}")]
    Api {
        /// HTTP status code of the rejection.
        status: u16,
        /// Response body content, truncated for logging.
        body: String,
    },

    /// The HTTP client could not be constructed.
    #[error("invalid forwarding configuration: {message}")]
    Configuration {
        /// Configuration error message.
        message: String,
    },
}

impl ForwardError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates an API rejection from a response.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api { status, body: body.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether the process can keep serving after this failure.
    ///
    /// Every forwarding failure is recoverable in the relay's sense: the
    /// request is logged and abandoned, nothing is retried, and the
    /// process never terminates. Only a configuration failure points at
    /// the deployment rather than the individual request.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }

    /// HTTP status of the failure, when the API answered at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_failures_identified() {
        assert!(ForwardError::network("connection refused").is_recoverable());
        assert!(ForwardError::timeout(15).is_recoverable());
        assert!(ForwardError::api(422, "invalid document").is_recoverable());
        assert!(!ForwardError::configuration("bad client settings").is_recoverable());
    }

    #[test]
    fn api_failures_expose_their_status() {
        assert_eq!(ForwardError::api(500, "oops").status(), Some(500));
        assert_eq!(ForwardError::timeout(15).status(), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(
            ForwardError::timeout(15).to_string(),
            "invoicing API request timed out after 15s"
        );
        assert_eq!(
            ForwardError::api(403, "denied").to_string(),
            "invoicing API rejected the document: HTTP 403"
        );
    }
}
