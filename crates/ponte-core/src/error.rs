//! Relay error taxonomy.
//!
//! The relay knows exactly two failure kinds of its own: a configuration
//! error (the invoicing credential is missing) and a rejected sender.
//! Neither is surfaced to the webhook sender, neither terminates the
//! process; both map to a logged line and an abandoned request. Outbound
//! transport failures live in the forwarding crate.

use thiserror::Error;

/// Errors raised by the relay pipeline before any outbound call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The invoicing API credential is not configured. The request is
    /// dropped without an outbound attempt.
    #[error("invoicing API key is not configured (VENDUS_API_KEY)")]
    MissingCredential,

    /// Sender verification rejected the notification.
    #[error("sender verification failed: {reason}")]
    RejectedSender {
        /// Which check failed.
        reason: String,
    },
}

impl RelayError {
    /// Creates a rejected-sender error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::RejectedSender { reason: reason.into() }
    }

    /// Whether the failure is a deployment configuration problem rather
    /// than a property of the individual request.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }
}
