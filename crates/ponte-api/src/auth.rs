//! Pluggable sender verification.
//!
//! The ordering platform can send a shared master key and a restaurant
//! token with each notification, but the exact location differs between
//! integrations, so both the body and the headers are checked tolerantly.
//! Verification is a capability invoked before any processing: it returns
//! a verdict, is independently testable, and is toggled purely by
//! configuration. The default is open access.

use std::sync::Arc;

use axum::http::HeaderMap;
use serde_json::Value;

use crate::config::Config;

/// Body keys that may carry the master key.
const MASTER_KEY_FIELDS: &[&str] = &["master_key", "masterKey"];
/// Header names that may carry the master key.
const MASTER_KEY_HEADERS: &[&str] = &["x-master-key", "master-key"];

/// Body keys that may carry the restaurant token.
const RESTAURANT_TOKEN_FIELDS: &[&str] = &["restaurant_token", "restaurantToken", "token"];
/// Header names that may carry the restaurant token.
const RESTAURANT_TOKEN_HEADERS: &[&str] = &["x-restaurant-token", "restaurant-token"];

/// Outcome of sender verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The notification may be processed.
    Accept,
    /// The notification is dropped; the reason is logged, never surfaced
    /// to the sender.
    Reject {
        /// Which check failed.
        reason: String,
    },
}

/// Verification step run on every notification before processing.
pub trait SenderAuthenticator: Send + Sync {
    /// Checks the request against the configured expectations.
    fn verify(&self, headers: &HeaderMap, payload: &Value) -> Verdict;
}

/// Accepts every notification. Active whenever verification is disabled
/// or incompletely configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl SenderAuthenticator for OpenAccess {
    fn verify(&self, _headers: &HeaderMap, _payload: &Value) -> Verdict {
        Verdict::Accept
    }
}

/// Compares the provided master key and restaurant token against
/// configured expected values. Both must match.
#[derive(Debug, Clone)]
pub struct SharedSecretAuthenticator {
    master_key: String,
    restaurant_token: String,
}

impl SharedSecretAuthenticator {
    /// Creates an authenticator expecting the given pair.
    pub fn new(master_key: impl Into<String>, restaurant_token: impl Into<String>) -> Self {
        Self { master_key: master_key.into(), restaurant_token: restaurant_token.into() }
    }
}

impl SenderAuthenticator for SharedSecretAuthenticator {
    fn verify(&self, headers: &HeaderMap, payload: &Value) -> Verdict {
        let provided_master = provided_value(headers, payload, MASTER_KEY_FIELDS, MASTER_KEY_HEADERS);
        if provided_master != self.master_key {
            return Verdict::Reject { reason: "invalid master key".to_string() };
        }

        let provided_token =
            provided_value(headers, payload, RESTAURANT_TOKEN_FIELDS, RESTAURANT_TOKEN_HEADERS);
        if provided_token != self.restaurant_token {
            return Verdict::Reject { reason: "invalid restaurant token".to_string() };
        }

        Verdict::Accept
    }
}

/// Selects the authenticator for a configuration.
///
/// The shared-secret check is active only when the toggle is on AND both
/// expected values are configured; anything less falls back to open
/// access, matching the opt-in nature of the sender check.
pub fn from_config(config: &Config) -> Arc<dyn SenderAuthenticator> {
    match (&config.gloria_master_key, &config.gloria_restaurant_token) {
        (Some(master), Some(token)) if config.sender_verification => {
            Arc::new(SharedSecretAuthenticator::new(master.clone(), token.clone()))
        },
        _ => Arc::new(OpenAccess),
    }
}

/// Looks up a credential in the body first, then the headers. A value
/// that is absent everywhere compares as the empty string.
fn provided_value(
    headers: &HeaderMap,
    payload: &Value,
    body_fields: &[&str],
    header_names: &[&str],
) -> String {
    body_fields
        .iter()
        .find_map(|field| coerce_string(payload.get(field)?))
        .or_else(|| {
            header_names
                .iter()
                .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()).map(String::from))
        })
        .unwrap_or_default()
}

/// Credentials occasionally arrive as JSON numbers; compare them as text.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
