//! Inbound HTTP surface of the order relay.
//!
//! Provides the axum router (liveness, health, and the webhook endpoint),
//! configuration loading, and the pluggable sender authenticator. The
//! webhook handler acknowledges immediately and hands the order to the
//! forwarding pipeline in a spawned task.

#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use ponte_forward::{ForwardError, VendusClient};

pub use crate::{
    auth::SenderAuthenticator,
    config::Config,
    server::{create_router, start_server},
};

/// Shared application state.
///
/// Everything here is immutable after startup; request handlers share it
/// through cheap `Arc` clones and never coordinate with each other.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<Config>,
    /// Outbound client for the invoicing API.
    pub forwarder: Arc<VendusClient>,
    /// Sender verification step, run before any processing.
    pub authenticator: Arc<dyn SenderAuthenticator>,
}

impl AppState {
    /// Builds the application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::Configuration` if the outbound HTTP client
    /// cannot be constructed.
    pub fn from_config(config: Config) -> Result<Self, ForwardError> {
        let forwarder = VendusClient::new(config.to_client_config())?;
        let authenticator = auth::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            forwarder: Arc::new(forwarder),
            authenticator,
        })
    }
}
