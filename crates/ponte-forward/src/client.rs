//! HTTP client for the invoicing API's documents endpoint.
//!
//! Handles request construction, response capture, and error
//! categorization. One outbound POST per incoming order, bounded by the
//! configured timeout.

use std::time::Duration;

use ponte_core::InvoiceDocument;
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use crate::error::{ForwardError, Result};

/// Default documents endpoint of the invoicing API.
pub const DEFAULT_DOCUMENTS_URL: &str = "https://www.vendus.pt/ws/v1.1/documents";

/// Maximum response body length captured for logging.
const MAX_CAPTURED_BODY: usize = 4 * 1024;

/// Configuration for the forwarding client.
///
/// The documents URL is configuration rather than a constant: the accepted
/// document schema is owned and versioned by the external API, and
/// deployments point at the contract revision they were validated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Document-creation endpoint URL.
    pub documents_url: String,
    /// Timeout for the outbound request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            documents_url: DEFAULT_DOCUMENTS_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: "Ponte-Order-Relay/1.0".to_string(),
        }
    }
}

/// What the invoicing API answered to an accepted document.
#[derive(Debug, Clone)]
pub struct ForwardReceipt {
    /// HTTP status code (2xx).
    pub status: u16,
    /// Response body, truncated to a loggable size.
    pub body: String,
}

/// HTTP client for creating invoice documents.
///
/// Reuses one pooled `reqwest` client across requests. Categorizes
/// failures so the caller can log them with status and body when the API
/// answered, and with the transport message when it did not.
#[derive(Debug, Clone)]
pub struct VendusClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl VendusClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::Configuration` if the underlying HTTP client
    /// cannot be built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ForwardError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// The endpoint this client posts documents to.
    pub fn documents_url(&self) -> &str {
        &self.config.documents_url
    }

    /// Sends a document-creation request.
    ///
    /// # Errors
    ///
    /// - `Network` for connection failures
    /// - `Timeout` when the bounded timeout elapses
    /// - `Api` for any non-2xx response, carrying status and body
    pub async fn create_document(&self, document: &InvoiceDocument) -> Result<ForwardReceipt> {
        let span = info_span!(
            "create_document",
            url = %self.config.documents_url,
            lines = document.lines.len(),
        );

        async move {
            tracing::debug!("posting invoice document");

            let response = self
                .client
                .post(&self.config.documents_url)
                .header("X-Ponte-Relayed-At", chrono::Utc::now().to_rfc3339())
                .json(document)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        ForwardError::timeout(self.config.timeout.as_secs())
                    } else if e.is_connect() {
                        ForwardError::network(format!("connection failed: {e}"))
                    } else {
                        ForwardError::network(e.to_string())
                    }
                })?;

            let status = response.status().as_u16();
            let is_success = response.status().is_success();
            let body = capture_body(response).await;

            tracing::debug!(status, "invoicing API answered");

            if is_success {
                Ok(ForwardReceipt { status, body })
            } else {
                Err(ForwardError::api(status, body))
            }
        }
        .instrument(span)
        .await
    }
}

/// Reads a response body, truncated to a loggable size.
async fn capture_body(response: reqwest::Response) -> String {
    match response.bytes().await {
        Ok(bytes) if bytes.len() > MAX_CAPTURED_BODY => {
            let truncated = String::from_utf8_lossy(&bytes[..MAX_CAPTURED_BODY]);
            format!("{truncated}... (truncated)")
        },
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("[failed to read response body: {e}]"),
    }
}
