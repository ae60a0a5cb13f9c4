//! Order webhook handler and forwarding pipeline.
//!
//! The inbound request is acknowledged with `200 OK` before any outbound
//! work starts; the sender treats a slow or non-2xx response as a failed
//! delivery and re-sends, so downstream latency must never reach it. The
//! pipeline itself runs in a spawned task: verify the sender, require the
//! invoicing credential, extract the order, build the document, forward,
//! log. Nothing in here can take the process down.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;
use ponte_core::{InvoiceDocument, OrderSummary, RelayError};
use ponte_forward::{ForwardError, ForwardReceipt};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::{auth::Verdict, AppState};

/// How a relayed order ended up.
#[derive(Debug)]
pub enum RelayOutcome {
    /// The invoicing API accepted the document.
    Forwarded(ForwardReceipt),
    /// The order was dropped before any outbound attempt.
    Skipped(RelayError),
    /// The outbound call failed; logged and abandoned.
    Failed(ForwardError),
}

/// `POST /` — accepts an order notification.
///
/// Always answers `200 OK` immediately; the forwarding pipeline continues
/// in a spawned task and reports only to the log.
#[instrument(name = "receive_order", skip_all, fields(content_length = body.len()))]
pub async fn receive_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let payload = parse_payload(&body);

    tokio::spawn(async move {
        let outcome = relay_order(&state, &headers, &payload).await;
        log_outcome(&outcome);
    });

    (StatusCode::OK, "OK")
}

/// Runs the forwarding pipeline for one order notification.
///
/// Total: every failure mode collapses into a [`RelayOutcome`] for the
/// caller to log. Exactly one outbound call is made, and only when the
/// sender is accepted and the credential is configured.
pub async fn relay_order(state: &AppState, headers: &HeaderMap, payload: &Value) -> RelayOutcome {
    if let Verdict::Reject { reason } = state.authenticator.verify(headers, payload) {
        return RelayOutcome::Skipped(RelayError::rejected(reason));
    }

    let Some(api_key) = state.config.vendus_api_key.as_deref() else {
        return RelayOutcome::Skipped(RelayError::MissingCredential);
    };

    let order = OrderSummary::from_payload(payload);
    debug!(order_id = %order.id, lines = order.lines.len(), "order extracted");

    let document = InvoiceDocument::from_order(api_key, &state.config.invoice_type, &order);

    match state.forwarder.create_document(&document).await {
        Ok(receipt) => RelayOutcome::Forwarded(receipt),
        Err(error) => RelayOutcome::Failed(error),
    }
}

/// Parses the raw body leniently.
///
/// An empty or malformed body is not an error: the order proceeds with
/// every field defaulted.
fn parse_payload(body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "body is not valid JSON, proceeding with defaults");
        Value::Null
    })
}

fn log_outcome(outcome: &RelayOutcome) {
    match outcome {
        RelayOutcome::Forwarded(receipt) => {
            info!(status = receipt.status, body = %receipt.body, "invoice document accepted");
        },
        RelayOutcome::Skipped(e) if e.is_configuration() => {
            error!(error = %e, "dropping order");
        },
        RelayOutcome::Skipped(e) => {
            warn!(error = %e, "dropping order");
        },
        RelayOutcome::Failed(ForwardError::Api { status, body }) => {
            error!(status, body = %body, "invoicing API rejected the document");
        },
        RelayOutcome::Failed(e) => {
            error!(error = %e, "failed to reach the invoicing API");
        },
    }
}
