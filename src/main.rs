//! Ponte order relay service.
//!
//! Receives order-notification webhooks from the ordering platform and
//! forwards each as an invoice document to the invoicing API. Stateless:
//! startup wires configuration, the outbound client, and the HTTP server,
//! and everything else happens per-request.

use anyhow::Result;
use ponte_api::{AppState, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting ponte order relay");
    info!(
        host = %config.host,
        port = config.port,
        vendus_api_key = %config.masked_api_key(),
        documents_url = %config.vendus_documents_url,
        invoice_type = %config.invoice_type,
        sender_verification = config.sender_verification,
        "Configuration loaded"
    );

    if config.vendus_api_key.is_none() {
        warn!("VENDUS_API_KEY is not set; incoming orders will be logged and dropped");
    }

    let addr = config.parse_server_addr()?;
    let state = AppState::from_config(config)?;

    info!(%addr, "Ponte is ready to receive orders");
    ponte_api::start_server(state, addr).await?;

    info!("Ponte shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
