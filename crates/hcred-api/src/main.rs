//! # hcred-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the healthcred API.
//! Binds to a configurable port (default 8080).

use hcred_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let auth_token = std::env::var("AUTH_TOKEN").ok();
    let config = AppConfig { port, auth_token };

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = hcred_api::db::init_pool().await.map_err(|e| {
        tracing::error!("database initialization failed: {e}");
        e
    })?;

    // Ledger client from environment.
    let ledger = match hcred_ledger::LedgerConfig::from_env() {
        Ok(ledger_config) => {
            tracing::info!(
                contract = %ledger_config.contract_address,
                chain_id = ledger_config.chain_id,
                "ledger client configured"
            );
            Some(hcred_ledger::LedgerClient::new(ledger_config)?)
        }
        Err(e) => {
            tracing::warn!("ledger client not configured: {e}. Chain-backed endpoints will return 503.");
            None
        }
    };

    // Pinning client from environment.
    let pin = match hcred_ipfs::PinConfig::from_env() {
        Ok(pin_config) => {
            tracing::info!(gateway = %pin_config.gateway_url, "pinning client configured");
            Some(hcred_ipfs::PinClient::new(pin_config)?)
        }
        Err(e) => {
            tracing::warn!("pinning client not configured: {e}. Issuance endpoints will return 503.");
            None
        }
    };

    let state = AppState::with_config(config, ledger, pin, db_pool);

    // Hydrate in-memory stores from the database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("database hydration failed: {e}");
        e
    })?;

    let app = hcred_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("healthcred API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
