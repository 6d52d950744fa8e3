//! Leadboard API Server
//!
//! Main entry point for the affiliate dashboard backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadboard_api::{AppState, create_router};
use leadboard_shared::{AppConfig, JwtConfig, JwtService};
use leadboard_store::{Workbook, connect, ensure_headers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.admin.password_hash.is_empty() {
        warn!("No admin password hash configured; admin login is disabled");
    }

    // Connect to the spreadsheet
    let store = connect(&config.sheets).context("Failed to configure spreadsheet backend")?;
    info!(backend = store.backend_tag(), "Spreadsheet backend configured");

    let created = ensure_headers(store.as_ref(), &config.sheets.tabs)
        .await
        .context("Failed to prepare spreadsheet tabs")?;
    if !created.is_empty() {
        info!(tabs = ?created, "Wrote missing tab headers");
    }

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_secs: i64::try_from(config.jwt.access_token_expiry_secs)
            .context("Session lifetime out of range")?,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create application state
    let state = AppState {
        workbook: Arc::new(Workbook::from_config(store, &config)),
        jwt_service: Arc::new(jwt_service),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
