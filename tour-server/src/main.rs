//! tour-server — administrative backend for a tour-operator business
//!
//! Long-running HTTP service that:
//! - Manages enquiries, members, tour packages, bookings and payments
//! - Reconciles booking payment status after every payment mutation
//! - Sends payment-reminder SMS through an external gateway
//! - Serves a read-only reporting dashboard

mod api;
mod auth;
mod config;
mod db;
mod error;
mod sms;
mod state;
mod storage;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tour_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting tour-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("tour-server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
