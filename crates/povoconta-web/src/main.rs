//! Povo Conta - count what the artworks of a museum depict
//!
//! Browses museum collections on Wikidata and writes the quantity of each
//! depicted subject back as a P1114 qualifier, using the volunteer's own
//! Wikidata account.

mod config;
mod constants;
mod error;
mod locale;
mod routes;
mod session;
mod state;
mod validation;
mod writeback;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("povoconta_web=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env();
    info!(
        port = config.port,
        public_url = ?config.public_url,
        museums = config.museums.len(),
        "Starting povoconta"
    );
    if config.oauth_consumer_key.is_empty() {
        warn!("OAUTH_CONSUMER_KEY is not set; logins will fail");
    }
    if config.museums.is_empty() {
        warn!("No museums configured");
    }

    let state = AppState::new(&config);

    // CORS
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
    };

    let app = routes::create_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(port = config.port, "Listening");

    axum::serve(listener, app).await?;
    Ok(())
}
