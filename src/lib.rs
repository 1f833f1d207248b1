//! Slotcast - media submission, moderation and weighted scheduling for a
//! shared display network
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                       │
//! │  - Owner asset API (session cookie)                         │
//! │  - Moderation links (capability tokens)                     │
//! │  - Schedule/file exports for the display network            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                           │
//! │  - Moderation state machine                                 │
//! │  - Window clamping, weight calculation                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                             │
//! │  - SQLite (sqlx)                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers, one router per concern
//! - `service`: moderation, scheduling and submission logic
//! - `data`: SQLite repository and row models
//! - `auth`: signed-cookie sessions for submitters
//! - `token`: scoped capability tokens backing moderation links
//! - `config`: layered configuration with startup validation
//! - `error`: the crate-wide error type and its HTTP mapping

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod token;

use std::sync::Arc;

/// Shared handler state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub db: Arc<data::Database>,
}

impl AppState {
    /// Connect the database (running pending migrations) and wrap
    /// everything for sharing across handlers.
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let db = data::Database::connect(&config.database.path).await?;

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
        })
    }
}

/// Assemble the full route tree.
///
/// The binary and the integration tests both go through here, so the two
/// never drift apart in route composition.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::trace::TraceLayer;

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/robots.txt", axum::routing::get(robots_txt))
        .merge(api::moderate_router())
        .merge(api::export_router())
        .nest("/api", api::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Server base URL is not a valid CORS origin; cross-origin requests disabled"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn robots_txt() -> &'static str {
    "User-Agent: *\nDisallow: /\n"
}
