//! API layer
//!
//! HTTP handlers, one router per concern:
//! - `assets`: owner-facing submission management (session-authenticated)
//! - `moderate`: capability-token moderation links
//! - `export`: schedule and file-list exports for the display network
//! - `metrics`: Prometheus text endpoint

pub mod assets;
pub mod export;
pub mod metrics;
pub mod moderate;

use axum::{routing::get, Router};

use crate::AppState;

/// Router for everything under `/api`.
pub fn api_router() -> Router<AppState> {
    assets::assets_router().route("/live", get(export::list_live))
}

pub use export::export_router;
pub use metrics::metrics_router;
pub use moderate::moderate_router;
