//! Moderation endpoints
//!
//! Reached through signed capability links only; there is no moderator
//! login. The token in the path authorizes the action for exactly one
//! asset.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::assets::AssetResponse;
use crate::data::ModerationStatus;
use crate::error::AppError;
use crate::service::ModerationService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveParams {
    /// Kept as a raw string so that non-numeric values reach the service's
    /// own rejection instead of failing query deserialization.
    status: Option<String>,
}

/// GET /moderate/:token
///
/// Returns the asset's current details for human review. The page
/// rendering around this data lives in the frontend.
async fn review_asset(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AssetResponse>, AppError> {
    let service = ModerationService::new(state.db.clone(), &state.config.signing.secret_key);
    let asset = service.review(&token).await?;

    Ok(Json(AssetResponse::from_asset(
        &asset,
        &state.config.server.asset_base_url,
    )))
}

/// GET /moderate/:token/save?status=<int>
///
/// `status` must be 1 (approve) or 2 (reject). Anything else, missing,
/// out of range or non-numeric, and any state machine violation, is
/// rejected with 401.
async fn save_decision(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<SaveParams>,
) -> Result<Json<AssetResponse>, AppError> {
    let requested = params
        .status
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(ModerationStatus::from_i64);

    let service = ModerationService::new(state.db.clone(), &state.config.signing.secret_key);
    let asset = service.moderate(&token, requested).await?;

    Ok(Json(AssetResponse::from_asset(
        &asset,
        &state.config.server.asset_base_url,
    )))
}

/// Create moderation router
pub fn moderate_router() -> Router<AppState> {
    Router::new()
        .route("/moderate/:token", get(review_asset))
        .route("/moderate/:token/save", get(save_decision))
}
