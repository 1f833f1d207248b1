//! Owner-facing asset endpoints
//!
//! Authenticated submitters manage their own submissions here. The upload
//! pipeline (byte handling, media inspection, thumbnailing) runs in front
//! of this API and registers its result via POST.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::data::{Asset, AssetKind};
use crate::error::AppError;
use crate::service::{AssetService, ModerationService};
use crate::AppState;

/// Asset details as returned to the owner and the moderation review page.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub id: i64,
    pub status: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub starts: i64,
    pub ends: i64,
    /// Public URL of the stored media file
    pub url: String,
    /// Public URL of the thumbnail
    pub thumb_url: String,
}

impl AssetResponse {
    pub fn from_asset(asset: &Asset, asset_base_url: &str) -> Self {
        Self {
            id: asset.id,
            status: asset.status,
            kind: asset.kind().as_str(),
            starts: asset.starts,
            ends: asset.ends,
            url: format!("{}/{}", asset_base_url, asset.file_name()),
            thumb_url: format!(
                "{}/asset-{}-{}.thumb.jpg",
                asset_base_url, asset.id, asset.secret
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssetListResponse {
    pub assets: Vec<AssetResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    /// "image" or "video", as determined by content inspection upstream
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWindowRequest {
    pub starts: i64,
    pub ends: i64,
}

fn asset_service(state: &AppState) -> AssetService {
    AssetService::new(state.db.clone(), state.config.campaign.clone())
}

/// GET /api/assets
async fn list_assets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AssetListResponse>, AppError> {
    let assets = asset_service(&state).list(user.id).await?;

    Ok(Json(AssetListResponse {
        assets: assets
            .iter()
            .map(|asset| AssetResponse::from_asset(asset, &state.config.server.asset_base_url))
            .collect(),
    }))
}

/// POST /api/assets
///
/// Registers a verified submission. The moderation link is logged for the
/// notification channel to pick up; it is never returned to the submitter,
/// who must not be able to moderate their own content.
async fn create_asset(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateAssetRequest>,
) -> Result<Json<AssetResponse>, AppError> {
    let kind = match req.kind.as_str() {
        "image" => AssetKind::Image,
        "video" => AssetKind::Video,
        other => {
            return Err(AppError::Validation(format!(
                "unsupported asset kind: {}",
                other
            )));
        }
    };

    let asset = asset_service(&state).create(user.id, kind).await?;

    let moderation = ModerationService::new(state.db.clone(), &state.config.signing.secret_key);
    let moderation_url = format!(
        "{}{}",
        state.config.server.base_url(),
        moderation.moderation_path(asset.id)?
    );
    tracing::info!(
        asset_id = asset.id,
        username = %user.username,
        moderation_url = %moderation_url,
        "New submission awaiting moderation"
    );

    Ok(Json(AssetResponse::from_asset(
        &asset,
        &state.config.server.asset_base_url,
    )))
}

/// GET /api/assets/:id
async fn get_asset(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<AssetResponse>, AppError> {
    let asset = asset_service(&state).get(user.id, id).await?;

    Ok(Json(AssetResponse::from_asset(
        &asset,
        &state.config.server.asset_base_url,
    )))
}

/// PATCH /api/assets/:id
///
/// Sets the playback window. The requested range is clamped into the
/// campaign window before persisting, whatever the caller sends.
async fn update_window(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWindowRequest>,
) -> Result<Json<AssetResponse>, AppError> {
    let asset = asset_service(&state)
        .set_window(user.id, id, req.starts, req.ends)
        .await?;

    Ok(Json(AssetResponse::from_asset(
        &asset,
        &state.config.server.asset_base_url,
    )))
}

/// DELETE /api/assets/:id
async fn delete_asset(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = asset_service(&state).delete(user.id, id).await?;

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// Create asset router
pub fn assets_router() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route(
            "/assets/:id",
            get(get_asset).patch(update_window).delete(delete_asset),
        )
}
