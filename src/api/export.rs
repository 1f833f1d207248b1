//! Export and playback-facing endpoints
//!
//! The display network polls these; no authentication, nothing here is
//! secret (asset file names already carry their unguessable secret).

use axum::{extract::State, response::Json, routing::get, Router};

use crate::error::AppError;
use crate::service::{schedule::ScheduleEntry, ScheduleService};
use crate::AppState;

/// GET /export/schedule.json
///
/// JSON array of schedule entries with normalized playback priorities.
/// Serializes to `[]` when nothing qualifies.
async fn export_schedule(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleEntry>>, AppError> {
    let entries = ScheduleService::new(state.db.clone()).export().await?;
    Ok(Json(entries))
}

/// GET /export/assets.links
///
/// Newline-separated `"{secret} {file URL}"` pairs for every approved
/// asset, scheduled or not. The display network uses this to prefetch
/// media files.
async fn export_asset_links(State(state): State<AppState>) -> Result<String, AppError> {
    let assets = state.db.list_approved().await?;

    let mut lines = String::new();
    for asset in assets {
        lines.push_str(&format!(
            "{} {}/{}\n",
            asset.secret,
            state.config.server.asset_base_url,
            asset.file_name()
        ));
    }

    Ok(lines)
}

/// GET /api/live
///
/// Approved assets whose window covers the current time, in randomized
/// order for the public front page.
pub async fn list_live(
    State(state): State<AppState>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    use rand::seq::SliceRandom;

    let now = chrono::Utc::now().timestamp();
    let mut live = state.db.list_live(now).await?;
    live.shuffle(&mut rand::thread_rng());

    let entries = live
        .into_iter()
        .map(|asset| {
            serde_json::json!({
                "username": asset.username,
                "asset_id": asset.id,
                "type": asset.kind().as_str(),
                "starts": asset.starts,
                "ends": asset.ends,
                "url": format!(
                    "{}/{}",
                    state.config.server.asset_base_url,
                    asset.file_name()
                ),
            })
        })
        .collect();

    Ok(Json(entries))
}

/// Create export router
pub fn export_router() -> Router<AppState> {
    Router::new()
        .route("/export/schedule.json", get(export_schedule))
        .route("/export/assets.links", get(export_asset_links))
}
