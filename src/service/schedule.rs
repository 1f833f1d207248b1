//! Schedule export service
//!
//! Turns the set of approved, scheduled assets into normalized playback
//! priorities for the display network. Two goals drive the weighting:
//!
//! - a user with more total screen time is down-weighted compared to a
//!   user with a single short file, and
//! - a narrowly targeted file beats content that runs the whole campaign.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::data::{Database, ScheduledAsset};
use crate::error::AppError;
use crate::metrics::{SCHEDULED_ASSETS, SCHEDULE_EXPORTS_TOTAL};

/// One row of the schedule export consumed by the playback network.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub asset_id: i64,
    pub username: String,
    pub starts: i64,
    pub ends: i64,
    /// Unguessable file name stem (the asset secret)
    pub asset_name: String,
    /// "image" or "video"
    pub asset_type: &'static str,
    /// Normalized playback priority in [0.2, 1.0]
    pub prio: f64,
}

/// Lowest priority any qualifying asset can receive; guarantees every
/// asset keeps a non-trivial playback share however skewed the set is.
const PRIORITY_FLOOR: f64 = 0.2;

/// Compute a normalized playback priority per asset.
///
/// Returns one priority per input asset, index-aligned with the input.
/// All priorities lie in `[0.2, 1.0]` and the asset with the maximal raw
/// weight gets exactly 1.0.
///
/// The per-user weight is `ln(3.2 - user_duration / total_duration)`. The
/// constant 3.2 keeps the argument above 2.2 even when a single user owns
/// all screen time, so no user weight ever reaches zero. The per-asset
/// weight `8 / ln(10 + duration)` favors shorter windows.
///
/// # Errors
/// `AppError::EmptySchedule` when the total scheduled duration is zero.
/// The caller must short-circuit an empty input set instead of calling
/// this.
pub fn compute_priorities(assets: &[ScheduledAsset]) -> Result<Vec<f64>, AppError> {
    let mut user_duration: HashMap<i64, i64> = HashMap::new();
    for asset in assets {
        *user_duration.entry(asset.user_id).or_default() += asset.duration();
    }

    let total_duration: i64 = user_duration.values().sum();
    if total_duration == 0 {
        return Err(AppError::EmptySchedule);
    }

    let user_weight: HashMap<i64, f64> = user_duration
        .iter()
        .map(|(&user_id, &duration)| {
            let weight = (3.2 - duration as f64 / total_duration as f64).ln();
            (user_id, weight)
        })
        .collect();

    let raw: Vec<f64> = assets
        .iter()
        .map(|asset| {
            let asset_weight = 8.0 / (10.0 + asset.duration() as f64).ln();
            asset_weight * user_weight[&asset.user_id]
        })
        .collect();

    let max_raw = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(raw
        .into_iter()
        .map(|weight| (weight / max_raw).max(PRIORITY_FLOOR))
        .collect())
}

/// Schedule export service
pub struct ScheduleService {
    db: Arc<Database>,
}

impl ScheduleService {
    /// Create new schedule service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Build the schedule export.
    ///
    /// Loads all approved assets with a non-zero window, computes
    /// priorities, and emits one entry per asset. An empty qualifying set
    /// yields an empty export without invoking the calculator.
    pub async fn export(&self) -> Result<Vec<ScheduleEntry>, AppError> {
        let assets = self.db.list_approved_scheduled().await?;

        SCHEDULE_EXPORTS_TOTAL.inc();
        SCHEDULED_ASSETS.set(assets.len() as i64);

        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let priorities = compute_priorities(&assets)?;

        let entries = assets
            .into_iter()
            .zip(priorities)
            .map(|(asset, prio)| {
                let asset_type = asset.kind().as_str();
                ScheduleEntry {
                    asset_id: asset.id,
                    username: asset.username,
                    starts: asset.starts,
                    ends: asset.ends,
                    asset_name: asset.secret,
                    asset_type,
                    prio,
                }
            })
            .collect();

        Ok(entries)
    }
}
