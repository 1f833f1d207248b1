//! Asset service
//!
//! Owner-facing submission lifecycle: register, schedule, delete. The
//! upload pipeline (byte handling, decoding, thumbnailing) runs outside
//! this service and hands over only the inspected media kind.

use std::sync::Arc;

use crate::config::CampaignConfig;
use crate::data::{Asset, AssetKind, Database};
use crate::error::AppError;
use crate::metrics::ASSETS_SUBMITTED_TOTAL;

/// Clamp a requested playback window into the campaign window.
///
/// `starts` is pulled into `[CAMPAIGN_START, min(ends, CAMPAIGN_END -
/// MIN_INTERVAL)]`, then `ends` into `[starts + MIN_INTERVAL,
/// CAMPAIGN_END]`. The result satisfies `starts <= ends` inside the
/// campaign and spans at least `MIN_INTERVAL`, for any caller input,
/// including inverted or out-of-range values.
pub fn clamp_window(campaign: &CampaignConfig, starts: i64, ends: i64) -> (i64, i64) {
    // Config validation guarantees at least one interval fits, so the
    // latest admissible start never precedes the campaign start.
    let latest_start = campaign.ends - campaign.min_interval;
    let starts = campaign.starts.max(starts.min(ends).min(latest_start));
    let ends = campaign.ends.min(ends.max(starts + campaign.min_interval));
    (starts, ends)
}

/// Generate a fresh 32-hex-char asset secret.
fn random_secret() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Asset service
pub struct AssetService {
    db: Arc<Database>,
    campaign: CampaignConfig,
}

impl AssetService {
    /// Create new asset service
    pub fn new(db: Arc<Database>, campaign: CampaignConfig) -> Self {
        Self { db, campaign }
    }

    /// Register a new submission for a user.
    ///
    /// The asset starts in `Unknown` status with a zero (unscheduled)
    /// window and an immutable random secret.
    pub async fn create(&self, user_id: i64, kind: AssetKind) -> Result<Asset, AppError> {
        let asset = self.db.insert_asset(user_id, &random_secret(), kind).await?;

        ASSETS_SUBMITTED_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();

        Ok(asset)
    }

    /// List a user's assets, oldest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Asset>, AppError> {
        self.db.list_user_assets(user_id).await
    }

    /// Fetch one asset scoped to its owner.
    pub async fn get(&self, user_id: i64, asset_id: i64) -> Result<Asset, AppError> {
        self.db
            .get_owned_asset(asset_id, user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Set an asset's playback window.
    ///
    /// The requested range passes through [`clamp_window`] before being
    /// persisted, so the stored window always honors the campaign
    /// invariants regardless of caller input.
    pub async fn set_window(
        &self,
        user_id: i64,
        asset_id: i64,
        starts: i64,
        ends: i64,
    ) -> Result<Asset, AppError> {
        let mut asset = self.get(user_id, asset_id).await?;

        let (starts, ends) = clamp_window(&self.campaign, starts, ends);
        self.db.update_asset_window(asset.id, starts, ends).await?;
        asset.starts = starts;
        asset.ends = ends;

        Ok(asset)
    }

    /// Delete an owned asset.
    pub async fn delete(&self, user_id: i64, asset_id: i64) -> Result<i64, AppError> {
        let asset = self.get(user_id, asset_id).await?;
        self.db.delete_asset(asset.id).await?;
        Ok(asset.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign() -> CampaignConfig {
        CampaignConfig {
            starts: 10_000,
            ends: 100_000,
            min_interval: 1800,
        }
    }

    #[test]
    fn valid_window_passes_through() {
        let (starts, ends) = clamp_window(&campaign(), 20_000, 30_000);
        assert_eq!((starts, ends), (20_000, 30_000));
    }

    #[test]
    fn inverted_range_is_repaired() {
        let campaign = campaign();
        let (starts, ends) = clamp_window(&campaign, 50_000, 20_000);

        assert!(starts <= ends);
        assert!(starts >= campaign.starts && ends <= campaign.ends);
        assert!(ends - starts >= campaign.min_interval);
    }

    #[test]
    fn range_before_campaign_is_pulled_forward() {
        let campaign = campaign();
        let (starts, ends) = clamp_window(&campaign, 0, 5_000);

        assert_eq!(starts, campaign.starts);
        assert_eq!(ends, campaign.starts + campaign.min_interval);
    }

    #[test]
    fn range_after_campaign_is_pulled_back() {
        let campaign = campaign();
        let (starts, ends) = clamp_window(&campaign, 200_000, 300_000);

        assert_eq!(starts, campaign.ends - campaign.min_interval);
        assert_eq!(ends, campaign.ends);
    }

    #[test]
    fn too_short_window_is_widened_to_min_interval() {
        let campaign = campaign();
        let (starts, ends) = clamp_window(&campaign, 20_000, 20_060);

        assert_eq!(starts, 20_000);
        assert_eq!(ends, 20_000 + campaign.min_interval);
    }

    #[test]
    fn adversarial_inputs_always_land_inside_campaign() {
        let campaign = campaign();
        for (starts, ends) in [
            (i64::MIN / 4, i64::MIN / 4),
            (i64::MAX / 4, i64::MIN / 4),
            (i64::MAX / 4, i64::MAX / 4),
            (-1, -1),
            (0, 0),
            (99_999, 10),
        ] {
            let (s, e) = clamp_window(&campaign, starts, ends);
            assert!(s <= e, "clamp({starts}, {ends}) inverted");
            assert!(
                s >= campaign.starts && e <= campaign.ends,
                "clamp({starts}, {ends}) escaped the campaign window"
            );
            assert!(
                e - s >= campaign.min_interval,
                "clamp({starts}, {ends}) narrower than the minimum interval"
            );
        }
    }

    #[test]
    fn secrets_are_32_hex_chars() {
        let secret = random_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
