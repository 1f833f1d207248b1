//! Moderation service
//!
//! Authorizes moderation actions through scoped capability tokens and
//! applies them through the status state machine. No login session is
//! involved; the signed link itself carries the authority.

use std::sync::Arc;

use crate::data::{Asset, Database, ModerationStatus};
use crate::error::AppError;
use crate::metrics::MODERATION_DECISIONS_TOTAL;
use crate::token::TokenCodec;

/// Token scope for moderation links.
pub const MODERATE_SCOPE: &str = "moderate";

/// Moderation service
pub struct ModerationService {
    db: Arc<Database>,
    codec: TokenCodec,
}

impl ModerationService {
    /// Create new moderation service
    pub fn new(db: Arc<Database>, secret_key: &str) -> Self {
        Self {
            db,
            codec: TokenCodec::new(secret_key, MODERATE_SCOPE),
        }
    }

    /// Issue the moderation path for an asset, e.g. `/moderate/42~c2lnbmF0`.
    ///
    /// The notification channel (mail, chat) delivering this link to the
    /// moderators lives outside this service.
    pub fn moderation_path(&self, asset_id: i64) -> Result<String, AppError> {
        let token = self.codec.encode(&asset_id.to_string())?;
        Ok(format!("/moderate/{}", token))
    }

    async fn asset_from_token(&self, token: &str) -> Result<Asset, AppError> {
        let value = self.codec.decode(token)?;
        // Asset ids are decimal digits; anything else means the token was
        // never issued by us.
        let asset_id: i64 = value.parse().map_err(|_| AppError::InvalidToken)?;

        self.db.get_asset(asset_id).await?.ok_or(AppError::NotFound)
    }

    /// Load an asset for human review from its moderation token.
    ///
    /// # Errors
    /// `InvalidToken` for malformed or forged tokens, `NotFound` when the
    /// signed id no longer exists.
    pub async fn review(&self, token: &str) -> Result<Asset, AppError> {
        self.asset_from_token(token).await
    }

    /// Apply a moderation decision.
    ///
    /// # Steps
    /// 1. Decode the token (scope "moderate") into the asset id
    /// 2. Load the asset
    /// 3. Require the requested status to be Approved or Rejected
    /// 4. Run the state machine (protects terminal Rejected assets)
    /// 5. Persist and return the updated asset
    ///
    /// Either fully succeeds or leaves the repository untouched.
    pub async fn moderate(
        &self,
        token: &str,
        requested: Option<ModerationStatus>,
    ) -> Result<Asset, AppError> {
        let mut asset = self.asset_from_token(token).await?;

        let requested = match requested {
            Some(status @ (ModerationStatus::Approved | ModerationStatus::Rejected)) => status,
            _ => return Err(AppError::InvalidStatus),
        };

        let new_status = asset.status().apply(requested)?;
        self.db.set_asset_status(asset.id, new_status).await?;
        asset.status = new_status.as_i64();

        MODERATION_DECISIONS_TOTAL
            .with_label_values(&[match new_status {
                ModerationStatus::Approved => "approved",
                ModerationStatus::Rejected => "rejected",
                ModerationStatus::Unknown => "unknown",
            }])
            .inc();

        tracing::info!(
            asset_id = asset.id,
            status = new_status.as_i64(),
            "Moderation decision applied"
        );

        Ok(asset)
    }
}
