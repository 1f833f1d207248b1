//! Data models
//!
//! Rust structs representing database entities. Integer row ids come from
//! SQLite autoincrement; timestamps are unix seconds throughout.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// User
// =============================================================================

/// An authenticated submitter.
///
/// Identity comes from the external identity provider; `followers` is a
/// snapshot metric used only as an eligibility gate at login time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub followers: i64,
}

// =============================================================================
// Asset
// =============================================================================

/// Media kind, fixed at creation from content inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// File extension used when naming the stored asset file.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Image),
            1 => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Image => 0,
            Self::Video => 1,
        }
    }
}

/// Moderation status of an asset.
///
/// `Rejected` is terminal; once an asset is rejected it cannot be revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStatus {
    Unknown,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Approved),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
        }
    }

    /// Apply a requested transition to the current status.
    ///
    /// Allowed moves: `Unknown -> Approved | Rejected`,
    /// `Approved -> Rejected`, `Approved -> Approved` (idempotent
    /// re-approval). Everything else fails with `InvalidTransition`; the
    /// caller is responsible for persisting the result.
    pub fn apply(self, requested: ModerationStatus) -> Result<ModerationStatus, AppError> {
        match (self, requested) {
            (Self::Unknown, Self::Approved) => Ok(Self::Approved),
            (Self::Unknown, Self::Rejected) => Ok(Self::Rejected),
            (Self::Approved, Self::Approved) => Ok(Self::Approved),
            (Self::Approved, Self::Rejected) => Ok(Self::Rejected),
            _ => Err(AppError::InvalidTransition),
        }
    }
}

/// A submitted media item.
///
/// `secret` makes the public file path unguessable; it carries no
/// moderation authority. The playback window `[starts, ends)` stays 0/0
/// until the owner schedules the asset.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: i64,
    pub user_id: i64,
    /// 32 hex chars assigned at creation, immutable
    pub secret: String,
    pub kind: i64,
    pub status: i64,
    /// Window start, unix seconds (0 = unscheduled)
    pub starts: i64,
    /// Window end, unix seconds (0 = unscheduled)
    pub ends: i64,
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        AssetKind::from_i64(self.kind).unwrap_or(AssetKind::Image)
    }

    pub fn status(&self) -> ModerationStatus {
        ModerationStatus::from_i64(self.status).unwrap_or(ModerationStatus::Unknown)
    }

    /// File name of the stored media, e.g. `asset-7-abc...def.jpg`.
    pub fn file_name(&self) -> String {
        format!(
            "asset-{}-{}.{}",
            self.id,
            self.secret,
            self.kind().file_extension()
        )
    }
}

// =============================================================================
// Scheduled asset (join row)
// =============================================================================

/// An approved, scheduled asset joined with its owner.
///
/// Row shape consumed by the schedule weight calculator and the export
/// endpoints.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduledAsset {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub secret: String,
    pub kind: i64,
    pub starts: i64,
    pub ends: i64,
}

impl ScheduledAsset {
    pub fn kind(&self) -> AssetKind {
        AssetKind::from_i64(self.kind).unwrap_or(AssetKind::Image)
    }

    pub fn duration(&self) -> i64 {
        self.ends - self.starts
    }

    /// File name of the stored media, e.g. `asset-7-abc...def.jpg`.
    pub fn file_name(&self) -> String {
        format!(
            "asset-{}-{}.{}",
            self.id,
            self.secret,
            self.kind().file_extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_can_be_approved_or_rejected() {
        assert_eq!(
            ModerationStatus::Unknown
                .apply(ModerationStatus::Approved)
                .unwrap(),
            ModerationStatus::Approved
        );
        assert_eq!(
            ModerationStatus::Unknown
                .apply(ModerationStatus::Rejected)
                .unwrap(),
            ModerationStatus::Rejected
        );
    }

    #[test]
    fn approved_can_be_rejected_or_reapproved() {
        assert_eq!(
            ModerationStatus::Approved
                .apply(ModerationStatus::Rejected)
                .unwrap(),
            ModerationStatus::Rejected
        );
        assert_eq!(
            ModerationStatus::Approved
                .apply(ModerationStatus::Approved)
                .unwrap(),
            ModerationStatus::Approved
        );
    }

    #[test]
    fn rejected_is_terminal() {
        for requested in [
            ModerationStatus::Unknown,
            ModerationStatus::Approved,
            ModerationStatus::Rejected,
        ] {
            assert!(matches!(
                ModerationStatus::Rejected.apply(requested),
                Err(AppError::InvalidTransition)
            ));
        }
    }

    #[test]
    fn unknown_is_not_a_valid_target() {
        assert!(matches!(
            ModerationStatus::Unknown.apply(ModerationStatus::Unknown),
            Err(AppError::InvalidTransition)
        ));
        assert!(matches!(
            ModerationStatus::Approved.apply(ModerationStatus::Unknown),
            Err(AppError::InvalidTransition)
        ));
    }

    #[test]
    fn asset_file_name_includes_id_secret_and_extension() {
        let asset = Asset {
            id: 7,
            user_id: 1,
            secret: "ab".repeat(16),
            kind: AssetKind::Video.as_i64(),
            status: 0,
            starts: 0,
            ends: 0,
        };
        assert_eq!(asset.file_name(), format!("asset-7-{}.mp4", "ab".repeat(16)));
    }
}
