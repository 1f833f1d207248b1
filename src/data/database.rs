//! SQLite repository
//!
//! Every query in the crate lives here; the rest of the code depends on
//! this narrow surface, never on the storage engine directly.

use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the database file (creating it and its parent directory if
    /// needed) and run pending migrations.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path.display())).await?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            AppError::Internal(anyhow::anyhow!("migration failed: {}", e))
        })?;

        tracing::info!(path = %path.display(), "Database ready");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user or refresh the follower snapshot for an existing one.
    ///
    /// Called by the identity-provider callback after a successful login.
    pub async fn upsert_user(&self, username: &str, followers: i64) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, followers) VALUES (?, ?)
            ON CONFLICT(username) DO UPDATE SET followers = excluded.followers
            RETURNING id, username, followers
            "#,
        )
        .bind(username)
        .bind(followers)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by id.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Insert a new asset in `Unknown` status with a zero window.
    pub async fn insert_asset(
        &self,
        user_id: i64,
        secret: &str,
        kind: AssetKind,
    ) -> Result<Asset, AppError> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (user_id, secret, kind, status, starts, ends)
            VALUES (?, ?, ?, ?, 0, 0)
            RETURNING id, user_id, secret, kind, status, starts, ends
            "#,
        )
        .bind(user_id)
        .bind(secret)
        .bind(kind.as_i64())
        .bind(ModerationStatus::Unknown.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(asset)
    }

    /// Get an asset by id, regardless of owner. Moderation path.
    pub async fn get_asset(&self, id: i64) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    /// Get an asset by id scoped to its owner. Owner API path.
    pub async fn get_owned_asset(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    /// List all assets owned by one user, oldest first.
    pub async fn list_user_assets(&self, user_id: i64) -> Result<Vec<Asset>, AppError> {
        let assets =
            sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(assets)
    }

    /// Persist an already-clamped playback window.
    pub async fn update_asset_window(
        &self,
        id: i64,
        starts: i64,
        ends: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE assets SET starts = ?, ends = ? WHERE id = ?")
            .bind(starts)
            .bind(ends)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Persist a moderation status already validated by the state machine.
    pub async fn set_asset_status(
        &self,
        id: i64,
        status: ModerationStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE assets SET status = ? WHERE id = ?")
            .bind(status.as_i64())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete an asset.
    pub async fn delete_asset(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Schedule queries
    // =========================================================================

    /// Approved assets with a non-zero window, joined with their owners.
    ///
    /// This is the input set for the weight calculator.
    pub async fn list_approved_scheduled(&self) -> Result<Vec<ScheduledAsset>, AppError> {
        let rows = sqlx::query_as::<_, ScheduledAsset>(
            r#"
            SELECT a.id, a.user_id, u.username, a.secret, a.kind, a.starts, a.ends
            FROM assets a JOIN users u ON a.user_id = u.id
            WHERE a.status = ? AND a.starts != 0 AND a.ends != 0
            ORDER BY a.id
            "#,
        )
        .bind(ModerationStatus::Approved.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All approved assets, scheduled or not. Feeds the file link export.
    pub async fn list_approved(&self) -> Result<Vec<Asset>, AppError> {
        let assets = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE status = ? ORDER BY id")
            .bind(ModerationStatus::Approved.as_i64())
            .fetch_all(&self.pool)
            .await?;

        Ok(assets)
    }

    /// Approved assets whose window covers `now`, joined with their owners.
    pub async fn list_live(&self, now: i64) -> Result<Vec<ScheduledAsset>, AppError> {
        let rows = sqlx::query_as::<_, ScheduledAsset>(
            r#"
            SELECT a.id, a.user_id, u.username, a.secret, a.kind, a.starts, a.ends
            FROM assets a JOIN users u ON a.user_id = u.id
            WHERE a.status = ? AND a.starts < ? AND a.ends > ?
            ORDER BY a.id
            "#,
        )
        .bind(ModerationStatus::Approved.as_i64())
        .bind(now)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
