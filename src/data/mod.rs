//! Data layer
//!
//! SQLite persistence behind a narrow repository interface, plus the plain
//! data models shared across the crate.

mod database;
mod models;

pub use database::Database;
pub use models::{Asset, AssetKind, ModerationStatus, ScheduledAsset, User};
