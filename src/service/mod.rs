//! Service layer
//!
//! Business logic between the HTTP handlers and the data layer.

pub mod asset;
pub mod moderation;
pub mod schedule;

pub use asset::AssetService;
pub use moderation::ModerationService;
pub use schedule::ScheduleService;
