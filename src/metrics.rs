//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Moderation Metrics
    pub static ref MODERATION_DECISIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("slotcast_moderation_decisions_total", "Total number of moderation decisions"),
        &["decision"]
    ).expect("metric can be created");
    pub static ref TOKEN_VERIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("slotcast_token_verifications_total", "Total number of capability token verifications"),
        &["result"]
    ).expect("metric can be created");

    // Schedule Metrics
    pub static ref SCHEDULE_EXPORTS_TOTAL: IntCounter = IntCounter::new(
        "slotcast_schedule_exports_total",
        "Total number of schedule exports"
    ).expect("metric can be created");
    pub static ref SCHEDULED_ASSETS: IntGauge = IntGauge::new(
        "slotcast_scheduled_assets",
        "Number of assets in the most recent schedule export"
    ).expect("metric can be created");

    // Submission Metrics
    pub static ref ASSETS_SUBMITTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("slotcast_assets_submitted_total", "Total number of submitted assets"),
        &["kind"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("slotcast_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(MODERATION_DECISIONS_TOTAL.clone()))
        .expect("MODERATION_DECISIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(TOKEN_VERIFICATIONS_TOTAL.clone()))
        .expect("TOKEN_VERIFICATIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SCHEDULE_EXPORTS_TOTAL.clone()))
        .expect("SCHEDULE_EXPORTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SCHEDULED_ASSETS.clone()))
        .expect("SCHEDULED_ASSETS can be registered");
    REGISTRY
        .register(Box::new(ASSETS_SUBMITTED_TOTAL.clone()))
        .expect("ASSETS_SUBMITTED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
