//! Slotcast binary entry point

use slotcast::{config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    // The subscriber has to exist before AppConfig::load can log anything,
    // so the format is read straight from the environment here.
    let format =
        std::env::var("SLOTCAST__LOGGING__FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "slotcast=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    slotcast::metrics::init_metrics();

    let config = config::AppConfig::load()?;
    tracing::info!(
        domain = %config.server.domain,
        protocol = %config.server.protocol,
        campaign_starts = config.campaign.starts,
        campaign_ends = config.campaign.ends,
        "Configuration loaded"
    );

    let state = AppState::new(config.clone()).await?;
    let app = slotcast::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("Public base URL: {}", config.server.base_url());

    axum::serve(listener, app).await?;

    Ok(())
}
