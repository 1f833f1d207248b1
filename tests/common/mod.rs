//! Common test utilities for E2E tests

use slotcast::auth::{create_session_token, Session};
use slotcast::config;
use slotcast::data::{Asset, AssetKind, User};
use slotcast::service::moderation::MODERATE_SCOPE;
use slotcast::token::TokenCodec;
use slotcast::AppState;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const SIGNING_SECRET: &str = "test-signing-secret-32-bytes-ok!";
pub const SESSION_SECRET: &str = "test-session-secret-32-bytes-ok!";

/// Campaign window used by all tests: generously spans "now" so live
/// queries behave deterministically.
pub const CAMPAIGN_STARTS: i64 = 1_000_000_000;
pub const CAMPAIGN_ENDS: i64 = 3_000_000_000;
pub const MIN_INTERVAL: i64 = 1800;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "test.example.com".to_string(),
                protocol: "https".to_string(),
                asset_base_url: "https://media.test.example.com".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            campaign: config::CampaignConfig {
                starts: CAMPAIGN_STARTS,
                ends: CAMPAIGN_ENDS,
                min_interval: MIN_INTERVAL,
            },
            signing: config::SigningConfig {
                secret_key: SIGNING_SECRET.to_string(),
            },
            auth: config::AuthConfig {
                session_secret: SESSION_SECRET.to_string(),
                session_max_age: 604800,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config.clone()).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = slotcast::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a test user in the database
    pub async fn create_user(&self, username: &str) -> User {
        self.state.db.upsert_user(username, 10).await.unwrap()
    }

    /// Build a `Cookie` header value carrying a valid session for a user
    pub fn session_cookie(&self, user: &User) -> String {
        let session = Session::for_user(user.id, &user.username, 3600);
        let token = create_session_token(&session, SESSION_SECRET).unwrap();
        format!("session={}", token)
    }

    /// Insert an asset directly through the repository
    pub async fn create_asset(&self, user: &User, kind: AssetKind) -> Asset {
        self.state
            .db
            .insert_asset(user.id, &"ab".repeat(16), kind)
            .await
            .unwrap()
    }

    /// Issue a valid moderation token for an asset id
    pub fn moderation_token(&self, asset_id: i64) -> String {
        TokenCodec::new(SIGNING_SECRET, MODERATE_SCOPE)
            .encode(&asset_id.to_string())
            .unwrap()
    }
}
