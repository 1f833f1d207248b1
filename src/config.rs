//! Layered configuration
//!
//! Values come from built-in defaults, then `config/default.toml` and
//! `config/local.toml` when present, then `SLOTCAST__`-prefixed
//! environment variables. Validation runs once at load; an invalid
//! configuration never reaches the rest of the crate.

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Top-level configuration, one section per concern.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub campaign: CampaignConfig,
    pub signing: SigningConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    pub port: u16,
    /// Public domain the service is reachable under
    pub domain: String,
    /// "http" or "https"; http only passes validation for local domains
    pub protocol: String,
    /// Public base URL serving asset files (display network pulls from here)
    pub asset_base_url: String,
}

impl ServerConfig {
    /// Public base URL, e.g. `https://display.example.org`.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file, created on first start
    pub path: PathBuf,
}

/// Campaign window configuration
///
/// Every asset playback window must fall inside `[starts, ends]`.
/// Loaded once at startup and immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignConfig {
    /// Campaign start, unix seconds
    pub starts: i64,
    /// Campaign end, unix seconds
    pub ends: i64,
    /// Minimum schedulable slot in seconds (e.g., 1800 = 30 minutes)
    pub min_interval: i64,
}

/// Capability token signing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    /// Process-wide token signing secret (32+ bytes);
    /// per-scope keys are derived from it
    pub secret_key: String,
}

/// Session authentication configuration
///
/// The identity-provider login flow lives outside this service;
/// sessions minted by it are verified here.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session signing secret (32+ bytes)
    pub session_secret: String,
    /// Session lifetime in seconds, default one week
    pub session_max_age: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// "pretty" for local development, "json" in production
    pub format: String,
}

impl AppConfig {
    /// Load and validate the configuration.
    ///
    /// Later sources override earlier ones: defaults, then the config
    /// files, then `SLOTCAST__`-prefixed environment variables
    /// (double underscore separating sections, e.g.
    /// `SLOTCAST__SERVER__DOMAIN`).
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("campaign.min_interval", 1800)?
            .set_default("auth.session_max_age", 604800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("SLOTCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_host(&server_host(&self.server.domain))
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SECRET_BYTES: usize = 32;

        if self.signing.secret_key.as_bytes().len() < MIN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "signing.secret_key must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        if self.auth.session_secret.as_bytes().len() < MIN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be positive".to_string(),
            ));
        }

        if self.campaign.min_interval <= 0 {
            return Err(crate::error::AppError::Config(
                "campaign.min_interval must be greater than 0".to_string(),
            ));
        }

        if self.campaign.starts + self.campaign.min_interval > self.campaign.ends {
            return Err(crate::error::AppError::Config(
                "campaign window must fit at least one minimum interval".to_string(),
            ));
        }

        if !self.should_use_secure_cookies() {
            let host = server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Insecure session cookies enabled for local domain"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for public server domains".to_string(),
            ));
        }

        Ok(())
    }
}

/// Extract the bare lowercase host from a configured domain, which may
/// carry a port or trailing dot.
fn server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string())
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn is_local_host(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    match host.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback() || ip.is_unspecified(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
                asset_base_url: "http://localhost:8080/static".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/slotcast-test.db"),
            },
            campaign: CampaignConfig {
                starts: 1_482_796_800,
                ends: 1_483_120_800,
                min_interval: 1800,
            },
            signing: SigningConfig {
                secret_key: "y".repeat(32),
            },
            auth: AuthConfig {
                session_secret: "x".repeat(32),
                session_max_age: 604_800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn http_on_localhost_is_valid_and_insecure() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(!config.should_use_secure_cookies());
    }

    #[test]
    fn validate_rejects_short_signing_secret() {
        let mut config = valid_config();
        config.signing.secret_key = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("signing secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("signing.secret_key")
        ));
    }

    #[test]
    fn validate_rejects_campaign_too_narrow_for_interval() {
        let mut config = valid_config();
        config.campaign.ends = config.campaign.starts + config.campaign.min_interval - 1;

        let error = config
            .validate()
            .expect_err("campaign narrower than one interval must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("campaign window")
        ));
    }

    #[test]
    fn public_domain_requires_https() {
        let mut config = valid_config();
        config.server.domain = "display.example.com".to_string();
        config.server.protocol = "http".to_string();

        let error = config
            .validate()
            .expect_err("public domains must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("server.protocol must be https")
        ));
    }
}
