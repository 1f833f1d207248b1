//! Stateless HMAC-signed sessions
//!
//! Wire format: `base64url(json payload).base64url(hmac_sha256(payload))`.
//! Nothing is stored server-side; the identity-provider login flow mints
//! tokens through [`create_session_token`] and this service only verifies
//! them.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Signed session payload identifying a submitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Row id of the submitter
    pub user_id: i64,
    /// Display name from the identity provider
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session for a user valid for `max_age` seconds.
    pub fn for_user(user_id: i64, username: &str, max_age: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username: username.to_string(),
            created_at: now,
            expires_at: now + chrono::Duration::seconds(max_age),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

fn session_mac(secret: &str, payload_b64: &str) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC key setup failed: {}", e)))?;
    mac.update(payload_b64.as_bytes());
    Ok(mac)
}

/// Serialize and sign a session into its cookie token.
pub fn create_session_token(session: &Session, secret: &str) -> Result<String, AppError> {
    let payload = serde_json::to_string(session).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());

    let signature = session_mac(secret, &payload_b64)?.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        payload_b64,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a session token's signature and expiry, returning the session.
///
/// Every failure mode (malformed token, bad signature, undecodable
/// payload, expired session) collapses into `Unauthorized`; callers get
/// no oracle on which check failed.
pub fn verify_session_token(token: &str, secret: &str) -> Result<Session, AppError> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Unauthorized)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthorized)?;
    session_mac(secret, payload_b64)?
        .verify_slice(&signature)
        .map_err(|_| AppError::Unauthorized)?;

    // Signature checked; the payload is trusted from here on.
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::Unauthorized)?;
    let session: Session =
        serde_json::from_slice(&payload).map_err(|_| AppError::Unauthorized)?;

    if session.is_expired() {
        return Err(AppError::Unauthorized);
    }

    Ok(session)
}
