//! Scoped capability tokens
//!
//! Converts a plain identifier into a URL-safe token proving it was issued
//! by this process for one specific usage scope. Tokens carry no session
//! state; holding a valid token *is* the authorization.
//!
//! Wire format: `{value}~{signature}` where the signature is the first
//! [`SIGNATURE_CHARS`] characters of the URL-safe base64 HMAC-SHA256 digest
//! of `value`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use crate::metrics::TOKEN_VERIFICATIONS_TOTAL;

type HmacSha256 = Hmac<Sha256>;

/// Separator between value and signature. Must never occur in a signed
/// value, or the token split becomes ambiguous.
pub const SEPARATOR: char = '~';

/// Signature length in base64 characters.
///
/// 8 characters cover the first 6 digest bytes exactly (48 bits), so the
/// truncated string and the truncated digest stay interchangeable.
pub const SIGNATURE_CHARS: usize = 8;

const SIGNATURE_BYTES: usize = SIGNATURE_CHARS * 6 / 8;

/// Signs and verifies capability tokens for a single scope.
///
/// The signing key is derived from the process-wide secret plus the scope
/// string, so a token for one scope never validates under another.
#[derive(Clone)]
pub struct TokenCodec {
    key: String,
}

impl TokenCodec {
    /// Create a codec for one scope.
    pub fn new(secret_key: &str, scope: &str) -> Self {
        Self {
            key: format!("{}|{}", secret_key, scope),
        }
    }

    fn mac(&self, value: &str) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC key setup failed: {}", e)))?;
        mac.update(value.as_bytes());
        Ok(mac)
    }

    fn signature(&self, value: &str) -> Result<String, AppError> {
        let digest = self.mac(value)?.finalize().into_bytes();
        let mut encoded = URL_SAFE_NO_PAD.encode(digest);
        encoded.truncate(SIGNATURE_CHARS);
        Ok(encoded)
    }

    /// Sign a value into a token.
    ///
    /// Deterministic: the same (value, scope, key) always yields the same
    /// token.
    ///
    /// # Errors
    /// Fails if `value` contains the separator character.
    pub fn encode(&self, value: &str) -> Result<String, AppError> {
        if value.contains(SEPARATOR) {
            return Err(AppError::Validation(format!(
                "signed value must not contain '{}'",
                SEPARATOR
            )));
        }
        Ok(format!("{}{}{}", value, SEPARATOR, self.signature(value)?))
    }

    /// Verify a token and return the signed value.
    ///
    /// The signature comparison runs in constant time: the supplied
    /// signature is decoded back to digest-prefix bytes and checked with
    /// `Mac::verify_truncated_left`, never with string equality.
    ///
    /// # Errors
    /// `AppError::InvalidToken` when the separator is absent, the signature
    /// is not valid base64, its length is wrong, or the MAC does not match.
    pub fn decode(&self, token: &str) -> Result<String, AppError> {
        let result = self.decode_inner(token);
        let label = if result.is_ok() { "ok" } else { "invalid" };
        TOKEN_VERIFICATIONS_TOTAL.with_label_values(&[label]).inc();
        result
    }

    fn decode_inner(&self, token: &str) -> Result<String, AppError> {
        let (value, signature) = token.rsplit_once(SEPARATOR).ok_or(AppError::InvalidToken)?;

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::InvalidToken)?;
        if signature_bytes.len() != SIGNATURE_BYTES {
            return Err(AppError::InvalidToken);
        }

        self.mac(value)?
            .verify_truncated_left(&signature_bytes)
            .map_err(|_| AppError::InvalidToken)?;

        Ok(value.to_string())
    }
}
