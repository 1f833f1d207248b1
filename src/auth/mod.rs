//! Owner authentication
//!
//! Signed-cookie sessions identify the submitting user on the owner-facing
//! asset API. Moderation does not use sessions at all; it is authorized by
//! scoped capability tokens instead (see [`crate::token`]).

pub mod session;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;

pub use session::{create_session_token, verify_session_token, Session};

use crate::error::AppError;
use crate::AppState;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "session";

fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
        .or_else(|| {
            let jar = CookieJar::from_headers(headers);
            jar.get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_owned())
        })
}

/// Extractor for the authenticated submitter.
///
/// Reads the session from the cookie or Authorization header, verifies the
/// signature and expiry, and confirms the user still exists. Rejects with
/// 401 otherwise.
pub struct CurrentUser(pub crate::data::User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            extract_token_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let session = verify_session_token(&token, &state.config.auth.session_secret)?;

        let user = state
            .db
            .get_user(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(user))
    }
}
