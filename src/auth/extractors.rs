use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, session::SessionToken},
    error::ApiError,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "jwt";

/// Per-request session gate. The token must be present in both the `jwt`
/// cookie and the bearer header, the two must match, the signature must
/// verify, and the token must equal the session row stored for the subject.
/// The stored-row comparison is what enforces the single-active-session
/// policy: a fresh sign-in replaces the row and strands older tokens.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| {
                ApiError::Unauthenticated("No session cookie present, please sign in first".into())
            })?;

        let bearer_token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthenticated("Missing bearer token".into()))?;

        if bearer_token != cookie_token {
            warn!("cookie and bearer tokens do not match");
            return Err(ApiError::Unauthenticated("User not authenticated".into()));
        }

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&cookie_token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthenticated("Invalid or expired token".into())
        })?;

        if claims.sub.is_nil() {
            return Err(ApiError::Unauthenticated("Invalid token".into()));
        }

        let stored = SessionToken::find_by_user(&state.db, claims.sub).await?;
        match stored {
            Some(s) if s.token == cookie_token => Ok(AuthUser(claims.sub)),
            _ => {
                warn!(user_id = %claims.sub, "token does not match active session");
                Err(ApiError::Unauthenticated("Session is no longer active".into()))
            }
        }
    }
}
