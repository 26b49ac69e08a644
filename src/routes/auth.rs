//! Auth routes — fixed-credential login, logout, and the session extractor.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::routes::error::ApiError;
use crate::services::auth as auth_svc;
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(max_age)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated session extracted from the signed cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(ApiError::Unauthorized);
        }

        let app_state = AppState::from_ref(state);
        let user_id = auth_svc::verify_token(&app_state.auth, token, OffsetDateTime::now_utc())
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self { user_id })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginBody {
    pub user_id: String,
    pub password: String,
}

/// `POST /api/login` — check fixed credentials, set the signed cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    if !auth_svc::verify_credentials(&state.auth, &body.user_id, &body.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth_svc::issue_token(&state.auth, OffsetDateTime::now_utc());
    let jar = jar.add(session_cookie(token, state.auth.ttl));

    tracing::info!(user_id = %body.user_id, "login succeeded");
    Ok((jar, Json(serde_json::json!({ "ok": true }))))
}

/// `POST /api/logout` — clear the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.add(session_cookie(String::new(), Duration::ZERO));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
