//! Access gate — fixed-credential login and signed session tokens.
//!
//! DESIGN
//! ======
//! There is exactly one credential pair, configured through the environment.
//! A successful login yields a stateless token `user_id.expires_unix.sig`
//! where `sig` is a SHA-256 over the secret, the user id, and the expiry.
//! Nothing is stored server-side; verification recomputes the signature and
//! checks the expiry against the caller-supplied clock.

use std::fmt::Write;

use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
}

/// Fixed credentials plus token signing material.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub user_id: String,
    pub password: String,
    pub secret: String,
    pub ttl: Duration,
}

impl AuthConfig {
    /// Build the gate config from environment variables.
    ///
    /// Required: `AUTH_USER_ID`, `AUTH_PASSWORD`, `AUTH_TOKEN_SECRET`.
    /// Optional: `SESSION_TTL_SECS` (default 3600).
    ///
    /// # Errors
    ///
    /// Returns `MissingVar` when a required variable is unset.
    pub fn from_env() -> Result<Self, AuthError> {
        let user_id = require_env("AUTH_USER_ID")?;
        let password = require_env("AUTH_PASSWORD")?;
        let secret = require_env("AUTH_TOKEN_SECRET")?;
        let ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self { user_id, password, secret, ttl: Duration::seconds(ttl_secs) })
    }
}

fn require_env(key: &'static str) -> Result<String, AuthError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(AuthError::MissingVar(key))
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Two-pass keyed hash: the secret is mixed in again over the inner digest,
/// so extending the signed message cannot produce a valid outer signature.
fn sign(secret: &str, user_id: &str, expires_unix: i64) -> String {
    let mut inner = Sha256::new();
    inner.update(secret.as_bytes());
    inner.update(b".");
    inner.update(user_id.as_bytes());
    inner.update(b".");
    inner.update(expires_unix.to_string().as_bytes());
    let inner = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(secret.as_bytes());
    outer.update(inner);
    bytes_to_hex(&outer.finalize())
}

/// Byte equality without an early exit, so comparison time does not leak
/// how much of a forged signature matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check the submitted pair against the configured credentials.
#[must_use]
pub fn verify_credentials(config: &AuthConfig, user_id: &str, password: &str) -> bool {
    user_id == config.user_id && password == config.password
}

/// Issue a signed token for the configured user, expiring after the TTL.
#[must_use]
pub fn issue_token(config: &AuthConfig, now: OffsetDateTime) -> String {
    let expires = (now + config.ttl).unix_timestamp();
    let sig = sign(&config.secret, &config.user_id, expires);
    format!("{}.{expires}.{sig}", config.user_id)
}

/// Verify a token: well-formed, unexpired, signature intact. Returns the
/// embedded user id. Parsed from the right so user ids may contain dots.
#[must_use]
pub fn verify_token(config: &AuthConfig, token: &str, now: OffsetDateTime) -> Option<String> {
    let mut parts = token.rsplitn(3, '.');
    let sig = parts.next()?;
    let expires: i64 = parts.next()?.parse().ok()?;
    let user_id = parts.next().filter(|id| !id.is_empty())?;

    if expires <= now.unix_timestamp() {
        return None;
    }
    if !constant_time_eq(sign(&config.secret, user_id, expires).as_bytes(), sig.as_bytes()) {
        return None;
    }
    Some(user_id.to_owned())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
