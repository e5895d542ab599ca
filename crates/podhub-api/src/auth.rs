//! Password hashing, opaque session tokens, and the [`CurrentUser`]
//! extractor.
//!
//! A session token is 32 random bytes, hex-encoded, handed to the client
//! once. Only its SHA-256 is stored. Clients present it either as
//! `Authorization: Bearer <token>` or in the [`SESSION_COOKIE`] cookie.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use chrono::{DateTime, Utc};
use podhub_core::store::PodcastStore;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "podhub_session";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

pub fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// The session token presented with a request, bearer header first.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  if let Some(token) = bearer {
    return Some(token.to_owned());
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
    .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value installing `token` until `expires_at`.
pub fn session_cookie(
  token: &str,
  now: DateTime<Utc>,
  expires_at: DateTime<Utc>,
) -> Result<HeaderValue, ApiError> {
  let max_age = (expires_at - now).num_seconds().max(0);
  cookie_header(&format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
  ))
}

/// `Set-Cookie` value removing the session cookie.
pub fn cleared_cookie() -> Result<HeaderValue, ApiError> {
  cookie_header(&format!(
    "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
  ))
}

fn cookie_header(value: &str) -> Result<HeaderValue, ApiError> {
  HeaderValue::from_str(value)
    .map_err(|e| ApiError::Store(format!("invalid cookie header: {e}").into()))
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The user owning the request's live session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user_id:    Uuid,
  pub token_hash: String,
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: PodcastStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = session_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing session token".into()))?;
    let token_hash = hash_token(&token);

    let user_id = state
      .store
      .session_user(token_hash.clone(), Utc::now())
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::Unauthorized("session expired or invalid".into()))?;

    Ok(CurrentUser { user_id, token_hash })
  }
}
