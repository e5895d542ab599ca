//! Accounts, sessions, and the validation rules applied at registration.

use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub email:         String,
  /// Unique display name; the corpus for user search.
  pub username:      String,
  /// PHC string produced by argon2. Never leaves the server.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub verified:      bool,
  pub bio:           Option<String>,
  pub created_at:    DateTime<Utc>,
}

impl User {
  pub fn to_ref(&self) -> UserRef {
    UserRef { id: self.user_id, username: self.username.clone() }
  }
}

/// The public `{id, username}` pair embedded in podcasts, comments, and
/// follow listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
  pub id:       Uuid,
  pub username: String,
}

/// Input to [`crate::store::PodcastStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub username:      String,
  pub password_hash: String,
}

/// Whether a user has published anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
  User,
  Author,
}

/// A login session. Only the SHA-256 of the bearer token is persisted.
#[derive(Debug, Clone)]
pub struct Session {
  pub token_hash: String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Accepts RFC 5322 addresses whose domain has at least one dot and ends in
/// an alphanumeric top-level label.
pub fn validate_email(email: &str) -> Result<()> {
  let invalid = || Error::Validation("invalid email address".into());

  let (_, domain) = email.rsplit_once('@').ok_or_else(invalid)?;
  let (_, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
  if tld.is_empty() || !tld.chars().all(char::is_alphanumeric) {
    return Err(invalid());
  }
  if !EmailAddress::is_valid(email) {
    return Err(invalid());
  }
  Ok(())
}

/// At least six characters with one lowercase letter, one uppercase letter,
/// and one digit.
pub fn validate_password(password: &str) -> Result<()> {
  let long_enough = password.chars().count() >= 6;
  let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
  let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
  let has_digit = password.chars().any(|c| c.is_ascii_digit());

  if long_enough && has_lower && has_upper && has_digit {
    Ok(())
  } else {
    Err(Error::Validation(
      "password must be at least 6 characters long and contain a lowercase \
       letter, an uppercase letter, and a digit"
        .into(),
    ))
  }
}
