//! Error type for `podhub-store-sqlite`.

use podhub_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] podhub_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("user not found: {0}")]
  UserNotFound(uuid::Uuid),

  #[error("podcast not found: {0}")]
  PodcastNotFound(uuid::Uuid),

  #[error("episode not found: {0}")]
  EpisodeNotFound(uuid::Uuid),

  /// A UNIQUE or PRIMARY KEY constraint rejected the write.
  #[error("{0}")]
  Conflict(String),

  /// A FOREIGN KEY constraint rejected the write.
  #[error("{0} not found")]
  MissingReference(&'static str),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::UserNotFound(_)
      | Self::PodcastNotFound(_)
      | Self::EpisodeNotFound(_)
      | Self::MissingReference(_) => ErrorKind::NotFound,
      Self::Database(_) | Self::Json(_) | Self::Uuid(_) | Self::DateParse(_) => {
        ErrorKind::Internal
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Translate constraint failures on a write into [`Error::Conflict`] or
/// [`Error::MissingReference`]; everything else stays a database error.
pub(crate) fn write_error(
  e: tokio_rusqlite::Error,
  conflict: impl FnOnce(&str) -> String,
  reference: &'static str,
) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, msg)) = &e {
    match f.extended_code {
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
      | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
        return Error::Conflict(conflict(msg.as_deref().unwrap_or_default()));
      }
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
        return Error::MissingReference(reference);
      }
      _ => {}
    }
  }
  Error::Database(e)
}
