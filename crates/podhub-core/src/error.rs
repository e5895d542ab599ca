//! Error types for `podhub-core`.

use thiserror::Error;

/// Coarse classification shared by every layer that can fail.
///
/// Storage backends map their own errors onto one of these so the HTTP layer
/// can pick a status code without knowing which backend is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The referenced entity does not exist.
  NotFound,
  /// A uniqueness rule was violated (duplicate name, already followed, ...).
  Conflict,
  /// The input failed validation.
  Invalid,
  /// Anything else: I/O, corrupt rows, driver failures.
  Internal,
}

/// Implemented by error types that can report an [`ErrorKind`].
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  /// The matcher found neither an exact nor a fuzzy candidate.
  #[error("no good matches found")]
  NoMatchFound,

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown notification type: {0:?}")]
  UnknownNotificationType(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::NoMatchFound => ErrorKind::NotFound,
      Self::Validation(_) | Self::UnknownCategory(_) => ErrorKind::Invalid,
      Self::UnknownNotificationType(_) | Self::Serialization(_) => {
        ErrorKind::Internal
      }
    }
  }
}

impl Classify for std::convert::Infallible {
  fn kind(&self) -> ErrorKind { match *self {} }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
