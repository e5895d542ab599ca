//! Notification records produced when followed authors publish content.
//!
//! The payload is a snapshot of the triggering entity taken at fan-out time.
//! Later edits to the podcast or episode never touch notifications that were
//! already written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  podcast::{Episode, Podcast},
};

/// The `type` discriminant of a notification.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  NewPodcast,
  NewEpisode,
}

/// Public fields of a podcast at the moment it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastSnapshot {
  pub id:          Uuid,
  pub name:        String,
  pub summary:     String,
  pub description: String,
}

impl From<&Podcast> for PodcastSnapshot {
  fn from(p: &Podcast) -> Self {
    Self {
      id:          p.podcast_id,
      name:        p.name.clone(),
      summary:     p.summary.clone(),
      description: p.description.clone(),
    }
  }
}

/// Public fields of an episode at the moment it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSnapshot {
  pub id:          Uuid,
  pub title:       String,
  pub description: String,
  pub id_podcast:  Uuid,
}

impl From<&Episode> for EpisodeSnapshot {
  fn from(e: &Episode) -> Self {
    Self {
      id:          e.episode_id,
      title:       e.title.clone(),
      description: e.description.clone(),
      id_podcast:  e.podcast_id,
    }
  }
}

/// Kind-specific body of a notification, serialised as
/// `{"type": "...", "object": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "object", rename_all = "snake_case")]
pub enum NotificationPayload {
  NewPodcast(PodcastSnapshot),
  NewEpisode(EpisodeSnapshot),
}

impl NotificationPayload {
  pub fn kind(&self) -> NotificationKind {
    match self {
      Self::NewPodcast(_) => NotificationKind::NewPodcast,
      Self::NewEpisode(_) => NotificationKind::NewEpisode,
    }
  }

  /// The snapshot alone, without the type tag, for the `object_json` column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    Ok(match self {
      Self::NewPodcast(s) => serde_json::to_value(s)?,
      Self::NewEpisode(s) => serde_json::to_value(s)?,
    })
  }

  /// Rebuild from the stored `type` column and snapshot JSON.
  pub fn from_parts(kind: &str, object: serde_json::Value) -> Result<Self> {
    let kind: NotificationKind = kind
      .parse()
      .map_err(|_| Error::UnknownNotificationType(kind.to_owned()))?;
    Ok(match kind {
      NotificationKind::NewPodcast => {
        Self::NewPodcast(serde_json::from_value(object)?)
      }
      NotificationKind::NewEpisode => {
        Self::NewEpisode(serde_json::from_value(object)?)
      }
    })
  }
}

/// One row of a user's notification feed.
///
/// Serialises as `{id, type, object, created_at}`; the recipient is implied by
/// whoever is reading the feed.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
  #[serde(rename = "id")]
  pub notification_id: Uuid,
  #[serde(skip)]
  pub recipient_id:    Uuid,
  #[serde(flatten)]
  pub payload:         NotificationPayload,
  pub created_at:      DateTime<Utc>,
}
