//! Podcasts, episodes, and the fixed category taxonomy.
//!
//! Binary media (cover images, episode audio) is carried on the `New*` and
//! `*Patch` inputs only. Read models never hold blobs; they are fetched
//! separately through the cover/audio store methods.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

use crate::{Error, Result, user::UserRef};

// ─── Category ────────────────────────────────────────────────────────────────

/// The categories a podcast may be filed under.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
pub enum Category {
  Arte,
  Ciencia,
  Comedia,
  Deportes,
  #[serde(rename = "Educación")]
  #[strum(serialize = "Educación")]
  Educacion,
  Entretenimiento,
  Historia,
  #[serde(rename = "Música")]
  #[strum(serialize = "Música")]
  Musica,
  Noticias,
  Salud,
  #[serde(rename = "Tecnología")]
  #[strum(serialize = "Tecnología")]
  Tecnologia,
  Other,
}

impl Category {
  /// Parse a category title exactly as it is displayed.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownCategory(s.to_owned()))
  }

  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// File extension of the bundled artwork for this category.
  pub fn image_extension(self) -> &'static str {
    match self {
      Self::Deportes | Self::Entretenimiento | Self::Musica => "jpg",
      _ => "png",
    }
  }
}

// ─── Podcast ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Podcast {
  pub podcast_id:  Uuid,
  /// Globally unique; the corpus for podcast search.
  pub name:        String,
  pub summary:     String,
  pub description: String,
  pub author:      UserRef,
  pub category:    Option<Category>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::PodcastStore::create_podcast`].
#[derive(Debug, Clone)]
pub struct NewPodcast {
  pub author_id:   Uuid,
  pub name:        String,
  pub summary:     String,
  pub description: String,
  pub category:    Option<Category>,
  pub cover:       Vec<u8>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct PodcastPatch {
  pub name:        Option<String>,
  pub summary:     Option<String>,
  pub description: Option<String>,
  pub category:    Option<Category>,
  pub cover:       Option<Vec<u8>>,
}

/// A podcast ranked by how many listeners have a saved playback position in
/// any of its episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularPodcast {
  pub podcast: Podcast,
  pub views:   u64,
}

// ─── Episode ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
  pub episode_id:  Uuid,
  pub podcast_id:  Uuid,
  /// Unique within its podcast.
  pub title:       String,
  pub description: String,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::PodcastStore::create_episode`].
#[derive(Debug, Clone)]
pub struct NewEpisode {
  pub podcast_id:  Uuid,
  pub title:       String,
  pub description: String,
  pub tags:        Vec<String>,
  pub audio:       Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EpisodePatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub tags:        Option<Vec<String>>,
  pub audio:       Option<Vec<u8>>,
}

/// Split a `#`-separated tag string, trimming whitespace and dropping empty
/// entries: `"#rust # async#"` becomes `["rust", "async"]`.
pub fn parse_tags(raw: &str) -> Vec<String> {
  raw
    .split('#')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}
