//! Encoding and decoding helpers between podhub domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (UTC, microsecond
//! precision) so that lexical order is chronological order. Tags and
//! notification snapshots are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use podhub_core::{
  notification::{Notification, NotificationPayload},
  podcast::{Category, Episode, Podcast},
  social::{Comment, Reply},
  user::{User, UserRef},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Category ────────────────────────────────────────────────────────────────

pub fn encode_category(c: Option<Category>) -> Option<String> {
  c.map(|c| c.as_ref().to_owned())
}

pub fn decode_category(s: Option<&str>) -> Result<Option<Category>> {
  Ok(s.map(Category::parse).transpose()?)
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "u.user_id, u.email, u.username, u.password_hash, u.verified, u.bio, u.created_at";

pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub username:      String,
  pub password_hash: String,
  pub verified:      bool,
  pub bio:           Option<String>,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      username:      row.get(2)?,
      password_hash: row.get(3)?,
      verified:      row.get(4)?,
      bio:           row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      username:      self.username,
      password_hash: self.password_hash,
      verified:      self.verified,
      bio:           self.bio,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawPodcast::from_row`]; expects `podcasts p`
/// joined with `users u` on the author.
pub const PODCAST_COLUMNS: &str = "p.podcast_id, p.name, p.summary, p.description, \
   p.author_id, u.username, p.category, p.created_at";

pub struct RawPodcast {
  pub podcast_id:      String,
  pub name:            String,
  pub summary:         String,
  pub description:     String,
  pub author_id:       String,
  pub author_username: String,
  pub category:        Option<String>,
  pub created_at:      String,
}

impl RawPodcast {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      podcast_id:      row.get(0)?,
      name:            row.get(1)?,
      summary:         row.get(2)?,
      description:     row.get(3)?,
      author_id:       row.get(4)?,
      author_username: row.get(5)?,
      category:        row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_podcast(self) -> Result<Podcast> {
    Ok(Podcast {
      podcast_id:  decode_uuid(&self.podcast_id)?,
      name:        self.name,
      summary:     self.summary,
      description: self.description,
      author:      UserRef {
        id:       decode_uuid(&self.author_id)?,
        username: self.author_username,
      },
      category:    decode_category(self.category.as_deref())?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawEpisode::from_row`].
pub const EPISODE_COLUMNS: &str =
  "e.episode_id, e.podcast_id, e.title, e.description, e.tags, e.created_at";

pub struct RawEpisode {
  pub episode_id:  String,
  pub podcast_id:  String,
  pub title:       String,
  pub description: String,
  pub tags:        String,
  pub created_at:  String,
}

impl RawEpisode {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      episode_id:  row.get(0)?,
      podcast_id:  row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      tags:        row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_episode(self) -> Result<Episode> {
    Ok(Episode {
      episode_id:  decode_uuid(&self.episode_id)?,
      podcast_id:  decode_uuid(&self.podcast_id)?,
      title:       self.title,
      description: self.description,
      tags:        decode_tags(&self.tags)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawComment::from_row`]; expects `comments c`
/// joined with `users u`.
pub const COMMENT_COLUMNS: &str =
  "c.comment_id, c.episode_id, c.user_id, u.username, c.content, c.created_at";

pub struct RawComment {
  pub comment_id: String,
  pub episode_id: String,
  pub user_id:    String,
  pub username:   String,
  pub content:    String,
  pub created_at: String,
}

impl RawComment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      episode_id: row.get(1)?,
      user_id:    row.get(2)?,
      username:   row.get(3)?,
      content:    row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  /// Replies are attached by the caller.
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      episode_id: decode_uuid(&self.episode_id)?,
      user:       UserRef { id: decode_uuid(&self.user_id)?, username: self.username },
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      replies:    Vec::new(),
    })
  }
}

/// Column list matching [`RawReply::from_row`]; expects `replies r` joined
/// with `users u`.
pub const REPLY_COLUMNS: &str =
  "r.reply_id, r.comment_id, r.user_id, u.username, r.content, r.created_at";

pub struct RawReply {
  pub reply_id:   String,
  pub comment_id: String,
  pub user_id:    String,
  pub username:   String,
  pub content:    String,
  pub created_at: String,
}

impl RawReply {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reply_id:   row.get(0)?,
      comment_id: row.get(1)?,
      user_id:    row.get(2)?,
      username:   row.get(3)?,
      content:    row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_reply(self) -> Result<Reply> {
    Ok(Reply {
      reply_id:   decode_uuid(&self.reply_id)?,
      comment_id: decode_uuid(&self.comment_id)?,
      user:       UserRef { id: decode_uuid(&self.user_id)?, username: self.username },
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawNotification {
  pub notification_id: String,
  pub recipient_id:    String,
  pub kind:            String,
  pub object_json:     String,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      recipient_id:    row.get(1)?,
      kind:            row.get(2)?,
      object_json:     row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    let object: serde_json::Value = serde_json::from_str(&self.object_json)?;
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_id:    decode_uuid(&self.recipient_id)?,
      payload:         NotificationPayload::from_parts(&self.kind, object)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
