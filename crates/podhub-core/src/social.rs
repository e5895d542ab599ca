//! Comments, replies, and follow edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub episode_id: Uuid,
  pub user:       UserRef,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  /// Oldest first.
  pub replies:    Vec<Reply>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
  pub reply_id:   Uuid,
  pub comment_id: Uuid,
  pub user:       UserRef,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub episode_id: Uuid,
  pub user_id:    Uuid,
  pub content:    String,
}

#[derive(Debug, Clone)]
pub struct NewReply {
  pub comment_id: Uuid,
  pub user_id:    Uuid,
  pub content:    String,
}

/// A directed edge: `follower_id` receives notifications about new content
/// published by `followed_id`. Each pair exists at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
  pub follower_id: Uuid,
  pub followed_id: Uuid,
  pub created_at:  DateTime<Utc>,
}
