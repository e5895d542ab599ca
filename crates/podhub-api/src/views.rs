//! JSON shapes returned by the API.
//!
//! Media is never inlined; views carry the URL the client should fetch it
//! from instead.

use chrono::{DateTime, Utc};
use podhub_core::{
  podcast::{Category, Episode, Podcast, PopularPodcast},
  social::{Comment, Reply},
  user::{User, UserRef},
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct PodcastView {
  pub id:          Uuid,
  pub name:        String,
  pub summary:     String,
  pub description: String,
  pub cover:       String,
  pub id_author:   Uuid,
  pub author:      UserRef,
  pub category:    Option<Category>,
  pub created_at:  DateTime<Utc>,
}

impl From<Podcast> for PodcastView {
  fn from(p: Podcast) -> Self {
    Self {
      id:          p.podcast_id,
      cover:       format!("/podcasts/{}/cover", p.podcast_id),
      name:        p.name,
      summary:     p.summary,
      description: p.description,
      id_author:   p.author.id,
      author:      p.author,
      category:    p.category,
      created_at:  p.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PopularView {
  #[serde(flatten)]
  pub podcast: PodcastView,
  pub views:   u64,
}

impl From<PopularPodcast> for PopularView {
  fn from(p: PopularPodcast) -> Self {
    Self { podcast: p.podcast.into(), views: p.views }
  }
}

#[derive(Debug, Serialize)]
pub struct EpisodeView {
  pub id:          Uuid,
  pub id_podcast:  Uuid,
  pub title:       String,
  pub description: String,
  pub tags:        Vec<String>,
  pub audio:       String,
  pub created_at:  DateTime<Utc>,
}

impl From<Episode> for EpisodeView {
  fn from(e: Episode) -> Self {
    Self {
      id:          e.episode_id,
      audio:       format!("/episodes/{}/audio", e.episode_id),
      id_podcast:  e.podcast_id,
      title:       e.title,
      description: e.description,
      tags:        e.tags,
      created_at:  e.created_at,
    }
  }
}

/// An episode page: the episode, where it belongs, and its discussion.
#[derive(Debug, Serialize)]
pub struct EpisodeDetail {
  #[serde(flatten)]
  pub episode:      EpisodeView,
  pub podcast_name: String,
  pub id_author:    Uuid,
  pub author_name:  String,
  pub comments:     Vec<CommentView>,
}

impl EpisodeDetail {
  pub fn new(episode: Episode, podcast: Podcast, comments: Vec<Comment>) -> Self {
    Self {
      episode:      episode.into(),
      podcast_name: podcast.name,
      id_author:    podcast.author.id,
      author_name:  podcast.author.username,
      comments:     comments.into_iter().map(Into::into).collect(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
  pub id:         Uuid,
  pub id_user:    Uuid,
  pub id_episode: Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub user:       UserRef,
  pub replies:    Vec<ReplyView>,
}

impl From<Comment> for CommentView {
  fn from(c: Comment) -> Self {
    Self {
      id:         c.comment_id,
      id_user:    c.user.id,
      id_episode: c.episode_id,
      content:    c.content,
      created_at: c.created_at,
      user:       c.user,
      replies:    c.replies.into_iter().map(Into::into).collect(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ReplyView {
  pub id:         Uuid,
  pub id_user:    Uuid,
  pub id_comment: Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub user:       UserRef,
}

impl From<Reply> for ReplyView {
  fn from(r: Reply) -> Self {
    Self {
      id:         r.reply_id,
      id_user:    r.user.id,
      id_comment: r.comment_id,
      content:    r.content,
      created_at: r.created_at,
      user:       r.user,
    }
  }
}

/// A user as listed in search results.
#[derive(Debug, Serialize)]
pub struct UserHit {
  pub id:       Uuid,
  pub username: String,
  pub email:    String,
  pub verified: bool,
}

impl From<&User> for UserHit {
  fn from(u: &User) -> Self {
    Self {
      id:       u.user_id,
      username: u.username.clone(),
      email:    u.email.clone(),
      verified: u.verified,
    }
  }
}
