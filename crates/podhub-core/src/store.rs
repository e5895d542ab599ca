//! The `PodcastStore` trait and supporting query types.
//!
//! Implemented by storage backends (e.g. `podhub-store-sqlite`). The HTTP
//! layer depends on this abstraction only.
//!
//! Uniqueness rules (usernames, emails, podcast names, episode titles within a
//! podcast, one favorite/follow/listen-later entry per pair) are enforced by
//! the backend when the row is written and surface as
//! [`ErrorKind::Conflict`](crate::ErrorKind::Conflict). Callers never
//! pre-check.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Classify,
  notification::Notification,
  podcast::{
    Category, Episode, EpisodePatch, NewEpisode, NewPodcast, Podcast,
    PodcastPatch, PopularPodcast,
  },
  social::{Comment, Follow, NewComment, NewReply, Reply},
  user::{NewUser, Session, User, UserRef},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`PodcastStore::list_podcasts`]. The default lists every
/// podcast.
#[derive(Debug, Clone, Default)]
pub struct PodcastQuery {
  pub author_id: Option<Uuid>,
  pub category:  Option<Category>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a podhub storage backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime. Lookups of a single entity return
/// `Ok(None)` when it does not exist; deletions return whether a row was
/// removed.
pub trait PodcastStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Every user; the corpus for username search.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn set_bio(
    &self,
    id: Uuid,
    bio: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_user_image(
    &self,
    id: Uuid,
    image: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// `None` if the user does not exist or has no image.
  fn user_image(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;

  /// Whether the user has created at least one podcast.
  fn is_author(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The user owning an unexpired session with this token hash.
  fn session_user(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;

  fn delete_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Podcasts ──────────────────────────────────────────────────────────

  fn create_podcast(
    &self,
    input: NewPodcast,
  ) -> impl Future<Output = Result<Podcast, Self::Error>> + Send + '_;

  fn get_podcast(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Podcast>, Self::Error>> + Send + '_;

  /// Podcasts in creation order, filtered and paged by `query`.
  fn list_podcasts(
    &self,
    query: PodcastQuery,
  ) -> impl Future<Output = Result<Vec<Podcast>, Self::Error>> + Send + '_;

  fn podcast_cover(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;

  /// Apply `patch` and return the updated podcast. Errors with a
  /// `NotFound` kind if the podcast does not exist.
  fn update_podcast(
    &self,
    id: Uuid,
    patch: PodcastPatch,
  ) -> impl Future<Output = Result<Podcast, Self::Error>> + Send + '_;

  /// Deletes the podcast and, by cascade, its episodes and everything that
  /// hangs off them.
  fn delete_podcast(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Podcasts with at least one saved playback position, most played first.
  fn popular_podcasts(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PopularPodcast>, Self::Error>> + Send + '_;

  // ── Episodes ──────────────────────────────────────────────────────────

  fn create_episode(
    &self,
    input: NewEpisode,
  ) -> impl Future<Output = Result<Episode, Self::Error>> + Send + '_;

  fn get_episode(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Episode>, Self::Error>> + Send + '_;

  fn list_episodes(
    &self,
    podcast_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Episode>, Self::Error>> + Send + '_;

  fn episode_audio(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;

  fn update_episode(
    &self,
    id: Uuid,
    patch: EpisodePatch,
  ) -> impl Future<Output = Result<Episode, Self::Error>> + Send + '_;

  fn delete_episode(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Playback position ─────────────────────────────────────────────────

  /// Upsert the second at which `user_id` stopped listening. Returns `true`
  /// if this is the first position saved for the pair.
  fn set_playback(
    &self,
    user_id: Uuid,
    episode_id: Uuid,
    current_sec: u32,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_playback(
    &self,
    user_id: Uuid,
    episode_id: Uuid,
  ) -> impl Future<Output = Result<Option<u32>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Comments on an episode, oldest first, each with its replies.
  fn list_comments(
    &self,
    episode_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn add_reply(
    &self,
    input: NewReply,
  ) -> impl Future<Output = Result<Reply, Self::Error>> + Send + '_;

  fn get_reply(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Reply>, Self::Error>> + Send + '_;

  fn delete_reply(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Favorites ─────────────────────────────────────────────────────────

  fn add_favorite(
    &self,
    user_id: Uuid,
    podcast_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn remove_favorite(
    &self,
    user_id: Uuid,
    podcast_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_favorites(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Podcast>, Self::Error>> + Send + '_;

  // ── Listen later ──────────────────────────────────────────────────────

  fn add_stream_later(
    &self,
    user_id: Uuid,
    episode_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn remove_stream_later(
    &self,
    user_id: Uuid,
    episode_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_stream_later(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Episode>, Self::Error>> + Send + '_;

  fn in_stream_later(
    &self,
    user_id: Uuid,
    episode_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Follows ───────────────────────────────────────────────────────────

  fn follow(
    &self,
    follower_id: Uuid,
    followed_id: Uuid,
  ) -> impl Future<Output = Result<Follow, Self::Error>> + Send + '_;

  fn unfollow(
    &self,
    follower_id: Uuid,
    followed_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Users that `user_id` follows.
  fn list_following(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<UserRef>, Self::Error>> + Send + '_;

  /// Ids of every user following `user_id`.
  fn followers_of(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Insert the whole batch in one transaction; either every row is written
  /// or none is. Returns the number of rows written.
  fn insert_notifications(
    &self,
    batch: Vec<Notification>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The user's feed, newest first.
  fn list_notifications(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Delete every notification addressed to `user_id`; returns how many.
  fn clear_notifications(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
