//! Follow-based fan-out: one notification per follower when an author
//! publishes a podcast or an episode.
//!
//! Runs synchronously inside the request that created the content, after the
//! content row is committed. The batch itself is atomic; the content write and
//! the batch are not.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  notification::{Notification, NotificationPayload},
  podcast::{Episode, Podcast},
  store::PodcastStore,
};

/// The two storage operations fan-out needs. Every [`PodcastStore`] is an
/// `Audience`.
pub trait Audience: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Ids of the users following `author_id`.
  fn audience_of(
    &self,
    author_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Persist the batch all-or-nothing; returns rows written.
  fn deliver(
    &self,
    batch: Vec<Notification>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

impl<S: PodcastStore> Audience for S {
  type Error = S::Error;

  fn audience_of(
    &self,
    author_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_ {
    self.followers_of(author_id)
  }

  fn deliver(
    &self,
    batch: Vec<Notification>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_ {
    self.insert_notifications(batch)
  }
}

/// Build one notification per follower, each carrying its own copy of the
/// snapshot.
pub fn fan_out(
  payload: &NotificationPayload,
  followers: &[Uuid],
  now: DateTime<Utc>,
) -> Vec<Notification> {
  followers
    .iter()
    .map(|&recipient_id| Notification {
      notification_id: Uuid::new_v4(),
      recipient_id,
      payload: payload.clone(),
      created_at: now,
    })
    .collect()
}

/// Notify every current follower of `author_id`. An author without followers
/// is a successful no-op.
pub async fn notify_followers<A: Audience>(
  audience: &A,
  author_id: Uuid,
  payload: NotificationPayload,
) -> Result<usize, A::Error> {
  let followers = audience.audience_of(author_id).await?;
  if followers.is_empty() {
    tracing::debug!(%author_id, "no followers to notify");
    return Ok(0);
  }

  let batch = fan_out(&payload, &followers, Utc::now());
  let delivered = audience.deliver(batch).await?;
  tracing::info!(
    %author_id,
    kind = payload.kind().as_ref(),
    delivered,
    "notified followers"
  );
  Ok(delivered)
}

/// Fan out a freshly created podcast to its author's followers.
pub async fn notify_new_podcast<A: Audience>(
  audience: &A,
  podcast: &Podcast,
) -> Result<usize, A::Error> {
  let payload = NotificationPayload::NewPodcast(podcast.into());
  notify_followers(audience, podcast.author.id, payload).await
}

/// Fan out a freshly created episode; the author is the parent podcast's.
pub async fn notify_new_episode<A: Audience>(
  audience: &A,
  podcast: &Podcast,
  episode: &Episode,
) -> Result<usize, A::Error> {
  debug_assert_eq!(episode.podcast_id, podcast.podcast_id);
  let payload = NotificationPayload::NewEpisode(episode.into());
  notify_followers(audience, podcast.author.id, payload).await
}
