//! A user's own collections: favorite podcasts, episodes saved to listen
//! later, and followed authors. Every route requires a session and only
//! ever touches the caller's rows.
//!
//! `POST` bodies are `{"id": "<uuid>"}`; the id names the podcast, episode or
//! user being added.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use podhub_core::{store::PodcastStore, user::UserRef};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, ApiResult},
  views::{EpisodeView, PodcastView},
};

#[derive(Debug, Deserialize)]
pub struct TargetBody {
  pub id: Option<Uuid>,
}

impl TargetBody {
  fn id(&self) -> ApiResult<Uuid> {
    self.id.ok_or_else(|| ApiError::BadRequest("id field is mandatory".into()))
  }
}

fn created() -> impl IntoResponse {
  (StatusCode::CREATED, Json(json!({ "success": true })))
}

fn removed(found: bool, what: &str) -> ApiResult<Json<serde_json::Value>> {
  if !found {
    return Err(ApiError::NotFound(format!("{what} not found")));
  }
  Ok(Json(json!({ "success": true })))
}

// ─── Favorites ───────────────────────────────────────────────────────────────

/// `GET /favorites`
pub async fn favorites<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> ApiResult<Json<Vec<PodcastView>>> {
  let podcasts = state
    .store
    .list_favorites(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(podcasts.into_iter().map(Into::into).collect()))
}

/// `POST /favorites`
pub async fn add_favorite<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<TargetBody>,
) -> ApiResult<impl IntoResponse> {
  state
    .store
    .add_favorite(user.user_id, body.id()?)
    .await
    .map_err(ApiError::store)?;
  Ok(created())
}

/// `DELETE /favorites/{id}`
pub async fn remove_favorite<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(podcast_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  let found = state
    .store
    .remove_favorite(user.user_id, podcast_id)
    .await
    .map_err(ApiError::store)?;
  removed(found, "favorite")
}

// ─── Listen later ────────────────────────────────────────────────────────────

/// `GET /stream_later`
pub async fn stream_later<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> ApiResult<Json<Vec<EpisodeView>>> {
  let episodes = state
    .store
    .list_stream_later(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(episodes.into_iter().map(Into::into).collect()))
}

/// `POST /stream_later`
pub async fn add_stream_later<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<TargetBody>,
) -> ApiResult<impl IntoResponse> {
  state
    .store
    .add_stream_later(user.user_id, body.id()?)
    .await
    .map_err(ApiError::store)?;
  Ok(created())
}

/// `GET /stream_later/{id}`
pub async fn in_stream_later<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(episode_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  let saved = state
    .store
    .in_stream_later(user.user_id, episode_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "is_liked": saved })))
}

/// `DELETE /stream_later/{id}`
pub async fn remove_stream_later<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(episode_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  let found = state
    .store
    .remove_stream_later(user.user_id, episode_id)
    .await
    .map_err(ApiError::store)?;
  removed(found, "listen later entry")
}

// ─── Follows ─────────────────────────────────────────────────────────────────

/// `GET /follows`
pub async fn following<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> ApiResult<Json<Vec<UserRef>>> {
  let users = state
    .store
    .list_following(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(users))
}

/// `POST /follows`
pub async fn follow<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<TargetBody>,
) -> ApiResult<impl IntoResponse> {
  let followed_id = body.id()?;
  state
    .store
    .follow(user.user_id, followed_id)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(follower_id = %user.user_id, %followed_id, "follow added");
  Ok(created())
}

/// `DELETE /follows/{id}`
pub async fn unfollow<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(followed_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  let found = state
    .store
    .unfollow(user.user_id, followed_id)
    .await
    .map_err(ApiError::store)?;
  removed(found, "follow")
}
