//! Handlers for episodes and playback position.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/podcasts/{id}/episodes` | |
//! | `POST`   | `/podcasts/{id}/episodes` | Multipart: `audio`, `title`, `description`, `tags`; author only |
//! | `GET`    | `/episodes/{id}` | Episode with its podcast and comments |
//! | `PUT`    | `/episodes/{id}` | Multipart, every part optional; author only |
//! | `DELETE` | `/episodes/{id}` | Author only |
//! | `GET`    | `/episodes/{id}/audio` | Raw audio bytes |
//! | `PUT`    | `/update_current_sec/{id}` | Form field `current_sec` |
//! | `GET`    | `/get_current_sec/{id}` | `{"minute": n}` |

use axum::{
  Form, Json,
  extract::{Multipart, Path, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use podhub_core::{
  notifier,
  podcast::{Episode, EpisodePatch, NewEpisode, Podcast, parse_tags},
  store::PodcastStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, ApiResult},
  form::UploadForm,
  podcasts::{find_podcast, owned_podcast},
  views::{EpisodeDetail, EpisodeView},
};

pub(crate) async fn find_episode<S: PodcastStore>(
  store: &S,
  id: Uuid,
) -> ApiResult<Episode> {
  store
    .get_episode(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("episode {id} not found")))
}

/// The episode `id` and its podcast, provided `user` authored the podcast.
async fn owned_episode<S: PodcastStore>(
  store: &S,
  id: Uuid,
  user: &CurrentUser,
) -> ApiResult<(Episode, Podcast)> {
  let episode = find_episode(store, id).await?;
  let podcast = find_podcast(store, episode.podcast_id).await?;
  if podcast.author.id != user.user_id {
    return Err(ApiError::Forbidden("only the author may modify this episode".into()));
  }
  Ok((episode, podcast))
}

// ─── Episodes ────────────────────────────────────────────────────────────────

/// `GET /podcasts/{id}/episodes`
pub async fn list<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(podcast_id): Path<Uuid>,
) -> ApiResult<Json<Vec<EpisodeView>>> {
  find_podcast(&*state.store, podcast_id).await?;
  let episodes = state
    .store
    .list_episodes(podcast_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(episodes.into_iter().map(Into::into).collect()))
}

/// `POST /podcasts/{id}/episodes`
pub async fn create<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(podcast_id): Path<Uuid>,
  multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
  let podcast = owned_podcast(&*state.store, podcast_id, &user).await?;

  let mut form = UploadForm::read(multipart).await?;
  let input = NewEpisode {
    podcast_id,
    audio:       form.require_file("audio")?,
    title:       form.require_text("title")?,
    description: form.require_text("description")?,
    tags:        form.text("tags").map(|t| parse_tags(&t)).unwrap_or_default(),
  };

  let episode = state.store.create_episode(input).await.map_err(ApiError::store)?;
  tracing::info!(
    episode_id = %episode.episode_id,
    podcast_id = %podcast_id,
    "episode created"
  );

  notifier::notify_new_episode(&*state.store, &podcast, &episode)
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "id": episode.episode_id })),
  ))
}

/// `GET /episodes/{id}`
pub async fn get_one<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<EpisodeDetail>> {
  let episode = find_episode(&*state.store, id).await?;
  let podcast = find_podcast(&*state.store, episode.podcast_id).await?;
  let comments = state.store.list_comments(id).await.map_err(ApiError::store)?;
  Ok(Json(EpisodeDetail::new(episode, podcast, comments)))
}

/// `PUT /episodes/{id}`
pub async fn update<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> ApiResult<Json<EpisodeView>> {
  owned_episode(&*state.store, id, &user).await?;

  let mut form = UploadForm::read(multipart).await?;
  let patch = EpisodePatch {
    title:       form.text("title"),
    description: form.text("description"),
    tags:        form.text("tags").map(|t| parse_tags(&t)),
    audio:       form.take_file("audio"),
  };

  let episode = state
    .store
    .update_episode(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(episode.into()))
}

/// `DELETE /episodes/{id}`
pub async fn remove<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  owned_episode(&*state.store, id, &user).await?;
  state.store.delete_episode(id).await.map_err(ApiError::store)?;
  tracing::info!(episode_id = %id, "episode deleted");
  Ok(Json(json!({ "success": true })))
}

/// `GET /episodes/{id}/audio`
pub async fn audio<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
  let bytes = state
    .store
    .episode_audio(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("episode {id} not found")))?;
  Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes))
}

// ─── Playback position ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PositionForm {
  pub current_sec: Option<u32>,
}

/// `PUT /update_current_sec/{id}`
///
/// `201` the first time a position is saved for the episode, `200` after.
pub async fn save_position<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Form(form): Form<PositionForm>,
) -> ApiResult<impl IntoResponse> {
  let current_sec = form
    .current_sec
    .ok_or_else(|| ApiError::BadRequest("current_sec field is mandatory".into()))?;

  let created = state
    .store
    .set_playback(user.user_id, id, current_sec)
    .await
    .map_err(ApiError::store)?;

  let status = if created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(json!({ "success": true, "current_sec": current_sec }))))
}

/// `GET /get_current_sec/{id}`
pub async fn position<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  find_episode(&*state.store, id).await?;
  let minute = state
    .store
    .get_playback(user.user_id, id)
    .await
    .map_err(ApiError::store)?
    .unwrap_or(0);
  Ok(Json(json!({ "minute": minute })))
}
