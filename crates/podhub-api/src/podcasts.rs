//! Handlers for podcasts.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/podcasts` | `?limit=10&offset=0` |
//! | `POST`   | `/podcasts` | Multipart: `cover`, `name`, `summary`, `description`, `category` |
//! | `GET`    | `/podcasts/{id}` | |
//! | `PUT`    | `/podcasts/{id}` | Multipart, every part optional; author only |
//! | `DELETE` | `/podcasts/{id}` | Author only |
//! | `GET`    | `/podcasts/{id}/cover` | Raw image bytes |
//! | `GET`    | `/user/created_podcasts/{user_id}` | |
//! | `GET`    | `/populars` | Ten most played |

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use podhub_core::{
  notifier,
  podcast::{Category, NewPodcast, Podcast, PodcastPatch},
  store::{PodcastQuery, PodcastStore},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, ApiResult},
  form::UploadForm,
  views::{PodcastView, PopularView},
};

const DEFAULT_PAGE_SIZE: usize = 10;
const POPULAR_COUNT: usize = 10;

// ─── Shared lookups ──────────────────────────────────────────────────────────

pub(crate) async fn find_podcast<S: PodcastStore>(
  store: &S,
  id: Uuid,
) -> ApiResult<Podcast> {
  store
    .get_podcast(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("podcast {id} not found")))
}

/// The podcast `id`, provided `user` is its author.
pub(crate) async fn owned_podcast<S: PodcastStore>(
  store: &S,
  id: Uuid,
  user: &CurrentUser,
) -> ApiResult<Podcast> {
  let podcast = find_podcast(store, id).await?;
  if podcast.author.id != user.user_id {
    return Err(ApiError::Forbidden("only the author may modify this podcast".into()));
  }
  Ok(podcast)
}

fn category_field(form: &UploadForm) -> ApiResult<Option<Category>> {
  Ok(form.text("category").map(|c| Category::parse(&c)).transpose()?)
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Page {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /podcasts`
pub async fn list<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Query(page): Query<Page>,
) -> ApiResult<Json<Vec<PodcastView>>> {
  let podcasts = state
    .store
    .list_podcasts(PodcastQuery {
      limit: Some(page.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
      offset: Some(page.offset.unwrap_or(0)),
      ..PodcastQuery::default()
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(podcasts.into_iter().map(Into::into).collect()))
}

/// `GET /user/created_podcasts/{user_id}`
pub async fn created_by<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PodcastView>>> {
  let podcasts = state
    .store
    .list_podcasts(PodcastQuery { author_id: Some(user_id), ..PodcastQuery::default() })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(podcasts.into_iter().map(Into::into).collect()))
}

/// `GET /populars`
pub async fn populars<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
) -> ApiResult<Json<Vec<PopularView>>> {
  let popular = state
    .store
    .popular_podcasts(POPULAR_COUNT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(popular.into_iter().map(Into::into).collect()))
}

// ─── Single podcast ──────────────────────────────────────────────────────────

/// `POST /podcasts`
pub async fn create<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
  let mut form = UploadForm::read(multipart).await?;
  let input = NewPodcast {
    author_id:   user.user_id,
    cover:       form.require_file("cover")?,
    name:        form.require_text("name")?,
    summary:     form.require_text("summary")?,
    description: form.require_text("description")?,
    category:    category_field(&form)?,
  };

  let podcast = state.store.create_podcast(input).await.map_err(ApiError::store)?;
  tracing::info!(podcast_id = %podcast.podcast_id, name = %podcast.name, "podcast created");

  notifier::notify_new_podcast(&*state.store, &podcast)
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "id": podcast.podcast_id })),
  ))
}

/// `GET /podcasts/{id}`
pub async fn get_one<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<PodcastView>> {
  Ok(Json(find_podcast(&*state.store, id).await?.into()))
}

/// `PUT /podcasts/{id}`
pub async fn update<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> ApiResult<Json<PodcastView>> {
  owned_podcast(&*state.store, id, &user).await?;

  let mut form = UploadForm::read(multipart).await?;
  let patch = PodcastPatch {
    name:        form.text("name"),
    summary:     form.text("summary"),
    description: form.text("description"),
    category:    category_field(&form)?,
    cover:       form.take_file("cover"),
  };

  let podcast = state
    .store
    .update_podcast(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(podcast.into()))
}

/// `DELETE /podcasts/{id}`
pub async fn remove<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  owned_podcast(&*state.store, id, &user).await?;
  state.store.delete_podcast(id).await.map_err(ApiError::store)?;
  tracing::info!(podcast_id = %id, "podcast deleted");
  Ok(Json(json!({ "success": true })))
}

/// `GET /podcasts/{id}/cover`
pub async fn cover<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
  let bytes = state
    .store
    .podcast_cover(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("podcast {id} not found")))?;
  Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
