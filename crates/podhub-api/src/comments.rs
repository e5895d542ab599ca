//! Handlers for comments and their replies.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/episodes/{id}/comments` | Oldest first, replies nested |
//! | `POST`   | `/episodes/{id}/comments` | Body: `{"content": "..."}` |
//! | `DELETE` | `/episodes/{id}/comments/{comment_id}` | Commenter only |
//! | `GET`    | `/episodes/{id}/comments/{comment_id}/replies` | |
//! | `DELETE` | `/comments/{id}` | Commenter only |
//! | `POST`   | `/comments/{id}/replies` | Body: `{"content": "..."}` |
//! | `DELETE` | `/replies/{id}` | Replier only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use podhub_core::{
  social::{Comment, NewComment, NewReply},
  store::PodcastStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  auth::CurrentUser,
  episodes::find_episode,
  error::{ApiError, ApiResult},
  views::{CommentView, ReplyView},
};

#[derive(Debug, Deserialize)]
pub struct ContentBody {
  #[serde(default)]
  pub content: String,
}

impl ContentBody {
  fn into_content(self) -> ApiResult<String> {
    let content = self.content.trim();
    if content.is_empty() {
      return Err(ApiError::BadRequest("content field is mandatory".into()));
    }
    Ok(content.to_owned())
  }
}

async fn find_comment<S: PodcastStore>(store: &S, id: Uuid) -> ApiResult<Comment> {
  store
    .get_comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))
}

async fn delete_owned_comment<S: PodcastStore>(
  store: &S,
  comment: Comment,
  user: &CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
  if comment.user.id != user.user_id {
    return Err(ApiError::Forbidden("only the commenter may delete this comment".into()));
  }
  store
    .delete_comment(comment.comment_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// `GET /episodes/{id}/comments`
pub async fn list<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(episode_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
  find_episode(&*state.store, episode_id).await?;
  let comments = state
    .store
    .list_comments(episode_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// `POST /episodes/{id}/comments`
pub async fn create<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(episode_id): Path<Uuid>,
  Json(body): Json<ContentBody>,
) -> ApiResult<impl IntoResponse> {
  let comment = state
    .store
    .add_comment(NewComment {
      episode_id,
      user_id: user.user_id,
      content: body.into_content()?,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(CommentView::from(comment))))
}

/// `DELETE /comments/{id}`
pub async fn remove<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  let comment = find_comment(&*state.store, id).await?;
  delete_owned_comment(&*state.store, comment, &user).await
}

/// `DELETE /episodes/{id}/comments/{comment_id}`
pub async fn remove_nested<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path((episode_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
  let comment = find_comment(&*state.store, comment_id).await?;
  if comment.episode_id != episode_id {
    return Err(ApiError::NotFound(format!(
      "comment {comment_id} not found on episode {episode_id}"
    )));
  }
  delete_owned_comment(&*state.store, comment, &user).await
}

// ─── Replies ─────────────────────────────────────────────────────────────────

/// `GET /episodes/{id}/comments/{comment_id}/replies`
pub async fn replies<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path((episode_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<ReplyView>>> {
  let comment = find_comment(&*state.store, comment_id).await?;
  if comment.episode_id != episode_id {
    return Err(ApiError::NotFound(format!(
      "comment {comment_id} not found on episode {episode_id}"
    )));
  }
  Ok(Json(comment.replies.into_iter().map(Into::into).collect()))
}

/// `POST /comments/{id}/replies`
pub async fn reply<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(comment_id): Path<Uuid>,
  Json(body): Json<ContentBody>,
) -> ApiResult<impl IntoResponse> {
  let reply = state
    .store
    .add_reply(NewReply {
      comment_id,
      user_id: user.user_id,
      content: body.into_content()?,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(ReplyView::from(reply))))
}

/// `DELETE /replies/{id}`
pub async fn remove_reply<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
  let reply = state
    .store
    .get_reply(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("reply {id} not found")))?;
  if reply.user.id != user.user_id {
    return Err(ApiError::Forbidden("only the author of a reply may delete it".into()));
  }
  state.store.delete_reply(id).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true })))
}
