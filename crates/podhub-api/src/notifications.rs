//! The caller's notification feed.

use axum::{Json, extract::State};
use podhub_core::{notification::Notification, store::PodcastStore};
use serde_json::json;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, ApiResult},
};

/// `GET /notifications`, newest first.
pub async fn list<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> ApiResult<Json<Vec<Notification>>> {
  let feed = state
    .store
    .list_notifications(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(feed))
}

/// `DELETE /notifications`. Clears the caller's feed and nobody else's.
pub async fn clear<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
  let deleted = state
    .store
    .clear_notifications(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true, "deleted": deleted })))
}
