//! Name search over users and podcasts.
//!
//! Both endpoints load the full corpus and hand it to the
//! [`Matcher`]: an exact name wins outright, otherwise every entry within the
//! distance threshold is returned, best first. Nothing within range renders
//! `404 {"message": "No good matches found"}`.

use axum::{
  Json,
  extract::{Path, State},
};
use podhub_core::{
  matcher::{Matcher, Scored},
  store::{PodcastQuery, PodcastStore},
};

use crate::{
  AppState,
  error::{ApiError, ApiResult},
  views::{PodcastView, UserHit},
};

fn non_empty(query: &str) -> ApiResult<&str> {
  if query.trim().is_empty() {
    return Err(ApiError::BadRequest("search query must not be empty".into()));
  }
  Ok(query)
}

/// `GET /search/user/{username}`
pub async fn users<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(username): Path<String>,
) -> ApiResult<Json<Vec<Scored<UserHit>>>> {
  let query = non_empty(&username)?;
  let corpus = state.store.list_users().await.map_err(ApiError::store)?;

  let hits = Matcher::default()
    .search(query, &corpus)?
    .into_iter()
    .map(|s| Scored { item: UserHit::from(s.item), match_percentage: s.match_percentage })
    .collect();
  Ok(Json(hits))
}

/// `GET /search/podcast/{name}`
pub async fn podcasts<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> ApiResult<Json<Vec<Scored<PodcastView>>>> {
  let query = non_empty(&name)?;
  let corpus = state
    .store
    .list_podcasts(PodcastQuery::default())
    .await
    .map_err(ApiError::store)?;

  let hits = Matcher::default()
    .search(query, corpus)?
    .into_iter()
    .map(|s| Scored { item: PodcastView::from(s.item), match_percentage: s.match_percentage })
    .collect();
  Ok(Json(hits))
}
