//! The fixed category list, its artwork, and podcasts by category.

use axum::{
  Json,
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};
use podhub_core::{
  podcast::Category,
  store::{PodcastQuery, PodcastStore},
};
use serde::Serialize;

use crate::{
  AppState,
  error::{ApiError, ApiResult},
  views::PodcastView,
};

#[derive(Debug, Serialize)]
pub struct CategoryView {
  pub title:     Category,
  pub image_url: String,
}

impl From<Category> for CategoryView {
  fn from(c: Category) -> Self {
    Self {
      image_url: format!("/categories/images/{}.{}", c, c.image_extension()),
      title:     c,
    }
  }
}

/// `GET /categories`
pub async fn list() -> Json<Vec<CategoryView>> {
  Json(Category::all().map(Into::into).collect())
}

/// `GET /podcasts/categories/{category}`
pub async fn podcasts<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(category): Path<String>,
) -> ApiResult<Json<Vec<PodcastView>>> {
  let category = Category::parse(&category)?;
  let podcasts = state
    .store
    .list_podcasts(PodcastQuery { category: Some(category), ..PodcastQuery::default() })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(podcasts.into_iter().map(Into::into).collect()))
}

fn image_content_type(file: &str) -> &'static str {
  match file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
    Some(ext) if ext == "png" => "image/png",
    Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
    Some(ext) if ext == "webp" => "image/webp",
    _ => "application/octet-stream",
  }
}

/// `GET /categories/images/{file}`
pub async fn image<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(file): Path<String>,
) -> ApiResult<impl IntoResponse> {
  if file.contains(['/', '\\']) || file.contains("..") {
    return Err(ApiError::BadRequest(format!("invalid image name {file:?}")));
  }

  let path = state.config.category_image_dir.join(&file);
  let bytes = tokio::fs::read(&path).await.map_err(|e| {
    tracing::debug!(path = %path.display(), error = %e, "category image unavailable");
    ApiError::NotFound(format!("image {file} not found"))
  })?;

  Ok(([(header::CONTENT_TYPE, image_content_type(&file))], bytes))
}
