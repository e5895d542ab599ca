//! JSON REST API for podhub.
//!
//! Exposes an axum [`Router`] backed by any [`PodcastStore`]. Sessions are
//! opaque server-side tokens; see [`auth`]. TLS and request tracing are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = podhub_api::api_router(AppState::new(store, ApiConfig::default()));
//! ```

pub mod auth;
pub mod categories;
pub mod comments;
pub mod episodes;
pub mod error;
pub mod form;
pub mod library;
pub mod notifications;
pub mod podcasts;
pub mod search;
pub mod users;
pub mod views;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post, put},
};
use chrono::Duration;
use podhub_core::store::PodcastStore;

pub use error::{ApiError, ApiResult};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime knobs for the API layer.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// How long a login session stays valid.
  pub session_ttl:        Duration,
  /// Upper bound on any request body, uploads included.
  pub max_upload_bytes:   usize,
  /// Directory holding the artwork served under `/categories/images`.
  pub category_image_dir: PathBuf,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      session_ttl:        Duration::hours(24),
      max_upload_bytes:   50 * 1024 * 1024,
      category_image_dir: PathBuf::from("./categories"),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ApiConfig) -> Self {
    Self { store: Arc::new(store), config: Arc::new(config) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config.clone() }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router
where
  S: PodcastStore + 'static,
{
  let body_limit = state.config.max_upload_bytes;

  Router::new()
    .route("/", get(users::root))
    // Accounts
    .route("/user", post(users::register::<S>))
    .route("/login", post(users::login::<S>))
    .route("/logout", post(users::logout::<S>))
    .route("/protected", get(users::protected))
    .route("/user/bio", put(users::edit_bio::<S>))
    .route("/user/image", put(users::upload_image::<S>))
    .route("/user/created_podcasts/{user_id}", get(podcasts::created_by::<S>))
    .route("/user/{id}", get(users::profile::<S>))
    .route("/user/{id}/image", get(users::image::<S>))
    // Search
    .route("/search/user/{username}", get(search::users::<S>))
    .route("/search/podcast/{name}", get(search::podcasts::<S>))
    // Podcasts
    .route("/podcasts", get(podcasts::list::<S>).post(podcasts::create::<S>))
    .route(
      "/podcasts/{id}",
      get(podcasts::get_one::<S>)
        .put(podcasts::update::<S>)
        .delete(podcasts::remove::<S>),
    )
    .route("/podcasts/{id}/cover", get(podcasts::cover::<S>))
    .route(
      "/podcasts/{id}/episodes",
      get(episodes::list::<S>).post(episodes::create::<S>),
    )
    .route("/podcasts/categories/{category}", get(categories::podcasts::<S>))
    .route("/populars", get(podcasts::populars::<S>))
    // Categories
    .route("/categories", get(categories::list))
    .route("/categories/images/{file}", get(categories::image::<S>))
    // Episodes
    .route(
      "/episodes/{id}",
      get(episodes::get_one::<S>)
        .put(episodes::update::<S>)
        .delete(episodes::remove::<S>),
    )
    .route("/episodes/{id}/audio", get(episodes::audio::<S>))
    .route("/update_current_sec/{id}", put(episodes::save_position::<S>))
    .route("/get_current_sec/{id}", get(episodes::position::<S>))
    // Comments
    .route(
      "/episodes/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/episodes/{id}/comments/{comment_id}", delete(comments::remove_nested::<S>))
    .route("/episodes/{id}/comments/{comment_id}/replies", get(comments::replies::<S>))
    .route("/comments/{id}", delete(comments::remove::<S>))
    .route("/comments/{id}/replies", post(comments::reply::<S>))
    .route("/replies/{id}", delete(comments::remove_reply::<S>))
    // Library
    .route(
      "/favorites",
      get(library::favorites::<S>).post(library::add_favorite::<S>),
    )
    .route("/favorites/{id}", delete(library::remove_favorite::<S>))
    .route(
      "/stream_later",
      get(library::stream_later::<S>).post(library::add_stream_later::<S>),
    )
    .route(
      "/stream_later/{id}",
      get(library::in_stream_later::<S>).delete(library::remove_stream_later::<S>),
    )
    .route("/follows", get(library::following::<S>).post(library::follow::<S>))
    .route("/follows/{id}", delete(library::unfollow::<S>))
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S>).delete(notifications::clear::<S>),
    )
    .layer(DefaultBodyLimit::max(body_limit))
    .with_state(state)
}

#[cfg(test)]
mod tests;
