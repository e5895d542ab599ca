//! Handlers for accounts and sessions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Liveness text |
//! | `POST` | `/user` | Body: `{"username","email","password"}` |
//! | `POST` | `/login` | Body: `{"email","password"}`; sets the session cookie |
//! | `POST` | `/logout` | Ends the presented session, if any |
//! | `GET`  | `/protected` | `{"logged_in_as": id}` |
//! | `GET`  | `/user/{id}` | `{"name","bio","type"}` |
//! | `PUT`  | `/user/bio` | Form field `bio` |
//! | `PUT`  | `/user/image` | Multipart file `image` |
//! | `GET`  | `/user/{id}/image` | Raw image bytes |

use axum::{
  Form, Json,
  extract::{Multipart, Path, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use podhub_core::{
  store::PodcastStore,
  user::{NewUser, Session, UserType, validate_email, validate_password},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{self, CurrentUser},
  error::{ApiError, ApiResult},
  form::UploadForm,
};

/// `GET /`
pub async fn root() -> &'static str { "podhub is running" }

// ─── Registration ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub email:    String,
  pub password: String,
}

/// `POST /user`
pub async fn register<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> ApiResult<impl IntoResponse> {
  let username = body.username.trim().to_owned();
  let email = body.email.trim().to_owned();
  if username.is_empty() || email.is_empty() {
    return Err(ApiError::BadRequest("username and email are required".into()));
  }
  validate_email(&email)?;
  validate_password(&body.password)?;

  let password_hash = auth::hash_password(&body.password)?;
  let user = state
    .store
    .create_user(NewUser { email, username, password_hash })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.user_id, username = %user.username, "user registered");
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "id": user.user_id,
    })),
  ))
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub success:    bool,
  pub token:      String,
  pub expires_at: chrono::DateTime<Utc>,
}

/// `POST /login`
pub async fn login<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> ApiResult<impl IntoResponse> {
  let user = state
    .store
    .get_user_by_email(body.email.trim().to_owned())
    .await
    .map_err(ApiError::store)?;

  let Some(user) = user.filter(|u| auth::verify_password(&body.password, &u.password_hash))
  else {
    tracing::warn!(email = %body.email, "rejected login");
    return Err(ApiError::Unauthorized("login details are incorrect".into()));
  };

  let token = auth::new_token();
  let now = Utc::now();
  let expires_at = now + state.config.session_ttl;
  state
    .store
    .create_session(Session {
      token_hash: auth::hash_token(&token),
      user_id: user.user_id,
      created_at: now,
      expires_at,
    })
    .await
    .map_err(ApiError::store)?;

  let cookie = auth::session_cookie(&token, now, expires_at)?;
  Ok((
    [(header::SET_COOKIE, cookie)],
    Json(LoginResponse { success: true, token, expires_at }),
  ))
}

/// `POST /logout`
pub async fn logout<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
  if let Some(token) = auth::session_token(&headers) {
    state
      .store
      .delete_session(auth::hash_token(&token))
      .await
      .map_err(ApiError::store)?;
  }
  Ok((
    [(header::SET_COOKIE, auth::cleared_cookie()?)],
    Json(json!({ "success": true })),
  ))
}

/// `GET /protected`
pub async fn protected(user: CurrentUser) -> Json<serde_json::Value> {
  Json(json!({ "logged_in_as": user.user_id }))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileView {
  pub name:      String,
  pub bio:       Option<String>,
  #[serde(rename = "type")]
  pub user_type: UserType,
}

/// `GET /user/{id}`
pub async fn profile<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> ApiResult<Json<ProfileView>> {
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  let user_type = if state.store.is_author(id).await.map_err(ApiError::store)? {
    UserType::Author
  } else {
    UserType::User
  };

  Ok(Json(ProfileView { name: user.username, bio: user.bio, user_type }))
}

#[derive(Debug, Deserialize)]
pub struct BioForm {
  pub bio: Option<String>,
}

/// `PUT /user/bio`
pub async fn edit_bio<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Form(form): Form<BioForm>,
) -> ApiResult<Json<serde_json::Value>> {
  let bio = form.bio.filter(|b| !b.trim().is_empty());
  state.store.set_bio(user.user_id, bio).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "bio updated" })))
}

/// `PUT /user/image`
pub async fn upload_image<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
  let mut form = UploadForm::read(multipart).await?;
  let image = form.require_file("image")?;
  state
    .store
    .set_user_image(user.user_id, image)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "image updated" })))
}

/// `GET /user/{id}/image`
pub async fn image<S: PodcastStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
  let bytes = state
    .store
    .user_image(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} has no image")))?;
  Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
