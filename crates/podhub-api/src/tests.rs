use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use podhub_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{ApiConfig, AppState, api_router};

const PASSWORD: &str = "Secret12";
const BOUNDARY: &str = "podhub-test-boundary";

struct TestApp {
  router: Router,
}

struct Part<'a> {
  name:  &'a str,
  value: &'a [u8],
  file:  bool,
}

fn text<'a>(name: &'a str, value: &'a str) -> Part<'a> {
  Part { name, value: value.as_bytes(), file: false }
}

fn file<'a>(name: &'a str, value: &'a [u8]) -> Part<'a> {
  Part { name, value, file: true }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
  let mut body = Vec::new();
  for part in parts {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    if part.file {
      body.extend_from_slice(
        format!(
          "Content-Disposition: form-data; name=\"{}\"; filename=\"{}.bin\"\r\n\
           Content-Type: application/octet-stream\r\n\r\n",
          part.name, part.name
        )
        .as_bytes(),
      );
    } else {
      body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
      );
    }
    body.extend_from_slice(part.value);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

async fn body_bytes(resp: Response) -> Vec<u8> {
  axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap()
    .to_vec()
}

async fn body_json(resp: Response) -> Value {
  serde_json::from_slice(&body_bytes(resp).await).unwrap_or(Value::Null)
}

fn id_of(v: &Value) -> Uuid { Uuid::parse_str(v["id"].as_str().unwrap()).unwrap() }

impl TestApp {
  async fn new() -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Self { router: api_router(AppState::new(store, ApiConfig::default())) }
  }

  async fn send(&self, req: Request<Body>) -> Response {
    self.router.clone().oneshot(req).await.unwrap()
  }

  fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
  }

  async fn json(
    &self,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Self::request(method, uri, token);
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = self.send(req).await;
    (resp.status(), body_json(resp).await)
  }

  async fn form(&self, method: &str, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
    let req = Self::request(method, uri, Some(token))
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(body.to_owned()))
      .unwrap();
    let resp = self.send(req).await;
    (resp.status(), body_json(resp).await)
  }

  async fn multipart(
    &self,
    method: &str,
    uri: &str,
    token: &str,
    parts: &[Part<'_>],
  ) -> (StatusCode, Value) {
    let req = Self::request(method, uri, Some(token))
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(multipart_body(parts)))
      .unwrap();
    let resp = self.send(req).await;
    (resp.status(), body_json(resp).await)
  }

  async fn register(&self, username: &str) -> Uuid {
    let (status, body) = self
      .json(
        "POST",
        "/user",
        None,
        Some(json!({
          "username": username,
          "email": format!("{username}@example.com"),
          "password": PASSWORD,
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
  }

  async fn login(&self, username: &str) -> String {
    let (status, body) = self
      .json(
        "POST",
        "/login",
        None,
        Some(json!({ "email": format!("{username}@example.com"), "password": PASSWORD })),
      )
      .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_owned()
  }

  async fn user(&self, username: &str) -> (Uuid, String) {
    let id = self.register(username).await;
    (id, self.login(username).await)
  }

  async fn create_podcast(&self, token: &str, name: &str) -> (StatusCode, Value) {
    self
      .multipart("POST", "/podcasts", token, &[
        file("cover", b"\xff\xd8cover"),
        text("name", name),
        text("summary", "short summary"),
        text("description", "a longer description"),
        text("category", "Tecnología"),
      ])
      .await
  }

  async fn podcast(&self, token: &str, name: &str) -> Uuid {
    let (status, body) = self.create_podcast(token, name).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
  }

  async fn episode(&self, token: &str, podcast_id: Uuid, title: &str) -> Uuid {
    let (status, body) = self
      .multipart("POST", &format!("/podcasts/{podcast_id}/episodes"), token, &[
        file("audio", b"ID3audio"),
        text("title", title),
        text("description", "episode notes"),
        text("tags", "rust#async"),
      ])
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
  }
}

// ── Accounts and sessions ─────────────────────────────────────────────────────

#[tokio::test]
async fn root_reports_liveness() {
  let app = TestApp::new().await;
  let resp = app.send(Request::get("/").body(Body::empty()).unwrap()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_bytes(resp).await, b"podhub is running");
}

#[tokio::test]
async fn bearer_token_identifies_user() {
  let app = TestApp::new().await;
  let (id, token) = app.user("ana").await;

  let (status, body) = app.json("GET", "/protected", Some(token.as_str()), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["logged_in_as"], id.to_string());
}

#[tokio::test]
async fn login_sets_session_cookie() {
  let app = TestApp::new().await;
  let id = app.register("ana").await;

  let req = Request::post("/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(
      json!({ "email": "ana@example.com", "password": PASSWORD }).to_string(),
    ))
    .unwrap();
  let resp = app.send(req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .unwrap()
    .to_str()
    .unwrap()
    .to_owned();
  assert!(cookie.starts_with("podhub_session="));
  assert!(cookie.contains("HttpOnly"));

  let pair = cookie.split(';').next().unwrap().to_owned();
  let req = Request::get("/protected")
    .header(header::COOKIE, pair)
    .body(Body::empty())
    .unwrap();
  let resp = app.send(req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["logged_in_as"], id.to_string());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
  let app = TestApp::new().await;
  app.register("ana").await;

  let req = Request::post("/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(
      json!({ "email": "ana@example.com", "password": "Wrong123" }).to_string(),
    ))
    .unwrap();
  let resp = app.send(req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn missing_session_is_unauthorized() {
  let app = TestApp::new().await;
  let (status, _) = app.json("GET", "/protected", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = app.json("GET", "/protected", Some("deadbeef"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_session() {
  let app = TestApp::new().await;
  let (_, token) = app.user("ana").await;

  let (status, body) = app.json("POST", "/logout", Some(token.as_str()), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);

  let (status, _) = app.json("GET", "/protected", Some(token.as_str()), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
  let app = TestApp::new().await;
  app.register("ana").await;

  let (status, body) = app
    .json(
      "POST",
      "/user",
      None,
      Some(json!({ "username": "ana2", "email": "ana@example.com", "password": PASSWORD })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn weak_password_is_rejected() {
  let app = TestApp::new().await;
  let (status, _) = app
    .json(
      "POST",
      "/user",
      None,
      Some(json!({ "username": "ana", "email": "ana@example.com", "password": "short" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_type_reflects_authorship() {
  let app = TestApp::new().await;
  let (id, token) = app.user("ana").await;

  let (status, body) = app
    .form("PUT", "/user/bio", &token, "bio=I+talk+about+Rust")
    .await;
  assert_eq!(status, StatusCode::OK);

  let (_, body_before) = app.json("GET", &format!("/user/{id}"), None, None).await;
  assert_eq!(body_before["type"], "user", "{body}");
  assert_eq!(body_before["bio"], "I talk about Rust");

  app.podcast(&token, "Rustacean Station").await;
  let (_, body_after) = app.json("GET", &format!("/user/{id}"), None, None).await;
  assert_eq!(body_after["type"], "author");
  assert_eq!(body_after["name"], "ana");
}

// ── Podcasts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_podcast_is_readable() {
  let app = TestApp::new().await;
  let (author_id, token) = app.user("ana").await;
  let id = app.podcast(&token, "Rustacean Station").await;

  let (status, body) = app.json("GET", &format!("/podcasts/{id}"), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Rustacean Station");
  assert_eq!(body["category"], "Tecnología");
  assert_eq!(body["id_author"], author_id.to_string());
  assert_eq!(body["cover"], format!("/podcasts/{id}/cover"));

  let resp = app
    .send(Request::get(format!("/podcasts/{id}/cover")).body(Body::empty()).unwrap())
    .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
  assert_eq!(body_bytes(resp).await, b"\xff\xd8cover");
}

#[tokio::test]
async fn podcast_requires_cover() {
  let app = TestApp::new().await;
  let (_, token) = app.user("ana").await;
  let (status, body) = app
    .multipart("POST", "/podcasts", &token, &[
      text("name", "No cover"),
      text("summary", "s"),
      text("description", "d"),
    ])
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "cover file is mandatory");
}

#[tokio::test]
async fn unknown_category_is_bad_request() {
  let app = TestApp::new().await;
  let (_, token) = app.user("ana").await;
  let (status, _) = app
    .multipart("POST", "/podcasts", &token, &[
      file("cover", b"img"),
      text("name", "Cooking Show"),
      text("summary", "s"),
      text("description", "d"),
      text("category", "Cooking"),
    ])
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_podcast_name_conflicts() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  app.podcast(&ana, "Rustacean Station").await;

  let (status, body) = app.create_podcast(&bob, "Rustacean Station").await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"], "podcast name already exists");
}

#[tokio::test]
async fn only_author_may_modify_podcast() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  let id = app.podcast(&ana, "Rustacean Station").await;

  let (status, _) = app.json("DELETE", &format!("/podcasts/{id}"), Some(bob.as_str()), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = app
    .multipart("PUT", &format!("/podcasts/{id}"), &bob, &[text("name", "Hijacked")])
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = app
    .multipart("PUT", &format!("/podcasts/{id}"), &ana, &[text("summary", "new summary")])
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["summary"], "new summary");
  assert_eq!(body["name"], "Rustacean Station");

  let (status, _) = app.json("DELETE", &format!("/podcasts/{id}"), Some(ana.as_str()), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = app.json("GET", &format!("/podcasts/{id}"), None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn podcasts_are_paged_and_filtered() {
  let app = TestApp::new().await;
  let (ana_id, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  app.podcast(&ana, "First").await;
  app.podcast(&ana, "Second").await;
  app.podcast(&bob, "Third").await;

  let (_, body) = app.json("GET", "/podcasts?limit=2&offset=1", None, None).await;
  let names: Vec<_> = body.as_array().unwrap().iter().map(|p| p["name"].clone()).collect();
  assert_eq!(names, vec![json!("Second"), json!("Third")]);

  let (_, body) = app
    .json("GET", &format!("/user/created_podcasts/{ana_id}"), None, None)
    .await;
  assert_eq!(body.as_array().unwrap().len(), 2);

  let (status, body) = app
    .json("GET", "/podcasts/categories/Tecnolog%C3%ADa", None, None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 3);

  let (status, _) = app.json("GET", "/podcasts/categories/Cooking", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_are_listed_with_image_urls() {
  let app = TestApp::new().await;
  let (status, body) = app.json("GET", "/categories", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let first = &body.as_array().unwrap()[0];
  assert_eq!(first["title"], "Arte");
  assert_eq!(first["image_url"], "/categories/images/Arte.png");

  let (status, _) = app.json("GET", "/categories/images/..%2Fsecret", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Search ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn podcast_search_exact_then_fuzzy() {
  let app = TestApp::new().await;
  let (_, token) = app.user("ana").await;
  app.podcast(&token, "Rustacean Station").await;
  app.podcast(&token, "Rustacean Stations").await;

  let (status, body) = app
    .json("GET", "/search/podcast/Rustacean%20Station", None, None)
    .await;
  assert_eq!(status, StatusCode::OK);
  let hits = body.as_array().unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0]["name"], "Rustacean Station");
  assert_eq!(hits[0]["match_percentage"], 100.0);

  let (status, body) = app
    .json("GET", "/search/podcast/rustacean%20statio", None, None)
    .await;
  assert_eq!(status, StatusCode::OK);
  let hits = body.as_array().unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0]["name"], "Rustacean Station");
}

#[tokio::test]
async fn search_without_match_reports_message() {
  let app = TestApp::new().await;
  let (_, token) = app.user("ana").await;
  app.podcast(&token, "Rustacean Station").await;

  let (status, body) = app.json("GET", "/search/podcast/zzzz", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body, json!({ "message": "No good matches found" }));

  let (status, _) = app.json("GET", "/search/podcast/%20", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_search_ignores_accents() {
  let app = TestApp::new().await;
  let (status, _) = app
    .json(
      "POST",
      "/user",
      None,
      Some(json!({ "username": "josé", "email": "jose@example.com", "password": PASSWORD })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  app.register("someone").await;

  let (status, body) = app.json("GET", "/search/user/jose", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let hits = body.as_array().unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0]["username"], "josé");
  assert_eq!(hits[0]["match_percentage"], 100.0);
}

// ── Episodes and playback ─────────────────────────────────────────────────────

#[tokio::test]
async fn episode_detail_includes_discussion() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let (bob_id, bob) = app.user("bob").await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;
  let episode_id = app.episode(&ana, podcast_id, "Pilot").await;

  let (status, comment) = app
    .json(
      "POST",
      &format!("/episodes/{episode_id}/comments"),
      Some(bob.as_str()),
      Some(json!({ "content": "great show" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let comment_id = id_of(&comment);

  let (status, _) = app
    .json(
      "POST",
      &format!("/comments/{comment_id}/replies"),
      Some(ana.as_str()),
      Some(json!({ "content": "thanks!" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = app.json("GET", &format!("/episodes/{episode_id}"), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["title"], "Pilot");
  assert_eq!(body["tags"], json!(["rust", "async"]));
  assert_eq!(body["podcast_name"], "Rustacean Station");
  assert_eq!(body["author_name"], "ana");
  assert_eq!(body["comments"][0]["id_user"], bob_id.to_string());
  assert_eq!(body["comments"][0]["replies"][0]["content"], "thanks!");

  let (status, body) = app
    .json(
      "GET",
      &format!("/episodes/{episode_id}/comments/{comment_id}/replies"),
      None,
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn only_commenter_may_delete_comment() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;
  let episode_id = app.episode(&ana, podcast_id, "Pilot").await;

  let (_, comment) = app
    .json(
      "POST",
      &format!("/episodes/{episode_id}/comments"),
      Some(bob.as_str()),
      Some(json!({ "content": "hello" })),
    )
    .await;
  let comment_id = id_of(&comment);

  let (status, _) = app
    .json("DELETE", &format!("/comments/{comment_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = app
    .json(
      "DELETE",
      &format!("/episodes/{episode_id}/comments/{comment_id}"),
      Some(bob.as_str()),
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK);

  let (_, body) = app
    .json("GET", &format!("/episodes/{episode_id}/comments"), None, None)
    .await;
  assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_comment_is_rejected() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;
  let episode_id = app.episode(&ana, podcast_id, "Pilot").await;

  let (status, _) = app
    .json(
      "POST",
      &format!("/episodes/{episode_id}/comments"),
      Some(ana.as_str()),
      Some(json!({ "content": "   " })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_author_may_add_episodes() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;

  let (status, _) = app
    .multipart("POST", &format!("/podcasts/{podcast_id}/episodes"), &bob, &[
      file("audio", b"ID3"),
      text("title", "Intruder"),
      text("description", "d"),
    ])
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  app.episode(&ana, podcast_id, "Pilot").await;
  let (status, _) = app
    .multipart("POST", &format!("/podcasts/{podcast_id}/episodes"), &ana, &[
      file("audio", b"ID3"),
      text("title", "Pilot"),
      text("description", "again"),
    ])
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn playback_position_upserts() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;
  let episode_id = app.episode(&ana, podcast_id, "Pilot").await;

  let (status, body) = app
    .json("GET", &format!("/get_current_sec/{episode_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["minute"], 0);

  let uri = format!("/update_current_sec/{episode_id}");
  let (status, _) = app.form("PUT", &uri, &ana, "current_sec=42").await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = app.form("PUT", &uri, &ana, "current_sec=90").await;
  assert_eq!(status, StatusCode::OK);

  let (_, body) = app
    .json("GET", &format!("/get_current_sec/{episode_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(body["minute"], 90);

  let (_, body) = app.json("GET", "/populars", None, None).await;
  assert_eq!(body[0]["id"], podcast_id.to_string());
  assert_eq!(body[0]["views"], 1);
}

#[tokio::test]
async fn playback_on_missing_episode_is_not_found() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let uri = format!("/update_current_sec/{}", Uuid::new_v4());
  let (status, _) = app.form("PUT", &uri, &ana, "current_sec=5").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Library ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn favorites_and_listen_later() {
  let app = TestApp::new().await;
  let (_, ana) = app.user("ana").await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;
  let episode_id = app.episode(&ana, podcast_id, "Pilot").await;

  let (status, _) = app
    .json("POST", "/favorites", Some(ana.as_str()), Some(json!({ "id": podcast_id })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = app
    .json("POST", "/favorites", Some(ana.as_str()), Some(json!({ "id": podcast_id })))
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  let (_, body) = app.json("GET", "/favorites", Some(ana.as_str()), None).await;
  assert_eq!(body[0]["name"], "Rustacean Station");

  let (status, _) = app.json("POST", "/favorites", Some(ana.as_str()), Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, body) = app
    .json("GET", &format!("/stream_later/{episode_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(body["is_liked"], false);
  let (status, _) = app
    .json("POST", "/stream_later", Some(ana.as_str()), Some(json!({ "id": episode_id })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (_, body) = app
    .json("GET", &format!("/stream_later/{episode_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(body["is_liked"], true);

  let (status, _) = app
    .json("DELETE", &format!("/stream_later/{episode_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = app
    .json("DELETE", &format!("/stream_later/{episode_id}"), Some(ana.as_str()), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn follows_are_listed_and_removed() {
  let app = TestApp::new().await;
  let (ana_id, _) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;

  let (status, _) = app
    .json("POST", "/follows", Some(bob.as_str()), Some(json!({ "id": ana_id })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = app
    .json("POST", "/follows", Some(bob.as_str()), Some(json!({ "id": ana_id })))
    .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, body) = app.json("GET", "/follows", Some(bob.as_str()), None).await;
  assert_eq!(body, json!([{ "id": ana_id, "username": "ana" }]));

  let (status, _) = app
    .json("DELETE", &format!("/follows/{ana_id}"), Some(bob.as_str()), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = app
    .json("DELETE", &format!("/follows/{ana_id}"), Some(bob.as_str()), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = app
    .json("POST", "/follows", Some(bob.as_str()), Some(json!({ "id": Uuid::new_v4() })))
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Notifications ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_podcast_notifies_followers_only() {
  let app = TestApp::new().await;
  let (ana_id, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  let (_, eve) = app.user("eve").await;

  app
    .json("POST", "/follows", Some(bob.as_str()), Some(json!({ "id": ana_id })))
    .await;
  let podcast_id = app.podcast(&ana, "Rustacean Station").await;

  let (status, body) = app.json("GET", "/notifications", Some(bob.as_str()), None).await;
  assert_eq!(status, StatusCode::OK);
  let feed = body.as_array().unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0]["type"], "new_podcast");
  assert_eq!(feed[0]["object"]["id"], podcast_id.to_string());
  assert_eq!(feed[0]["object"]["name"], "Rustacean Station");

  for token in [&ana, &eve] {
    let (_, body) = app.json("GET", "/notifications", Some(token.as_str()), None).await;
    assert!(body.as_array().unwrap().is_empty());
  }
}

#[tokio::test]
async fn new_episode_notifies_followers_newest_first() {
  let app = TestApp::new().await;
  let (ana_id, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;

  let podcast_id = app.podcast(&ana, "Rustacean Station").await;
  app
    .json("POST", "/follows", Some(bob.as_str()), Some(json!({ "id": ana_id })))
    .await;
  app.episode(&ana, podcast_id, "Pilot").await;
  app.episode(&ana, podcast_id, "Second").await;

  let (_, body) = app.json("GET", "/notifications", Some(bob.as_str()), None).await;
  let feed = body.as_array().unwrap();
  assert_eq!(feed.len(), 2);
  assert_eq!(feed[0]["type"], "new_episode");
  assert_eq!(feed[0]["object"]["title"], "Second");
  assert_eq!(feed[1]["object"]["title"], "Pilot");
  assert_eq!(feed[1]["object"]["id_podcast"], podcast_id.to_string());
}

#[tokio::test]
async fn clearing_notifications_is_scoped_to_caller() {
  let app = TestApp::new().await;
  let (ana_id, ana) = app.user("ana").await;
  let (_, bob) = app.user("bob").await;
  let (_, eve) = app.user("eve").await;

  for token in [&bob, &eve] {
    app
      .json("POST", "/follows", Some(token.as_str()), Some(json!({ "id": ana_id })))
      .await;
  }
  app.podcast(&ana, "Rustacean Station").await;

  let (status, body) = app.json("DELETE", "/notifications", Some(bob.as_str()), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["deleted"], 1);

  let (_, body) = app.json("GET", "/notifications", Some(bob.as_str()), None).await;
  assert!(body.as_array().unwrap().is_empty());
  let (_, body) = app.json("GET", "/notifications", Some(eve.as_str()), None).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
}
