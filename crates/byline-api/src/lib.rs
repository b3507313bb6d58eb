//! HTTP layer for the byline blog backend.
//!
//! Exposes an axum [`Router`] over any [`BlogStore`]: post and profile
//! CRUD, bearer-token authentication, image upload, media serving, and the
//! response cache-control policy.

pub mod auth;
pub mod cache;
pub mod error;
pub mod posts;
pub mod profiles;
pub mod repr;
pub mod upload;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  middleware,
  routing::{get, post},
};
use byline_auth::TokenVerifier;
use byline_core::store::BlogStore;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BYLINE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  /// Public base URL, used to build upload references.
  pub base_url:    String,
  pub mongodb_uri: String,
  pub database:    String,
  pub media_root:  PathBuf,
  pub jwks_url:    String,
  pub auth_audience: Option<String>,
  pub auth_issuer:   Option<String>,
  /// Gates the clock-skew verification fallback. Never set in production.
  #[serde(default)]
  pub auth_development_mode: bool,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: BlogStore> {
  pub store:    Arc<S>,
  pub verifier: Arc<TokenVerifier>,
  pub config:   Arc<ServerConfig>,
}

// Manual impl: `S` itself need not be `Clone` behind the `Arc`.
impl<S: BlogStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      verifier: Arc::clone(&self.verifier),
      config:   Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the blog API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BlogStore + 'static,
{
  let media = ServeDir::new(&state.config.media_root);

  Router::new()
    .route("/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route("/posts/liked", get(posts::liked::<S>))
    .route(
      "/posts/{reference}",
      get(posts::get_one::<S>)
        .put(posts::replace::<S>)
        .patch(posts::patch::<S>)
        .delete(posts::delete::<S>),
    )
    .route("/posts/{reference}/like", post(posts::like::<S>))
    .route("/posts/{reference}/view", get(posts::view::<S>))
    .route(
      "/profiles/me",
      get(profiles::me::<S>)
        .post(profiles::me_update::<S>)
        .patch(profiles::me_update::<S>),
    )
    .route("/profiles/{reference}", get(profiles::get_one::<S>))
    .route("/profiles/{reference}/public", get(profiles::get_public::<S>))
    .route(
      "/upload",
      post(upload::handler::<S>)
        .layer(DefaultBodyLimit::max(upload::BODY_LIMIT)),
    )
    .nest_service("/media", media)
    .layer(middleware::from_fn(cache::apply))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use byline_auth::{KeySet, VerifierConfig};
  use byline_store::MemoryStore;
  use chrono::Utc;
  use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  const SECRET: &[u8] = b"byline-integration-test-secret-key";
  const KID: &str = "test-key";

  fn make_state(development_mode: bool) -> AppState<MemoryStore> {
    let media_root =
      std::env::temp_dir().join(format!("byline-test-{}", Uuid::new_v4()));
    let config = ServerConfig {
      host:        "127.0.0.1".to_string(),
      port:        8000,
      base_url:    "http://localhost:8000".to_string(),
      mongodb_uri: String::new(),
      database:    "byline".to_string(),
      media_root,
      jwks_url:    String::new(),
      auth_audience: None,
      auth_issuer: None,
      auth_development_mode: development_mode,
    };
    let verifier = TokenVerifier::with_key_set(
      VerifierConfig {
        development_mode,
        ..VerifierConfig::default()
      },
      KeySet::symmetric(KID, SECRET),
    );
    AppState {
      store:    Arc::new(MemoryStore::new()),
      verifier: Arc::new(verifier),
      config:   Arc::new(config),
    }
  }

  fn token_for(claims: Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_string());
    format!(
      "Bearer {}",
      encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    )
  }

  fn token(sub: &str, email: &str, name: &str) -> String {
    let now = Utc::now().timestamp();
    let mut claims = json!({
      "sub": sub, "email": email, "iat": now, "exp": now + 3600,
    });
    if !name.is_empty() {
      claims["name"] = json!(name);
    }
    token_for(claims)
  }

  async fn request(
    state: &AppState<MemoryStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
      Some(value) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(value.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(response: axum::response::Response) -> Value {
    let bytes =
      axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create_post(
    state: &AppState<MemoryStore>,
    auth: &str,
    title: &str,
  ) -> Value {
    let resp = request(
      state,
      "POST",
      "/posts",
      Some(auth),
      Some(json!({ "title": title, "content": "lorem ipsum" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
  }

  // ── Posts ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_listing_is_allowed_and_cached() {
    let state = make_state(false);
    let resp = request(&state, "GET", "/posts", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CACHE_CONTROL).unwrap(),
      "public, max-age=300"
    );
    assert_eq!(body_json(resp).await, json!([]));
  }

  #[tokio::test]
  async fn creating_a_post_requires_authentication() {
    let state = make_state(false);
    let resp = request(
      &state,
      "POST",
      "/posts",
      None,
      Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = request(
      &state,
      "POST",
      "/posts",
      Some("Bearer garbage"),
      Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn malformed_auth_header_proceeds_as_anonymous() {
    let state = make_state(false);
    // Wrong scheme and wrong field count are "no identity attempted",
    // so a read-only request still succeeds.
    for bad in ["Basic abc", "Bearer a b c"] {
      let resp = request(&state, "GET", "/posts", Some(bad), None).await;
      assert_eq!(resp.status(), StatusCode::OK);
    }
  }

  #[tokio::test]
  async fn create_and_fetch_roundtrip() {
    let state = make_state(false);
    let auth = token("writer-1", "ada@x.com", "Ada");

    let created = create_post(&state, &auth, "hello").await;
    assert_eq!(created["title"], "hello");
    assert_eq!(created["author"], "writer-1");
    assert_eq!(created["author_name"], "Ada");
    assert_eq!(created["views"], 0);
    assert_eq!(created["like_count"], 0);
    assert_eq!(created["is_liked"], false);

    let id = created["_id"].as_str().unwrap();
    let resp =
      request(&state, "GET", &format!("/posts/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CACHE_CONTROL).unwrap(),
      "public, max-age=3600"
    );
    let fetched = body_json(resp).await;
    assert_eq!(fetched["_id"], *id);
    assert_eq!(fetched["content"], "lorem ipsum");
  }

  #[tokio::test]
  async fn unknown_post_reference_is_404() {
    let state = make_state(false);
    for reference in ["not-a-key", "64f0c2a7e13d4b5a9c8d7e6f"] {
      let resp =
        request(&state, "GET", &format!("/posts/{reference}"), None, None)
          .await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND);
      let body = body_json(resp).await;
      assert!(body["error"].as_str().unwrap().contains("not found"));
    }
  }

  #[tokio::test]
  async fn empty_title_is_a_validation_failure() {
    let state = make_state(false);
    let auth = token("writer-1", "ada@x.com", "");
    let resp = request(
      &state,
      "POST",
      "/posts",
      Some(&auth),
      Some(json!({ "title": "  ", "content": "c" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn owner_can_update_and_patch() {
    let state = make_state(false);
    let auth = token("writer-1", "ada@x.com", "");
    let created = create_post(&state, &auth, "v1").await;
    let id = created["_id"].as_str().unwrap();

    let resp = request(
      &state,
      "PUT",
      &format!("/posts/{id}"),
      Some(&auth),
      Some(json!({ "title": "v2", "content": "new body" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["title"], "v2");

    // PATCH leaves absent fields untouched.
    let resp = request(
      &state,
      "PATCH",
      &format!("/posts/{id}"),
      Some(&auth),
      Some(json!({ "title": "v3" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let patched = body_json(resp).await;
    assert_eq!(patched["title"], "v3");
    assert_eq!(patched["content"], "new body");
  }

  #[tokio::test]
  async fn non_owner_writes_are_forbidden_and_change_nothing() {
    let state = make_state(false);
    let owner = token("user-a", "a@x.com", "");
    let intruder = token("user-b", "b@x.com", "");
    let created = create_post(&state, &owner, "mine").await;
    let id = created["_id"].as_str().unwrap();

    let resp = request(
      &state,
      "DELETE",
      &format!("/posts/{id}"),
      Some(&intruder),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = request(
      &state,
      "PUT",
      &format!("/posts/{id}"),
      Some(&intruder),
      Some(json!({ "title": "stolen", "content": "x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The post is untouched.
    let fetched =
      body_json(request(&state, "GET", &format!("/posts/{id}"), None, None).await)
        .await;
    assert_eq!(fetched["title"], "mine");
  }

  #[tokio::test]
  async fn owner_delete_returns_204() {
    let state = make_state(false);
    let auth = token("user-a", "a@x.com", "");
    let created = create_post(&state, &auth, "ephemeral").await;
    let id = created["_id"].as_str().unwrap();

    let resp =
      request(&state, "DELETE", &format!("/posts/{id}"), Some(&auth), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = request(&state, "GET", &format!("/posts/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn like_toggle_endpoint_flips_membership() {
    let state = make_state(false);
    let writer = token("writer", "w@x.com", "");
    let reader = token("reader", "r@x.com", "");
    let created = create_post(&state, &writer, "likeable").await;
    let id = created["_id"].as_str().unwrap();

    let uri = format!("/posts/{id}/like");
    let body =
      body_json(request(&state, "POST", &uri, Some(&reader), None).await).await;
    assert_eq!(body, json!({ "status": "liked", "like_count": 1 }));

    let body =
      body_json(request(&state, "POST", &uri, Some(&reader), None).await).await;
    assert_eq!(body, json!({ "status": "unliked", "like_count": 0 }));

    // Anonymous likes are rejected; the like endpoint mutates state.
    let resp = request(&state, "POST", &uri, None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn liked_listing_reflects_the_requester() {
    let state = make_state(false);
    let writer = token("writer", "w@x.com", "");
    let reader = token("reader", "r@x.com", "");
    let created = create_post(&state, &writer, "likeable").await;
    let id = created["_id"].as_str().unwrap();

    request(&state, "POST", &format!("/posts/{id}/like"), Some(&reader), None)
      .await;

    let liked =
      body_json(request(&state, "GET", "/posts/liked", Some(&reader), None).await)
        .await;
    assert_eq!(liked.as_array().unwrap().len(), 1);
    assert_eq!(liked[0]["_id"], *id);
    assert_eq!(liked[0]["is_liked"], true);

    let liked =
      body_json(request(&state, "GET", "/posts/liked", Some(&writer), None).await)
        .await;
    assert_eq!(liked, json!([]));
  }

  #[tokio::test]
  async fn view_endpoint_is_anonymous_and_monotonic() {
    let state = make_state(false);
    let writer = token("writer", "w@x.com", "");
    let created = create_post(&state, &writer, "viewed").await;
    let id = created["_id"].as_str().unwrap();

    let uri = format!("/posts/{id}/view");
    let body = body_json(request(&state, "GET", &uri, None, None).await).await;
    assert_eq!(body, json!({ "views": 1 }));
    let body = body_json(request(&state, "GET", &uri, None, None).await).await;
    assert_eq!(body, json!({ "views": 2 }));
  }

  #[tokio::test]
  async fn author_filter_matches_by_email() {
    let state = make_state(false);
    let a = token("uid-1", "alice@x.com", "");
    let b = token("uid-2", "bob@y.com", "");
    create_post(&state, &a, "by alice").await;
    create_post(&state, &b, "by bob").await;

    let posts = body_json(
      request(&state, "GET", "/posts?author=alice@x.com", None, None).await,
    )
    .await;
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["title"], "by alice");
  }

  // ── Profiles ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn first_profile_access_auto_creates() {
    let state = make_state(false);
    let auth = token("abc123", "a@x.com", "");

    let resp = request(&state, "GET", "/profiles/me", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CACHE_CONTROL).unwrap(),
      "private, max-age=60"
    );
    let profile = body_json(resp).await;
    assert_eq!(profile["username"], "abc123");
    assert_eq!(profile["email"], "a@x.com");
    // No display name in the token: seeded from the join key.
    assert_eq!(profile["display_name"], "abc123");
    assert_eq!(profile["blog_count"], 0);
    assert!(profile.get("auth_warning").is_none());

    // A second access returns the same profile, not a duplicate.
    let again =
      body_json(request(&state, "GET", "/profiles/me", Some(&auth), None).await)
        .await;
    assert_eq!(again["_id"], profile["_id"]);
  }

  #[tokio::test]
  async fn own_profile_updates_through_post_and_patch() {
    let state = make_state(false);
    let auth = token("abc123", "a@x.com", "Ada");

    let resp = request(
      &state,
      "POST",
      "/profiles/me",
      Some(&auth),
      Some(json!({ "bio": "writes things", "location": "London" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = body_json(resp).await;
    assert_eq!(profile["display_name"], "Ada");
    assert_eq!(profile["bio"], "writes things");

    let resp = request(
      &state,
      "PATCH",
      "/profiles/me",
      Some(&auth),
      Some(json!({ "profession": "engineer" })),
    )
    .await;
    let profile = body_json(resp).await;
    assert_eq!(profile["profession"], "engineer");
    assert_eq!(profile["bio"], "writes things");
  }

  #[tokio::test]
  async fn avatar_cleared_by_null_kept_when_absent() {
    let state = make_state(false);
    let auth = token("abc123", "a@x.com", "Ada");

    let profile = body_json(
      request(
        &state,
        "PATCH",
        "/profiles/me",
        Some(&auth),
        Some(json!({ "avatar_url": "http://x.test/a.png" })),
      )
      .await,
    )
    .await;
    assert_eq!(profile["avatar_url"], "http://x.test/a.png");

    // A body without the field leaves the avatar alone.
    let profile = body_json(
      request(
        &state,
        "PATCH",
        "/profiles/me",
        Some(&auth),
        Some(json!({ "bio": "writes things" })),
      )
      .await,
    )
    .await;
    assert_eq!(profile["avatar_url"], "http://x.test/a.png");

    // An explicit null clears it.
    let profile = body_json(
      request(
        &state,
        "PATCH",
        "/profiles/me",
        Some(&auth),
        Some(json!({ "avatar_url": null })),
      )
      .await,
    )
    .await;
    assert!(profile["avatar_url"].is_null());
  }

  #[tokio::test]
  async fn profile_views_owner_vs_public() {
    let state = make_state(false);
    let owner = token("owner-1", "o@x.com", "Olive");
    let other = token("other-1", "x@x.com", "");
    request(&state, "GET", "/profiles/me", Some(&owner), None).await;

    // Owner view by reference carries the email.
    let seen = body_json(
      request(&state, "GET", "/profiles/owner-1", Some(&owner), None).await,
    )
    .await;
    assert_eq!(seen["email"], "o@x.com");

    // Any other requester gets the public view.
    let seen = body_json(
      request(&state, "GET", "/profiles/owner-1", Some(&other), None).await,
    )
    .await;
    assert!(seen.get("email").is_none());
    assert_eq!(seen["display_name"], "Olive");

    // The public sub-path never carries the email, owner included.
    let seen = body_json(
      request(&state, "GET", "/profiles/owner-1/public", Some(&owner), None)
        .await,
    )
    .await;
    assert!(seen.get("email").is_none());
    assert_eq!(seen["member_since"], Utc::now().format("%B %Y").to_string());
  }

  #[tokio::test]
  async fn profile_reference_reconciliation_applies() {
    let state = make_state(false);
    let owner = token("Writer-One", "w@x.com", "");
    request(&state, "GET", "/profiles/me", Some(&owner), None).await;

    // Case-insensitive join-key fallback.
    let resp =
      request(&state, "GET", "/profiles/writer-one", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = request(&state, "GET", "/profiles/nobody", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn clock_skew_fallback_surfaces_a_warning() {
    let now = Utc::now().timestamp();
    let premature = json!({
      "sub": "skewed", "email": "s@x.com",
      "iat": now, "nbf": now + 600, "exp": now + 3600,
    });

    // Development mode accepts the token and marks the session.
    let state = make_state(true);
    let auth = token_for(premature.clone());
    let resp = request(&state, "GET", "/profiles/me", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = body_json(resp).await;
    assert!(profile.get("auth_warning").is_some());

    // Production rejects it outright.
    let state = make_state(false);
    let resp = request(&state, "GET", "/profiles/me", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Upload ──────────────────────────────────────────────────────────────

  fn multipart_body(
    boundary: &str,
    content_type: &str,
    filename: &str,
    data: &[u8],
  ) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
      format!(
        "--{boundary}\r\ncontent-disposition: form-data; \
         name=\"image\"; filename=\"{filename}\"\r\n\
         content-type: {content_type}\r\n\r\n"
      )
      .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
  }

  async fn upload(
    state: &AppState<MemoryStore>,
    auth: &str,
    content_type: &str,
    filename: &str,
    data: &[u8],
  ) -> axum::response::Response {
    let boundary = "byline-test-boundary";
    let req = Request::builder()
      .method("POST")
      .uri("/upload")
      .header(header::AUTHORIZATION, auth)
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={boundary}"),
      )
      .body(Body::from(multipart_body(boundary, content_type, filename, data)))
      .unwrap();
    router(state.clone()).oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn upload_persists_and_returns_a_reference() {
    let state = make_state(false);
    let auth = token("uploader", "u@x.com", "");

    let resp =
      upload(&state, &auth, "image/png", "photo.png", b"png bytes").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8000/media/blog_images/"));
    // The client-supplied filename is never echoed back.
    assert!(!url.contains("photo"));
    assert!(url.ends_with(".png"));

    let name = url.rsplit('/').next().unwrap();
    let stored = state.config.media_root.join("blog_images").join(name);
    assert_eq!(std::fs::read(stored).unwrap(), b"png bytes");
  }

  #[tokio::test]
  async fn oversize_upload_is_rejected_and_nothing_persists() {
    let state = make_state(false);
    let auth = token("uploader", "u@x.com", "");

    let six_mib = vec![0u8; 6 * 1024 * 1024];
    let resp =
      upload(&state, &auth, "image/png", "big.png", &six_mib).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!state.config.media_root.exists());
  }

  #[tokio::test]
  async fn unsupported_upload_type_is_rejected() {
    let state = make_state(false);
    let auth = token("uploader", "u@x.com", "");

    let resp = upload(&state, &auth, "application/pdf", "doc.pdf", b"x").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = upload(&state, &auth, "image/png", "x.png", b"x").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn upload_requires_authentication() {
    let state = make_state(false);
    let req = Request::builder()
      .method("POST")
      .uri("/upload")
      .header(header::CONTENT_TYPE, "multipart/form-data; boundary=b")
      .body(Body::from("--b--\r\n"))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Cache policy ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn mutating_responses_are_never_cached() {
    let state = make_state(false);
    let auth = token("writer", "w@x.com", "");
    let resp = request(
      &state,
      "POST",
      "/posts",
      Some(&auth),
      Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(
      resp.headers().get(header::CACHE_CONTROL).unwrap(),
      "no-store, no-cache, must-revalidate, max-age=0"
    );
  }

  #[tokio::test]
  async fn action_sub_paths_get_the_default_directive() {
    let state = make_state(false);
    let writer = token("writer", "w@x.com", "");
    let created = create_post(&state, &writer, "viewed").await;
    let id = created["_id"].as_str().unwrap();

    let resp =
      request(&state, "GET", &format!("/posts/{id}/view"), None, None).await;
    assert_eq!(
      resp.headers().get(header::CACHE_CONTROL).unwrap(),
      "public, max-age=600"
    );
  }
}
