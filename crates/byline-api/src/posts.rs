//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path                    | Auth      |
//! |----------|-------------------------|-----------|
//! | `GET`    | `/posts[?author=…]`     | optional  |
//! | `POST`   | `/posts`                | required  |
//! | `GET`    | `/posts/liked`          | required  |
//! | `GET`    | `/posts/{ref}`          | optional  |
//! | `PUT`    | `/posts/{ref}`          | owner     |
//! | `PATCH`  | `/posts/{ref}`          | owner     |
//! | `DELETE` | `/posts/{ref}`          | owner     |
//! | `POST`   | `/posts/{ref}/like`     | required  |
//! | `GET`    | `/posts/{ref}/view`     | optional  |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use byline_core::{
  authz::{Operation, authorize},
  post::{NewPost, Post, PostPatch},
  reconcile,
  store::{BlogStore, PostQuery},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::{Identity, MaybeIdentity},
  error::ApiError,
  repr::PostRepr,
};

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

/// Resolve a post reference or 404. All reconciliation strategies must be
/// exhausted before the reference is an error.
async fn resolve<S: BlogStore>(
  state: &AppState<S>,
  reference: &str,
) -> Result<Post, ApiError> {
  reconcile::resolve_post(state.store.as_ref(), reference)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("post {reference} not found")))
}

/// Resolve a post and gate a write on it. Denial is distinct from
/// not-found: the post exists, the actor lacks rights.
async fn resolve_for_write<S: BlogStore>(
  state: &AppState<S>,
  reference: &str,
  actor: &Identity,
) -> Result<Post, ApiError> {
  let post = resolve(state, reference).await?;
  if !authorize(&actor.user, &post.author, Operation::Write) {
    return Err(ApiError::Forbidden);
  }
  Ok(post)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub author: Option<String>,
}

/// `GET /posts[?author=<filter>]`
pub async fn list<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  MaybeIdentity(identity): MaybeIdentity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PostRepr>>, ApiError> {
  let query = PostQuery { author: params.author };
  let posts = state.store.list_posts(&query).await.map_err(store_err)?;
  let viewer = identity.as_ref().map(|i| i.user.username.as_str());
  Ok(Json(posts.iter().map(|p| PostRepr::new(p, viewer)).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// The owner is always the authenticated actor; there is no author field a
/// client could supply.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:     String,
  pub content:   String,
  pub image_url: Option<String>,
}

/// `POST /posts`
pub async fn create<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.title.trim().is_empty() {
    return Err(ApiError::Validation("title is required".into()));
  }
  if body.content.trim().is_empty() {
    return Err(ApiError::Validation("content is required".into()));
  }

  let post = state
    .store
    .insert_post(&identity.user, NewPost {
      title:     body.title,
      content:   body.content,
      image_url: body.image_url,
    })
    .await
    .map_err(store_err)?;
  let repr = PostRepr::new(&post, Some(&identity.user.username));
  Ok((StatusCode::CREATED, Json(repr)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /posts/{ref}`
pub async fn get_one<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  MaybeIdentity(identity): MaybeIdentity,
  Path(reference): Path<String>,
) -> Result<Json<PostRepr>, ApiError> {
  let post = resolve(&state, &reference).await?;
  let viewer = identity.as_ref().map(|i| i.user.username.as_str());
  Ok(Json(PostRepr::new(&post, viewer)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReplaceBody {
  pub title:     String,
  pub content:   String,
  pub image_url: Option<String>,
}

/// `PUT /posts/{ref}` — full replacement; an absent image clears it.
pub async fn replace<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(reference): Path<String>,
  Json(body): Json<ReplaceBody>,
) -> Result<Json<PostRepr>, ApiError> {
  if body.title.trim().is_empty() {
    return Err(ApiError::Validation("title is required".into()));
  }
  if body.content.trim().is_empty() {
    return Err(ApiError::Validation("content is required".into()));
  }

  let post = resolve_for_write(&state, &reference, &identity).await?;
  let patch = PostPatch {
    title:     Some(body.title),
    content:   Some(body.content),
    image_url: Some(body.image_url),
  };
  apply_patch(&state, &post, patch, &identity).await
}

#[derive(Debug, Deserialize)]
pub struct PatchBody {
  pub title:     Option<String>,
  pub content:   Option<String>,
  pub image_url: Option<String>,
}

/// `PATCH /posts/{ref}` — partial update; absent fields stay untouched.
pub async fn patch<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(reference): Path<String>,
  Json(body): Json<PatchBody>,
) -> Result<Json<PostRepr>, ApiError> {
  let post = resolve_for_write(&state, &reference, &identity).await?;
  let patch = PostPatch {
    title:     body.title,
    content:   body.content,
    image_url: body.image_url.map(Some),
  };
  apply_patch(&state, &post, patch, &identity).await
}

async fn apply_patch<S: BlogStore>(
  state: &AppState<S>,
  post: &Post,
  patch: PostPatch,
  identity: &Identity,
) -> Result<Json<PostRepr>, ApiError> {
  let updated = state
    .store
    .update_post(post.id, patch)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("post {} not found", post.id)))?;
  Ok(Json(PostRepr::new(&updated, Some(&identity.user.username))))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /posts/{ref}` — 204 on success.
pub async fn delete<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(reference): Path<String>,
) -> Result<StatusCode, ApiError> {
  let post = resolve_for_write(&state, &reference, &identity).await?;
  state.store.delete_post(post.id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Actions ──────────────────────────────────────────────────────────────────

/// `POST /posts/{ref}/like` — flip like-set membership for the requester.
pub async fn like<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
  use byline_core::post::LikeOutcome;

  let post = resolve(&state, &reference).await?;
  let outcome = state
    .store
    .toggle_like(post.id, &identity.user.username)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("post {reference} not found")))?;

  let status = match outcome {
    LikeOutcome::Liked { .. } => "liked",
    LikeOutcome::Unliked { .. } => "unliked",
  };
  Ok(Json(json!({ "status": status, "like_count": outcome.count() })))
}

/// `GET /posts/{ref}/view` — anonymous-accessible view tracking.
pub async fn view<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
  let post = resolve(&state, &reference).await?;
  let views = state
    .store
    .increment_views(post.id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("post {reference} not found")))?;
  Ok(Json(json!({ "views": views })))
}

/// `GET /posts/liked` — posts the requester has liked, newest first.
pub async fn liked<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Json<Vec<PostRepr>>, ApiError> {
  let posts = state
    .store
    .posts_liked_by(&identity.user.username)
    .await
    .map_err(store_err)?;
  let viewer = Some(identity.user.username.as_str());
  Ok(Json(posts.iter().map(|p| PostRepr::new(p, viewer)).collect()))
}
