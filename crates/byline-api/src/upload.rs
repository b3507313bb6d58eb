//! Image upload handler.
//!
//! Accepts a multipart `image` field, validates declared type and size, and
//! persists under `<media_root>/blog_images/` with a generated name. The
//! client-supplied filename is never echoed back; only its extension
//! survives, parsed off the path.

use std::path::Path;

use axum::{
  Json,
  extract::{Multipart, State},
  http::StatusCode,
  response::IntoResponse,
};
use byline_core::store::BlogStore;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raised above the image cap so oversize uploads reach the size check
/// here instead of being cut off by the framework's body limit.
pub const BODY_LIMIT: usize = 8 * 1024 * 1024;

const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// `POST /upload` — multipart field `image`; responds `201 {"url": …}`.
pub async fn handler<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  _identity: Identity,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::Validation(e.to_string()))?
  {
    if field.name() != Some("image") {
      continue;
    }

    let declared_type = field.content_type().unwrap_or_default().to_string();
    if !ALLOWED_TYPES.contains(&declared_type.as_str()) {
      return Err(ApiError::Validation(
        "file type not supported, upload JPEG, PNG or GIF".into(),
      ));
    }

    let original_name = field.file_name().unwrap_or_default().to_string();
    let data = field
      .bytes()
      .await
      .map_err(|e| ApiError::Validation(e.to_string()))?;
    if data.len() > MAX_IMAGE_BYTES {
      return Err(ApiError::Validation(
        "file too large, maximum size is 5MB".into(),
      ));
    }

    let extension = Path::new(&original_name)
      .extension()
      .map(|e| format!(".{}", e.to_string_lossy()))
      .unwrap_or_default();
    let name = format!("{}{extension}", Uuid::new_v4());

    let dir = state.config.media_root.join("blog_images");
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&name), &data).await?;

    tracing::debug!(%name, bytes = data.len(), "stored upload");
    let base = state.config.base_url.trim_end_matches('/');
    let url = format!("{base}/media/blog_images/{name}");
    return Ok((StatusCode::CREATED, Json(json!({ "url": url }))));
  }

  Err(ApiError::Validation("no image file provided".into()))
}
