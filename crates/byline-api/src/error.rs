//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Every variant maps to an
/// `{"error": message}` body with the listed status.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The operation requires an identity and none was attempted.
  #[error("authentication required")]
  Unauthenticated,

  /// A bearer token was present but did not verify.
  #[error("invalid token: {0}")]
  InvalidCredential(String),

  /// Authenticated but not the resource owner. The message stays generic
  /// so denial never confirms what exists.
  #[error("you do not have permission to perform this action")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  Validation(String),

  /// The identity provider could not be reached.
  #[error("upstream failure: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("upload failed: {0}")]
  Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthenticated | ApiError::InvalidCredential(_) => {
        StatusCode::UNAUTHORIZED
      }
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Upstream(_) | ApiError::Store(_) | ApiError::Io(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
