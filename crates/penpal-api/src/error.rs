//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<penpal_core::Error> for ApiError {
  fn from(e: penpal_core::Error) -> Self {
    use penpal_core::Error as E;
    match e {
      E::UserNotFound(_) | E::LetterNotFound(_) => Self::NotFound(e.to_string()),
      E::Store(inner) => Self::Store(inner),
      e if e.is_invalid_input() => Self::BadRequest(e.to_string()),
      // NotParticipant / NotRecipient
      e => Self::Forbidden(e.to_string()),
    }
  }
}

// Malformed bodies, query strings and path segments all map to 400.

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      // Already logged where it happened; callers only learn that it failed.
      ApiError::Store(_) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "operation did not complete".to_owned(),
      ),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
