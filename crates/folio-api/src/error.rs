//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use folio_core::manual::AssignmentError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("{} code assignment error(s)", .0.len())]
  Validation(Vec<AssignmentError>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<folio_engine::Error> for ApiError {
  fn from(err: folio_engine::Error) -> Self {
    use folio_engine::Error as E;

    match err {
      E::BookNotFound(_)
      | E::ChapterNotFound(_)
      | E::ParagraphNotFound(_)
      | E::VersionNotFound(_)
      | E::ComparisonNotFound(_) => ApiError::NotFound(err.to_string()),
      E::DuplicateBookCode(_) | E::ComparisonInProgress(_) => ApiError::Conflict(err.to_string()),
      E::EmptyBook | E::ConfirmationMismatch { .. } => ApiError::BadRequest(err.to_string()),
      E::Validation(errors) => ApiError::Validation(errors),
      E::Core(e) => ApiError::Store(Box::new(e)),
      E::Task(e) => ApiError::Store(Box::new(e)),
      E::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, Json(json!({ "error": m }))),
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message, "errors": errors })),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message })))
      }
    }
    .into_response()
  }
}
