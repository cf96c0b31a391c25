//! Handlers for paragraphs and word diffs.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/chapters/{id}/paragraphs` | Ordered by paragraph number |
//! | `GET`  | `/paragraphs/{id}/diff` | Base text → latest text |
//! | `POST` | `/diff` | Body: `{"old":"...","new":"..."}` |

use axum::{
  Json,
  extract::{Path, State},
};
use folio_core::{
  book::Paragraph,
  diff::{DiffSegment, DiffStats, diff_words},
  store::BookStore,
};
use folio_engine::tracker::ParagraphDiff;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /chapters/{id}/paragraphs`
pub async fn list<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Paragraph>>, ApiError> {
  Ok(Json(state.tracker.list_paragraphs(id).await?))
}

/// `GET /paragraphs/{id}/diff`
pub async fn diff_one<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ParagraphDiff>, ApiError> {
  Ok(Json(state.tracker.paragraph_diff(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct DiffBody {
  pub old: String,
  pub new: String,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
  pub segments: Vec<DiffSegment>,
  pub stats:    DiffStats,
}

/// `POST /diff`
pub async fn diff_texts(Json(body): Json<DiffBody>) -> Json<DiffResponse> {
  let segments = diff_words(&body.old, &body.new);
  let stats = DiffStats::from_segments(&segments);
  Json(DiffResponse { segments, stats })
}
