//! Handlers for the comparison ledger.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/books/{id}/comparisons` | Oldest first |
//! | `PATCH` | `/comparisons/{id}/notes` | Body: `{"notes":"..."}` or `{"notes":null}` |

use axum::{
  Json,
  extract::{Path, State},
};
use folio_core::{ledger::ComparisonRecord, store::BookStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /books/{id}/comparisons`
pub async fn list<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ComparisonRecord>>, ApiError> {
  Ok(Json(state.tracker.list_comparisons(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NotesBody {
  pub notes: Option<String>,
}

/// `PATCH /comparisons/{id}/notes`. Numeric fields are never touched.
pub async fn amend_notes<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NotesBody>,
) -> Result<Json<ComparisonRecord>, ApiError> {
  Ok(Json(state.tracker.amend_comparison_notes(id, body.notes).await?))
}
