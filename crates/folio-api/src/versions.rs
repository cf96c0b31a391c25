//! Handlers for book versions, baselines and manual historical imports.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/books/{id}/versions` | Ordered by version number |
//! | `GET`  | `/books/{id}/versions/{version_id}/snapshots` | Texts captured by one version |
//! | `POST` | `/books/{id}/baseline` | Body: `{"version_id":"..."}` |
//! | `POST` | `/books/{id}/manual-import` | Body: `ManualImport`; 422 with the error list on validation failure |
//! | `POST` | `/books/{id}/matches` | Body: `{"content":"..."}`; code suggestions per uploaded paragraph |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  manual::ManualImport,
  store::BookStore,
  version::{BookVersion, VersionSnapshot},
};
use folio_engine::tracker::{BaselineOutcome, MatchReport};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /books/{id}/versions`
pub async fn list<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookVersion>>, ApiError> {
  Ok(Json(state.tracker.list_versions(id).await?))
}

/// `GET /books/{id}/versions/{version_id}/snapshots`
pub async fn snapshots<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path((id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<VersionSnapshot>>, ApiError> {
  Ok(Json(state.tracker.list_snapshots(id, version_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct BaselineBody {
  pub version_id: Uuid,
}

/// `POST /books/{id}/baseline`
pub async fn set_baseline<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<BaselineBody>,
) -> Result<Json<BaselineOutcome>, ApiError> {
  Ok(Json(state.tracker.set_baseline(id, body.version_id).await?))
}

/// `POST /books/{id}/manual-import`
pub async fn manual_import<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ManualImport>,
) -> Result<impl IntoResponse, ApiError> {
  let outcome = state.tracker.import_manual_version(id, body).await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct MatchesBody {
  pub content: String,
}

/// `POST /books/{id}/matches`
pub async fn matches<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<MatchesBody>,
) -> Result<Json<MatchReport>, ApiError> {
  Ok(Json(state.tracker.suggest_matches(id, &body.content).await?))
}
