//! Handlers for `/books` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/books` | All books, by title |
//! | `POST`   | `/books` | Initial import; body: `IncomingBook` + optional `language` |
//! | `GET`    | `/books/{id}` | 404 if not found |
//! | `DELETE` | `/books/{id}?confirm=<code>` | Cascading delete |
//! | `GET`    | `/books/{id}/chapters` | Ordered by number |
//! | `POST`   | `/books/{id}/recheck` | Body: `{"chapters":[...]}` |
//! | `POST`   | `/test-seed` | Body: `{"original":{...},"modified":[...]}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  book::{Book, Chapter},
  incoming::{IncomingBook, IncomingChapter},
  store::BookStore,
};
use folio_engine::tracker::ComparisonResult;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /books`
pub async fn list<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Book>>, ApiError> {
  Ok(Json(state.tracker.list_books().await?))
}

// ─── Import ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(flatten)]
  pub book:     IncomingBook,
  pub language: Option<String>,
}

/// `POST /books`
pub async fn create<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let outcome = state.tracker.import_book(body.book, body.language).await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /books/{id}`
pub async fn get_one<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Book>, ApiError> {
  Ok(Json(state.tracker.get_book(id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  #[serde(default)]
  pub confirm: String,
}

/// `DELETE /books/{id}?confirm=<code>`
pub async fn delete_one<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<Book>, ApiError> {
  Ok(Json(state.tracker.delete_book(id, &params.confirm).await?))
}

// ─── Chapters ─────────────────────────────────────────────────────────────────

/// `GET /books/{id}/chapters`
pub async fn chapters<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Chapter>>, ApiError> {
  Ok(Json(state.tracker.list_chapters(id).await?))
}

// ─── Recheck ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecheckBody {
  pub chapters: Vec<IncomingChapter>,
}

/// `POST /books/{id}/recheck`
pub async fn recheck<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RecheckBody>,
) -> Result<Json<ComparisonResult>, ApiError> {
  Ok(Json(state.tracker.recheck(id, &body.chapters).await?))
}

// ─── Test seed ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TestSeedBody {
  pub original: IncomingBook,
  pub modified: Vec<IncomingChapter>,
}

/// `POST /test-seed`
pub async fn test_seed<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<TestSeedBody>,
) -> Result<impl IntoResponse, ApiError> {
  let outcome = state.tracker.import_test_seed(body.original, &body.modified).await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}
