//! Handlers for the catalog cache.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/catalog/{code}` | 404 when unknown or stale |
//! | `PUT`    | `/catalog` | Body: `{"entries":{"DTG":"130",...}}`; replaces everything |
//! | `DELETE` | `/catalog` | Clears the cache |

use std::collections::HashMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use folio_core::store::BookStore;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Resolved {
  pub code:        String,
  pub external_id: String,
}

/// `GET /catalog/{code}`
pub async fn resolve<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Path(code): Path<String>,
) -> Result<Json<Resolved>, ApiError> {
  let external_id = state
    .catalog
    .resolve(&code)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("catalog entry {code:?}")))?;
  Ok(Json(Resolved { code, external_id }))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceBody {
  pub entries: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct Replaced {
  pub entries: usize,
}

/// `PUT /catalog`
pub async fn replace<S: BookStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<ReplaceBody>,
) -> Json<Replaced> {
  let entries = state.catalog.replace(body.entries).await;
  Json(Replaced { entries })
}

/// `DELETE /catalog`
pub async fn invalidate<S: BookStore + 'static>(State(state): State<AppState<S>>) -> StatusCode {
  state.catalog.invalidate().await;
  StatusCode::NO_CONTENT
}
