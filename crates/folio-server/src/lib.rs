//! HTTP host for Folio.
//!
//! Wires a [`SqliteStore`]-backed [`Tracker`] into the JSON API and adds the
//! transport layers the API crate leaves out: request tracing and a
//! per-request timeout.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use folio_api::AppState;
use folio_core::store::BookStore;
use folio_engine::{Tracker, TrackerConfig, catalog::CatalogCache};
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use folio_store_sqlite::SqliteStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `folio.toml` and
/// `FOLIO_*` environment variables. Every key is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Lifetime of the book-code catalog before lookups report a miss.
  pub catalog_ttl_secs:      u64,
  pub record_empty_versions: bool,
  pub request_timeout_secs:  u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      store_path:            PathBuf::from("~/.local/share/folio/folio.db"),
      catalog_ttl_secs:      24 * 60 * 60,
      record_empty_versions: false,
      request_timeout_secs:  30,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn catalog_ttl(&self) -> Duration { Duration::from_secs(self.catalog_ttl_secs) }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn tracker_config(&self) -> TrackerConfig {
    TrackerConfig { record_empty_versions: self.record_empty_versions }
  }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the shared handler state over `store`.
pub fn state<S: BookStore>(store: S, config: &ServerConfig) -> AppState<S> {
  AppState {
    tracker: Tracker::new(Arc::new(store), config.tracker_config()),
    catalog: Arc::new(CatalogCache::new(config.catalog_ttl())),
  }
}

/// The full application: the API under `/api`, a liveness probe at
/// `/health`, request tracing and a timeout around everything.
pub fn app<S>(state: AppState<S>, config: &ServerConfig) -> Router
where
  S: BookStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", folio_api::api_router(state))
    .layer(TimeoutLayer::new(config.request_timeout()))
    .layer(TraceLayer::new_for_http())
}
