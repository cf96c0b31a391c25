//! JSON REST API for Folio.
//!
//! Exposes an axum [`Router`] backed by a [`Tracker`] over any
//! [`folio_core::store::BookStore`]. Transport concerns (TLS, timeouts,
//! request tracing) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", folio_api::api_router(state))
//! ```

pub mod books;
pub mod catalog;
pub mod comparisons;
pub mod error;
pub mod paragraphs;
pub mod versions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use folio_core::store::BookStore;
use folio_engine::{Tracker, catalog::CatalogCache};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub tracker: Tracker<S>,
  pub catalog: Arc<CatalogCache>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { tracker: self.tracker.clone(), catalog: Arc::clone(&self.catalog) }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: BookStore + 'static,
{
  Router::new()
    // Books
    .route("/books", get(books::list::<S>).post(books::create::<S>))
    .route("/books/{id}", get(books::get_one::<S>).delete(books::delete_one::<S>))
    .route("/books/{id}/chapters", get(books::chapters::<S>))
    .route("/books/{id}/recheck", post(books::recheck::<S>))
    .route("/test-seed", post(books::test_seed::<S>))
    // Versions & manual import
    .route("/books/{id}/versions", get(versions::list::<S>))
    .route("/books/{id}/versions/{version_id}/snapshots", get(versions::snapshots::<S>))
    .route("/books/{id}/baseline", post(versions::set_baseline::<S>))
    .route("/books/{id}/manual-import", post(versions::manual_import::<S>))
    .route("/books/{id}/matches", post(versions::matches::<S>))
    // Ledger
    .route("/books/{id}/comparisons", get(comparisons::list::<S>))
    .route("/comparisons/{id}/notes", patch(comparisons::amend_notes::<S>))
    // Paragraphs & diffs
    .route("/chapters/{id}/paragraphs", get(paragraphs::list::<S>))
    .route("/paragraphs/{id}/diff", get(paragraphs::diff_one::<S>))
    .route("/diff", post(paragraphs::diff_texts))
    // Catalog cache
    .route("/catalog", put(catalog::replace::<S>).delete(catalog::invalidate::<S>))
    .route("/catalog/{code}", get(catalog::resolve::<S>))
    .with_state(state)
}
