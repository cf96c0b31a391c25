//! Aggregate counter maintenance.
//!
//! Counters only ever grow. Each chapter that changed during a run gains
//! exactly its own count; the book gains the run total and has its
//! `last_check_date` moved even when nothing changed.

use chrono::{DateTime, Utc};
use folio_core::store::BookStore;
use uuid::Uuid;

use crate::align::AlignmentReport;

/// Counter writes that did not go through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterOutcome {
  pub chapters_updated: usize,
  pub failures:         usize,
}

/// Fold `report` into the stored counters of `book_id`.
///
/// Each increment is a single atomic statement at the store. A failed write
/// is logged and counted; the remaining writes still run.
pub async fn apply<S: BookStore>(
  store: &S,
  book_id: Uuid,
  report: &AlignmentReport,
  at: DateTime<Utc>,
) -> CounterOutcome {
  let mut outcome = CounterOutcome::default();

  for chapter in report.chapters.iter().filter(|c| c.changes > 0) {
    match store.add_chapter_changes(chapter.chapter_id, chapter.changes, at).await {
      Ok(()) => outcome.chapters_updated += 1,
      Err(e) => {
        tracing::error!(%book_id, chapter = chapter.number, error = %e, "failed to update chapter counter");
        outcome.failures += 1;
      }
    }
  }

  if let Err(e) = store.record_book_check(book_id, report.total_changes(), at).await {
    tracing::error!(%book_id, error = %e, "failed to update book counter");
    outcome.failures += 1;
  }

  outcome
}
