//! Book versions and the per-paragraph snapshots captured with them.
//!
//! Versions form an append-only, per-book numbered sequence. At most one
//! version per book is the baseline that future comparisons start from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the content of a version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
  InitialImport,
  PeriodicRecheck,
  ManualHistorical,
  TestSeed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookVersion {
  pub version_id:     Uuid,
  pub book_id:        Uuid,
  /// 1, 2, 3, … scoped to the book.
  pub version_number: u32,
  pub source_type:    SourceType,
  pub is_baseline:    bool,
  /// Publication date of the edition this version reproduces, if known.
  pub edition_date:   Option<NaiveDate>,
  pub notes:          Option<String>,
  pub imported_at:    DateTime<Utc>,
}

/// A paragraph's text as captured by one version. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSnapshot {
  pub snapshot_id:  Uuid,
  pub version_id:   Uuid,
  pub paragraph_id: Uuid,
  pub text:         String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSnapshot {
  pub paragraph_id: Uuid,
  pub text:         String,
}

/// Input to [`crate::store::BookStore::create_version`].
///
/// The store assigns `version_number`. When `is_baseline` is set the store
/// also demotes the previous baseline and copies every snapshot into the
/// paragraph's `base_text`, all in one transaction.
#[derive(Debug, Clone)]
pub struct NewVersion {
  pub book_id:      Uuid,
  pub source_type:  SourceType,
  pub is_baseline:  bool,
  pub edition_date: Option<NaiveDate>,
  pub notes:        Option<String>,
  pub snapshots:    Vec<NewSnapshot>,
}

impl NewVersion {
  /// Convenience constructor with no edition date or notes.
  pub fn new(
    book_id: Uuid,
    source_type: SourceType,
    is_baseline: bool,
    snapshots: Vec<NewSnapshot>,
  ) -> Self {
    Self {
      book_id,
      source_type,
      is_baseline,
      edition_date: None,
      notes: None,
      snapshots,
    }
  }
}

/// Outcome of a baseline switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineChange {
  pub previous:           Option<BookVersion>,
  pub current:            BookVersion,
  /// Paragraphs whose `base_text` was overwritten from the new baseline.
  pub paragraphs_updated: usize,
  /// Paragraphs of the book with no snapshot in the new baseline; their
  /// `base_text` is left as it was.
  pub paragraphs_uncovered: usize,
}
