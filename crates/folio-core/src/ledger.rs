//! Comparison ledger entries: the permanent audit trail.
//!
//! Records are append-only. The numeric fields are snapshots of one run,
//! not accumulators. Only the free-text notes may be amended afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonType {
  InitialImport,
  PeriodicRecheck,
  BaselineChange,
  ManualHistorical,
  TestImport,
}

/// Per-chapter change count within one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterBreakdown {
  pub chapter_id:     Uuid,
  pub chapter_number: u32,
  pub change_count:   u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRecord {
  pub comparison_id:           Uuid,
  pub book_id:                 Uuid,
  pub comparison_date:         DateTime<Utc>,
  pub comparison_type:         ComparisonType,
  pub total_changes:           u64,
  pub changed_paragraph_count: u64,
  /// Only chapters with at least one change, in chapter order.
  pub chapters_affected:       Vec<ChapterBreakdown>,
  pub notes:                   Option<String>,
}

/// Input to [`crate::store::BookStore::append_comparison`].
/// `comparison_id` and `comparison_date` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewComparison {
  pub book_id:                 Uuid,
  pub comparison_type:         ComparisonType,
  pub total_changes:           u64,
  pub changed_paragraph_count: u64,
  pub chapters_affected:       Vec<ChapterBreakdown>,
  pub notes:                   Option<String>,
}

impl NewComparison {
  /// A zero-count marker entry (imports, baseline changes).
  pub fn marker(
    book_id: Uuid,
    comparison_type: ComparisonType,
    notes: Option<String>,
  ) -> Self {
    Self {
      book_id,
      comparison_type,
      total_changes: 0,
      changed_paragraph_count: 0,
      chapters_affected: Vec::new(),
      notes,
    }
  }
}
