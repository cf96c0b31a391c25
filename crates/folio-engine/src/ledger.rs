//! Construction of comparison ledger entries from alignment reports.

use folio_core::ledger::{ChapterBreakdown, ComparisonType, NewComparison};
use uuid::Uuid;

use crate::align::AlignmentReport;

/// Chapters that changed during the run, in chapter-number order.
pub fn breakdown(report: &AlignmentReport) -> Vec<ChapterBreakdown> {
  let mut chapters: Vec<ChapterBreakdown> = report
    .chapters
    .iter()
    .filter(|c| c.changes > 0)
    .map(|c| ChapterBreakdown {
      chapter_id:     c.chapter_id,
      chapter_number: c.number,
      change_count:   c.changes,
    })
    .collect();
  chapters.sort_by_key(|c| c.chapter_number);
  chapters
}

/// The ledger entry describing one comparison run.
pub fn entry(
  book_id: Uuid,
  comparison_type: ComparisonType,
  report: &AlignmentReport,
  notes: Option<String>,
) -> NewComparison {
  NewComparison {
    book_id,
    comparison_type,
    total_changes: report.total_changes(),
    changed_paragraph_count: report.changed_paragraph_count() as u64,
    chapters_affected: breakdown(report),
    notes,
  }
}

/// Free-text note recorded alongside a baseline switch.
pub fn baseline_note(previous: Option<u32>, current: u32) -> String {
  match previous {
    Some(prev) => format!("baseline changed from version {prev} to version {current}"),
    None => format!("baseline set to version {current}"),
  }
}
