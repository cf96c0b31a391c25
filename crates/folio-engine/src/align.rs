//! Structural alignment of an incoming book against the stored one.
//!
//! Chapters are joined on their number and paragraphs on their reference
//! code, nothing else. Positions are never used to match: a paragraph that
//! moved keeps its identity, and a stored paragraph whose code disappeared
//! from the incoming chapter is left exactly as it was.
//!
//! Alignment is best-effort. Unmatched structure is skipped with a warning,
//! and a storage failure on one chapter or paragraph is logged and counted
//! without aborting the run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use folio_core::{
  book::{NewParagraph, Paragraph},
  incoming::IncomingChapter,
  reconcile::reconcile,
  store::BookStore,
  version::NewSnapshot,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Report ──────────────────────────────────────────────────────────────────

/// What happened to one matched chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterOutcome {
  pub chapter_id: Uuid,
  pub number:     u32,
  /// Paragraph modifications detected in this chapter during this run.
  pub changes:    u64,
  /// Paragraphs created because their code was not stored yet.
  pub inserted:   usize,
  /// Codes of stored paragraphs absent from the incoming chapter.
  pub orphaned:   Vec<String>,
}

/// The outcome of one alignment pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlignmentReport {
  /// Matched chapters, in incoming order.
  pub chapters:           Vec<ChapterOutcome>,
  /// Final text of every paragraph changed during the run.
  pub changed:            Vec<NewSnapshot>,
  pub skipped_chapters:   usize,
  pub skipped_paragraphs: usize,
  /// Store operations that failed and were skipped.
  pub failures:           usize,
}

impl AlignmentReport {
  pub fn total_changes(&self) -> u64 { self.chapters.iter().map(|c| c.changes).sum() }

  pub fn changed_paragraph_count(&self) -> usize { self.changed.len() }

  pub fn inserted(&self) -> usize { self.chapters.iter().map(|c| c.inserted).sum() }

  pub fn orphaned(&self) -> usize { self.chapters.iter().map(|c| c.orphaned.len()).sum() }

  /// `true` if some store operation failed and the run was not applied in
  /// full.
  pub fn is_partial(&self) -> bool { self.failures > 0 }

  fn record_change(&mut self, paragraph_id: Uuid, text: &str) {
    match self.changed.iter_mut().find(|s| s.paragraph_id == paragraph_id) {
      Some(snapshot) => snapshot.text = text.to_owned(),
      None => self.changed.push(NewSnapshot { paragraph_id, text: text.to_owned() }),
    }
  }
}

// ─── Alignment ───────────────────────────────────────────────────────────────

/// Align `incoming` against the stored chapters of `book_id`, applying every
/// detected change and inserting newly seen paragraphs.
///
/// Only a failure to read the book's chapter list is fatal.
pub async fn align<S: BookStore>(
  store: &S,
  book_id: Uuid,
  incoming: &[IncomingChapter],
  at: DateTime<Utc>,
) -> Result<AlignmentReport> {
  let stored_chapters = store.list_chapters(book_id).await.map_err(Error::store)?;
  let by_number: HashMap<u32, Uuid> =
    stored_chapters.iter().map(|c| (c.number, c.chapter_id)).collect();

  let mut report = AlignmentReport::default();

  for chapter in incoming {
    let Some(&chapter_id) = by_number.get(&chapter.number) else {
      tracing::warn!(%book_id, chapter = chapter.number, "no stored chapter with this number; skipping");
      report.skipped_chapters += 1;
      continue;
    };

    let stored = match store.list_paragraphs(chapter_id).await {
      Ok(paragraphs) => paragraphs,
      Err(e) => {
        tracing::error!(%book_id, chapter = chapter.number, error = %e, "failed to load paragraphs; skipping chapter");
        report.failures += 1;
        continue;
      }
    };

    let outcome = align_chapter(store, chapter_id, chapter, stored, at, &mut report).await;
    report.chapters.push(outcome);
  }

  tracing::info!(
    %book_id,
    changes = report.total_changes(),
    inserted = report.inserted(),
    orphaned = report.orphaned(),
    skipped_chapters = report.skipped_chapters,
    skipped_paragraphs = report.skipped_paragraphs,
    failures = report.failures,
    "alignment finished"
  );

  Ok(report)
}

async fn align_chapter<S: BookStore>(
  store: &S,
  chapter_id: Uuid,
  chapter: &IncomingChapter,
  stored: Vec<Paragraph>,
  at: DateTime<Utc>,
  report: &mut AlignmentReport,
) -> ChapterOutcome {
  let mut outcome = ChapterOutcome {
    chapter_id,
    number: chapter.number,
    changes: 0,
    inserted: 0,
    orphaned: Vec::new(),
  };

  // Stored paragraphs without a code can never be matched.
  let mut by_code: HashMap<String, Paragraph> = stored
    .into_iter()
    .filter_map(|p| p.refcode.clone().map(|code| (code, p)))
    .collect();
  let mut seen: Vec<String> = Vec::new();

  for (position, paragraph) in chapter.paragraphs.iter().enumerate() {
    let Some(code) = paragraph.refcode() else {
      tracing::warn!(chapter = chapter.number, position = position + 1, "paragraph without reference code; skipping");
      report.skipped_paragraphs += 1;
      continue;
    };
    seen.push(code.to_owned());

    match by_code.get_mut(code) {
      Some(existing) => {
        let Some(entry) = reconcile(existing, &paragraph.content, at).entry else {
          continue;
        };
        match store.apply_change(existing.paragraph_id, entry.clone()).await {
          Ok(true) => {
            tracing::debug!(refcode = code, "paragraph changed");
            existing.latest_text = entry.new_text.clone();
            existing.has_changed = true;
            existing.change_history.push(entry);
            outcome.changes += 1;
            report.record_change(existing.paragraph_id, &paragraph.content);
          }
          Ok(false) => {
            tracing::error!(refcode = code, "paragraph vanished during alignment");
            report.failures += 1;
          }
          Err(e) => {
            tracing::error!(refcode = code, error = %e, "failed to record paragraph change");
            report.failures += 1;
          }
        }
      }
      None => {
        let input = NewParagraph {
          chapter_id,
          paragraph_number: (position + 1) as u32,
          refcode: Some(code.to_owned()),
          text: paragraph.content.clone(),
        };
        match store.insert_paragraph(input).await {
          Ok(created) => {
            tracing::debug!(refcode = code, "new paragraph inserted");
            outcome.inserted += 1;
            by_code.insert(code.to_owned(), created);
          }
          Err(e) => {
            tracing::error!(refcode = code, error = %e, "failed to insert paragraph");
            report.failures += 1;
          }
        }
      }
    }
  }

  let mut orphaned: Vec<(u32, String)> = by_code
    .into_iter()
    .filter(|(code, _)| !seen.contains(code))
    .map(|(code, p)| (p.paragraph_number, code))
    .collect();
  orphaned.sort();
  for (_, code) in &orphaned {
    tracing::debug!(refcode = %code, "stored paragraph absent from incoming chapter; left untouched");
  }
  outcome.orphaned = orphaned.into_iter().map(|(_, code)| code).collect();

  outcome
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn repeated_change_keeps_one_snapshot() {
    let mut report = AlignmentReport::default();
    let id = Uuid::new_v4();
    report.record_change(id, "primera");
    report.record_change(id, "segunda");
    assert_eq!(report.changed_paragraph_count(), 1);
    assert_eq!(report.changed[0].text, "segunda");
  }

  #[test]
  fn totals_sum_over_chapters() {
    let report = AlignmentReport {
      chapters: vec![
        ChapterOutcome {
          chapter_id: Uuid::new_v4(),
          number:     1,
          changes:    2,
          inserted:   1,
          orphaned:   vec!["DTG 1.9".into()],
        },
        ChapterOutcome {
          chapter_id: Uuid::new_v4(),
          number:     2,
          changes:    3,
          inserted:   0,
          orphaned:   vec![],
        },
      ],
      ..AlignmentReport::default()
    };
    assert_eq!(report.total_changes(), 5);
    assert_eq!(report.inserted(), 1);
    assert_eq!(report.orphaned(), 1);
    assert!(!report.is_partial());
  }
}
