//! The [`Tracker`] service: every mutating workflow over a [`BookStore`].
//!
//! Runs that modify an existing book hold that book's [`BookGuard`] for
//! their whole duration, so a recheck can never interleave with a baseline
//! switch, a manual import or a deletion of the same book.
//!
//! [`BookGuard`]: crate::locks::BookGuard

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use chrono::Utc;
use folio_core::{
  book::{Book, Chapter, NewBook, NewChapter, NewParagraph, Paragraph},
  diff::{DiffSegment, DiffStats, diff_words},
  incoming::{IncomingBook, IncomingChapter},
  ledger::{ComparisonRecord, ComparisonType, NewComparison},
  manual::{
    CodeCandidate, ManualImport, ManualVersionKind, ParagraphMatch, StructuralComparison,
    compare_structure, extract_paragraphs, suggest_codes, validate_assignments,
  },
  store::BookStore,
  version::{BaselineChange, BookVersion, NewSnapshot, NewVersion, SourceType, VersionSnapshot},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  align::{self, ChapterOutcome},
  counters, ledger,
  locks::{BookGuard, BookLocks},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
  /// Append a `periodic-recheck` version even when a run found nothing.
  pub record_empty_versions: bool,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
  pub book:               Book,
  pub version:            BookVersion,
  pub comparison:         ComparisonRecord,
  pub chapters:           usize,
  pub paragraphs:         usize,
  /// Incoming paragraphs stored without a reference code.
  pub uncoded_paragraphs: usize,
}

/// Result of one comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
  pub comparison:              ComparisonRecord,
  /// `None` when the run found no change and empty versions are not kept,
  /// or when writing the version failed.
  pub version:                 Option<BookVersion>,
  pub total_changes:           u64,
  pub changed_paragraph_count: usize,
  pub chapters:                Vec<ChapterOutcome>,
  pub inserted:                usize,
  pub orphaned:                usize,
  pub skipped_chapters:        usize,
  pub skipped_paragraphs:      usize,
  pub failures:                usize,
}

impl ComparisonResult {
  pub fn is_partial(&self) -> bool { self.failures > 0 }
}

#[derive(Debug, Clone, Serialize)]
pub struct BaselineOutcome {
  #[serde(flatten)]
  pub change:     BaselineChange,
  pub comparison: ComparisonRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualImportOutcome {
  pub version:    BookVersion,
  pub comparison: ComparisonRecord,
  /// Assignments that produced a snapshot.
  pub matched:    usize,
  /// Assignments explicitly marked as having no stored counterpart.
  pub missing:    usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
  pub structure: StructuralComparison,
  pub matches:   Vec<ParagraphMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSeedOutcome {
  pub import: ImportOutcome,
  pub result: ComparisonResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphDiff {
  pub paragraph: Paragraph,
  pub segments:  Vec<DiffSegment>,
  pub stats:     DiffStats,
}

/// How a comparison run is recorded.
struct RunKind {
  source_type:     SourceType,
  comparison_type: ComparisonType,
  always_version:  bool,
  notes:           Option<String>,
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

pub struct Tracker<S> {
  store:  Arc<S>,
  locks:  BookLocks,
  config: TrackerConfig,
}

impl<S> Clone for Tracker<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      locks:  self.locks.clone(),
      config: self.config.clone(),
    }
  }
}

impl<S: BookStore> Tracker<S> {
  pub fn new(store: Arc<S>, config: TrackerConfig) -> Self {
    Self { store, locks: BookLocks::new(), config }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn locks(&self) -> &BookLocks { &self.locks }

  // ── Initial import ────────────────────────────────────────────────────────

  /// Store a book for the first time, with version 1 as its baseline.
  pub async fn import_book(
    &self,
    incoming: IncomingBook,
    language: Option<String>,
  ) -> Result<ImportOutcome> {
    let (outcome, _guard) = self.create_book(incoming, language).await?;
    Ok(outcome)
  }

  /// Insert and populate a new book, returning with its guard still held so
  /// the caller can keep working on the book without a gap.
  pub(crate) async fn create_book(
    &self,
    incoming: IncomingBook,
    language: Option<String>,
  ) -> Result<(ImportOutcome, BookGuard)> {
    if incoming.is_empty() {
      return Err(Error::EmptyBook);
    }
    if self
      .store
      .find_book_by_code(&incoming.code)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::DuplicateBookCode(incoming.code));
    }

    // The unique index still guards against a concurrent import of the
    // same code.
    let book = self
      .store
      .insert_book(NewBook {
        title:    incoming.title.clone(),
        code:     incoming.code.clone(),
        language: language.unwrap_or_else(|| "es".to_owned()),
      })
      .await
      .map_err(Error::store)?;

    let populated = async {
      let guard = self.locks.try_acquire(book.book_id)?;
      let outcome = self.populate(&book, &incoming.chapters).await?;
      Ok::<_, Error>((outcome, guard))
    }
    .await;

    match populated {
      Ok((outcome, guard)) => {
        tracing::info!(
          book_id = %book.book_id,
          code = %book.code,
          chapters = outcome.chapters,
          paragraphs = outcome.paragraphs,
          "book imported"
        );
        Ok((outcome, guard))
      }
      Err(e) => {
        // Leave no half-imported book behind.
        tracing::error!(book_id = %book.book_id, error = %e, "import failed; removing partial book");
        if let Err(cleanup) = self.store.delete_book(book.book_id).await {
          tracing::error!(book_id = %book.book_id, error = %cleanup, "failed to remove partial book");
        }
        Err(e)
      }
    }
  }

  async fn populate(&self, book: &Book, chapters: &[IncomingChapter]) -> Result<ImportOutcome> {
    let mut snapshots = Vec::new();
    let mut uncoded = 0;

    for incoming in chapters {
      let chapter = self
        .store
        .insert_chapter(NewChapter {
          book_id: book.book_id,
          number:  incoming.number,
          title:   incoming.title.clone(),
        })
        .await
        .map_err(Error::store)?;

      for (position, paragraph) in incoming.paragraphs.iter().enumerate() {
        let refcode = paragraph.refcode().map(str::to_owned);
        if refcode.is_none() {
          uncoded += 1;
        }
        let stored = self
          .store
          .insert_paragraph(NewParagraph {
            chapter_id: chapter.chapter_id,
            paragraph_number: (position + 1) as u32,
            refcode,
            text: paragraph.content.clone(),
          })
          .await
          .map_err(Error::store)?;
        snapshots.push(NewSnapshot { paragraph_id: stored.paragraph_id, text: stored.latest_text });
      }
    }

    if uncoded > 0 {
      tracing::warn!(book_id = %book.book_id, uncoded, "paragraphs stored without reference code cannot be rechecked");
    }

    let paragraphs = snapshots.len();
    let version = self
      .store
      .create_version(NewVersion::new(book.book_id, SourceType::InitialImport, true, snapshots))
      .await
      .map_err(Error::store)?;
    let comparison = self
      .store
      .append_comparison(NewComparison::marker(book.book_id, ComparisonType::InitialImport, None))
      .await
      .map_err(Error::store)?;

    Ok(ImportOutcome {
      book: book.clone(),
      version,
      comparison,
      chapters: chapters.len(),
      paragraphs,
      uncoded_paragraphs: uncoded,
    })
  }

  // ── Recheck ───────────────────────────────────────────────────────────────

  /// Compare freshly fetched chapters against the stored book.
  pub async fn recheck(
    &self,
    book_id: Uuid,
    chapters: &[IncomingChapter],
  ) -> Result<ComparisonResult> {
    let _guard = self.locks.try_acquire(book_id)?;
    self.require_book(book_id).await?;

    if chapters.iter().all(|c| c.paragraphs.is_empty()) {
      return Err(Error::EmptyBook);
    }

    self
      .run_comparison(book_id, chapters, RunKind {
        source_type:     SourceType::PeriodicRecheck,
        comparison_type: ComparisonType::PeriodicRecheck,
        always_version:  self.config.record_empty_versions,
        notes:           None,
      })
      .await
  }

  /// Align, update counters, snapshot and record. The caller holds the lock.
  async fn run_comparison(
    &self,
    book_id: Uuid,
    chapters: &[IncomingChapter],
    kind: RunKind,
  ) -> Result<ComparisonResult> {
    let at = Utc::now();
    let report = align::align(&*self.store, book_id, chapters, at).await?;
    let counter_outcome = counters::apply(&*self.store, book_id, &report, at).await;
    let mut failures = report.failures + counter_outcome.failures;

    let total_changes = report.total_changes();
    let version = if total_changes > 0 || kind.always_version {
      let input = NewVersion {
        notes: kind.notes.clone(),
        ..NewVersion::new(book_id, kind.source_type, false, report.changed.clone())
      };
      match self.store.create_version(input).await {
        Ok(version) => Some(version),
        Err(e) => {
          tracing::error!(%book_id, error = %e, "failed to record version snapshot");
          failures += 1;
          None
        }
      }
    } else {
      None
    };

    let comparison = self
      .store
      .append_comparison(ledger::entry(book_id, kind.comparison_type, &report, kind.notes))
      .await
      .map_err(Error::store)?;

    if failures > 0 {
      tracing::warn!(%book_id, failures, "comparison completed partially");
    }
    tracing::info!(
      %book_id,
      total_changes,
      changed_paragraphs = report.changed_paragraph_count(),
      version = ?version.as_ref().map(|v| v.version_number),
      "comparison recorded"
    );

    Ok(ComparisonResult {
      comparison,
      version,
      total_changes,
      changed_paragraph_count: report.changed_paragraph_count(),
      inserted: report.inserted(),
      orphaned: report.orphaned(),
      skipped_chapters: report.skipped_chapters,
      skipped_paragraphs: report.skipped_paragraphs,
      failures,
      chapters: report.chapters,
    })
  }

  // ── Baseline ──────────────────────────────────────────────────────────────

  /// Make `version_id` the reference state of `book_id`.
  pub async fn set_baseline(&self, book_id: Uuid, version_id: Uuid) -> Result<BaselineOutcome> {
    let _guard = self.locks.try_acquire(book_id)?;
    self.require_book(book_id).await?;

    let target = self
      .store
      .get_version(version_id)
      .await
      .map_err(Error::store)?
      .filter(|v| v.book_id == book_id)
      .ok_or(Error::VersionNotFound(version_id))?;
    let previous = self
      .store
      .list_versions(book_id)
      .await
      .map_err(Error::store)?
      .into_iter()
      .find(|v| v.is_baseline)
      .map(|v| v.version_number);

    let audit = NewComparison::marker(
      book_id,
      ComparisonType::BaselineChange,
      Some(ledger::baseline_note(previous, target.version_number)),
    );
    let (change, comparison) = self
      .store
      .set_baseline(book_id, version_id, audit)
      .await
      .map_err(Error::store)?
      .ok_or(Error::VersionNotFound(version_id))?;

    if change.paragraphs_uncovered > 0 {
      tracing::warn!(
        %book_id,
        version = change.current.version_number,
        uncovered = change.paragraphs_uncovered,
        "new baseline does not cover every paragraph; their base text is kept"
      );
    }
    tracing::info!(
      %book_id,
      previous = ?change.previous.as_ref().map(|v| v.version_number),
      current = change.current.version_number,
      updated = change.paragraphs_updated,
      "baseline changed"
    );

    Ok(BaselineOutcome { change, comparison })
  }

  // ── Manual historical import ──────────────────────────────────────────────

  /// Code suggestions for an uploaded plain-text edition of `book_id`.
  pub async fn suggest_matches(&self, book_id: Uuid, content: &str) -> Result<MatchReport> {
    self.require_book(book_id).await?;
    let uploaded = extract_paragraphs(content);
    if uploaded.is_empty() {
      return Err(Error::EmptyBook);
    }

    let stored = self.store.list_book_paragraphs(book_id).await.map_err(Error::store)?;
    // Historical editions are closest to the baseline, not to the latest fetch.
    let candidates: Vec<CodeCandidate> = stored
      .iter()
      .filter_map(|p| {
        p.refcode.as_ref().map(|code| CodeCandidate { code: code.clone(), text: p.base_text.clone() })
      })
      .collect();
    let structure = compare_structure(uploaded.len(), stored.len());

    // Quadratic edit distance over every pair; keep it off the runtime.
    let matches =
      tokio::task::spawn_blocking(move || suggest_codes(&uploaded, &candidates)).await?;

    Ok(MatchReport { structure, matches })
  }

  /// Record a historical edition whose paragraphs were mapped to stored
  /// codes. Nothing is written unless every assignment validates.
  pub async fn import_manual_version(
    &self,
    book_id: Uuid,
    import: ManualImport,
  ) -> Result<ManualImportOutcome> {
    let _guard = self.locks.try_acquire(book_id)?;
    let book = self.require_book(book_id).await?;

    if import.assignments.is_empty() {
      return Err(Error::EmptyBook);
    }

    let stored = self.store.list_book_paragraphs(book_id).await.map_err(Error::store)?;
    let by_code: HashMap<&str, Uuid> = stored
      .iter()
      .filter_map(|p| p.refcode.as_deref().map(|c| (c, p.paragraph_id)))
      .collect();
    let existing: HashSet<String> = by_code.keys().map(|c| (*c).to_owned()).collect();

    let errors = validate_assignments(&import.assignments, &book.code, &existing);
    if !errors.is_empty() {
      tracing::warn!(%book_id, errors = errors.len(), "manual import rejected");
      return Err(Error::Validation(errors));
    }

    let snapshots: Vec<NewSnapshot> = import
      .matched()
      .filter_map(|(code, a)| {
        by_code
          .get(code)
          .map(|&paragraph_id| NewSnapshot { paragraph_id, text: a.text.clone() })
      })
      .collect();
    let matched = snapshots.len();
    let missing = import.assignments.len() - matched;

    let is_baseline = import.kind == ManualVersionKind::PhysicalBaseline;
    if is_baseline && matched < stored.len() {
      tracing::warn!(
        %book_id,
        uncovered = stored.len() - matched,
        "physical baseline does not cover every paragraph; their base text is kept"
      );
    }

    let version = self
      .store
      .create_version(NewVersion {
        book_id,
        source_type: SourceType::ManualHistorical,
        is_baseline,
        edition_date: import.edition_date,
        notes: import.notes.clone(),
        snapshots,
      })
      .await
      .map_err(Error::store)?;

    let note = import
      .notes
      .unwrap_or_else(|| format!("manual historical version {}", version.version_number));
    let comparison = self
      .store
      .append_comparison(NewComparison::marker(
        book_id,
        ComparisonType::ManualHistorical,
        Some(note),
      ))
      .await
      .map_err(Error::store)?;

    tracing::info!(
      %book_id,
      version = version.version_number,
      baseline = is_baseline,
      matched,
      missing,
      "manual version imported"
    );

    Ok(ManualImportOutcome { version, comparison, matched, missing })
  }

  // ── Test seed ─────────────────────────────────────────────────────────────

  /// Import `original`, then immediately compare `modified` against it so the
  /// book starts out with a known set of changes.
  pub async fn import_test_seed(
    &self,
    original: IncomingBook,
    modified: &[IncomingChapter],
  ) -> Result<TestSeedOutcome> {
    let (import, _guard) = self.create_book(original, None).await?;
    let book_id = import.book.book_id;

    let result = self
      .run_comparison(book_id, modified, RunKind {
        source_type:     SourceType::TestSeed,
        comparison_type: ComparisonType::TestImport,
        always_version:  true,
        notes:           Some("test seed with deliberately introduced changes".to_owned()),
      })
      .await?;

    Ok(TestSeedOutcome { import, result })
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  /// Delete a book and everything it owns. `confirm` must repeat the book
  /// code.
  pub async fn delete_book(&self, book_id: Uuid, confirm: &str) -> Result<Book> {
    let _guard = self.locks.try_acquire(book_id)?;
    let book = self.require_book(book_id).await?;

    if confirm != book.code {
      return Err(Error::ConfirmationMismatch {
        expected: book.code,
        given:    confirm.to_owned(),
      });
    }

    if !self.store.delete_book(book_id).await.map_err(Error::store)? {
      return Err(Error::BookNotFound(book_id));
    }
    tracing::info!(%book_id, code = %book.code, "book deleted");
    Ok(book)
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  pub async fn list_books(&self) -> Result<Vec<Book>> {
    self.store.list_books().await.map_err(Error::store)
  }

  pub async fn get_book(&self, book_id: Uuid) -> Result<Book> { self.require_book(book_id).await }

  pub async fn list_chapters(&self, book_id: Uuid) -> Result<Vec<Chapter>> {
    self.require_book(book_id).await?;
    self.store.list_chapters(book_id).await.map_err(Error::store)
  }

  pub async fn list_paragraphs(&self, chapter_id: Uuid) -> Result<Vec<Paragraph>> {
    self
      .store
      .get_chapter(chapter_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ChapterNotFound(chapter_id))?;
    self.store.list_paragraphs(chapter_id).await.map_err(Error::store)
  }

  /// Word diff from a paragraph's baseline text to its latest text.
  pub async fn paragraph_diff(&self, paragraph_id: Uuid) -> Result<ParagraphDiff> {
    let paragraph = self
      .store
      .get_paragraph(paragraph_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ParagraphNotFound(paragraph_id))?;
    let segments = diff_words(&paragraph.base_text, &paragraph.latest_text);
    let stats = DiffStats::from_segments(&segments);
    Ok(ParagraphDiff { paragraph, segments, stats })
  }

  pub async fn list_versions(&self, book_id: Uuid) -> Result<Vec<BookVersion>> {
    self.require_book(book_id).await?;
    self.store.list_versions(book_id).await.map_err(Error::store)
  }

  /// Texts captured by `version_id`, which must belong to `book_id`.
  pub async fn list_snapshots(
    &self,
    book_id: Uuid,
    version_id: Uuid,
  ) -> Result<Vec<VersionSnapshot>> {
    self
      .store
      .get_version(version_id)
      .await
      .map_err(Error::store)?
      .filter(|v| v.book_id == book_id)
      .ok_or(Error::VersionNotFound(version_id))?;
    self.store.list_snapshots(version_id).await.map_err(Error::store)
  }

  pub async fn list_comparisons(&self, book_id: Uuid) -> Result<Vec<ComparisonRecord>> {
    self.require_book(book_id).await?;
    self.store.list_comparisons(book_id).await.map_err(Error::store)
  }

  pub async fn amend_comparison_notes(
    &self,
    comparison_id: Uuid,
    notes: Option<String>,
  ) -> Result<ComparisonRecord> {
    self
      .store
      .amend_comparison_notes(comparison_id, notes)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ComparisonNotFound(comparison_id))
  }

  async fn require_book(&self, book_id: Uuid) -> Result<Book> {
    self
      .store
      .get_book(book_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::BookNotFound(book_id))
  }
}
