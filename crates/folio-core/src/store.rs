//! The `BookStore` trait.
//!
//! Implemented by storage backends (e.g. `folio-store-sqlite`). The engine
//! and the HTTP layer depend on this abstraction, not on any concrete
//! backend.
//!
//! Missing rows are reported through `Option`/`bool` return values so that
//! callers can raise precise not-found errors without inspecting the
//! backend's error type.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  book::{Book, ChangeEntry, Chapter, NewBook, NewChapter, NewParagraph, Paragraph},
  ledger::{ComparisonRecord, NewComparison},
  version::{BaselineChange, BookVersion, NewVersion, VersionSnapshot},
};

/// Abstraction over a Folio storage backend.
///
/// Every method returns a `Send` future so the trait can be used from a
/// multi-threaded runtime (e.g. tokio with `axum`).
pub trait BookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Books ─────────────────────────────────────────────────────────────

  /// Persist a new book with zeroed counters. Fails if the code is taken.
  fn insert_book(
    &self,
    input: NewBook,
  ) -> impl Future<Output = Result<Book, Self::Error>> + Send + '_;

  fn get_book(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  fn find_book_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + 'a;

  fn list_books(&self) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + '_;

  /// Delete a book and, by cascade, every chapter, paragraph, version,
  /// snapshot and comparison record it owns. Returns `false` if absent.
  fn delete_book(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Chapters ──────────────────────────────────────────────────────────

  fn insert_chapter(
    &self,
    input: NewChapter,
  ) -> impl Future<Output = Result<Chapter, Self::Error>> + Send + '_;

  fn get_chapter(
    &self,
    chapter_id: Uuid,
  ) -> impl Future<Output = Result<Option<Chapter>, Self::Error>> + Send + '_;

  /// All chapters of a book, ordered by number.
  fn list_chapters(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Chapter>, Self::Error>> + Send + '_;

  // ── Paragraphs ────────────────────────────────────────────────────────

  /// Insert an unchanged paragraph (`base_text == latest_text`, empty
  /// history).
  fn insert_paragraph(
    &self,
    input: NewParagraph,
  ) -> impl Future<Output = Result<Paragraph, Self::Error>> + Send + '_;

  fn get_paragraph(
    &self,
    paragraph_id: Uuid,
  ) -> impl Future<Output = Result<Option<Paragraph>, Self::Error>> + Send + '_;

  /// All paragraphs of a chapter, ordered by `paragraph_number`.
  fn list_paragraphs(
    &self,
    chapter_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Paragraph>, Self::Error>> + Send + '_;

  /// All paragraphs of a book, ordered by chapter then `paragraph_number`.
  fn list_book_paragraphs(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Paragraph>, Self::Error>> + Send + '_;

  /// Record a detected modification: `latest_text = entry.new_text`,
  /// `has_changed = true`, `entry` appended to the history and `updated_at`
  /// set to `entry.date`. Returns `false` if the paragraph is absent.
  fn apply_change(
    &self,
    paragraph_id: Uuid,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Counters ──────────────────────────────────────────────────────────

  /// Atomically add `changes` to a chapter's `change_count`.
  fn add_chapter_changes(
    &self,
    chapter_id: Uuid,
    changes: u64,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Atomically add `changes` to a book's `total_changes` and set its
  /// `last_check_date` to `at`.
  fn record_book_check(
    &self,
    book_id: Uuid,
    changes: u64,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Versions ──────────────────────────────────────────────────────────

  /// Append a version with the next per-book number and its snapshots.
  ///
  /// A baseline version demotes the previous baseline and overwrites the
  /// `base_text` of every snapshotted paragraph, atomically.
  fn create_version(
    &self,
    input: NewVersion,
  ) -> impl Future<Output = Result<BookVersion, Self::Error>> + Send + '_;

  fn get_version(
    &self,
    version_id: Uuid,
  ) -> impl Future<Output = Result<Option<BookVersion>, Self::Error>> + Send + '_;

  /// All versions of a book, ordered by `version_number`.
  fn list_versions(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Vec<BookVersion>, Self::Error>> + Send + '_;

  fn list_snapshots(
    &self,
    version_id: Uuid,
  ) -> impl Future<Output = Result<Vec<VersionSnapshot>, Self::Error>> + Send + '_;

  /// Make `version_id` the baseline of `book_id` in a single transaction:
  /// demote the current baseline, promote the target, copy the target's
  /// snapshots into `base_text`, and append `audit` to the ledger.
  ///
  /// Returns `None` (and changes nothing) if the version does not belong to
  /// the book.
  fn set_baseline(
    &self,
    book_id: Uuid,
    version_id: Uuid,
    audit: NewComparison,
  ) -> impl Future<Output = Result<Option<(BaselineChange, ComparisonRecord)>, Self::Error>>
  + Send
  + '_;

  // ── Ledger ────────────────────────────────────────────────────────────

  fn append_comparison(
    &self,
    input: NewComparison,
  ) -> impl Future<Output = Result<ComparisonRecord, Self::Error>> + Send + '_;

  /// All comparison records of a book, oldest first.
  fn list_comparisons(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ComparisonRecord>, Self::Error>> + Send + '_;

  /// Replace the free-text notes of a record. Numeric fields are never
  /// touched. Returns `None` if the record does not exist.
  fn amend_comparison_notes(
    &self,
    comparison_id: Uuid,
    notes: Option<String>,
  ) -> impl Future<Output = Result<Option<ComparisonRecord>, Self::Error>> + Send + '_;
}
