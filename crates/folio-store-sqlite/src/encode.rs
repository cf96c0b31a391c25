//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`. Change history and chapter breakdowns are stored as compact
//! JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use folio_core::{
  book::{Book, ChangeHistory, Chapter, Paragraph},
  ledger::{ChapterBreakdown, ComparisonRecord, ComparisonType},
  version::{BookVersion, SourceType, VersionSnapshot},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SourceType ──────────────────────────────────────────────────────────────

pub fn encode_source_type(t: SourceType) -> &'static str {
  match t {
    SourceType::InitialImport => "initial-import",
    SourceType::PeriodicRecheck => "periodic-recheck",
    SourceType::ManualHistorical => "manual-historical",
    SourceType::TestSeed => "test-seed",
  }
}

pub fn decode_source_type(s: &str) -> Result<SourceType> {
  match s {
    "initial-import" => Ok(SourceType::InitialImport),
    "periodic-recheck" => Ok(SourceType::PeriodicRecheck),
    "manual-historical" => Ok(SourceType::ManualHistorical),
    "test-seed" => Ok(SourceType::TestSeed),
    other => Err(unknown("source type", other)),
  }
}

// ─── ComparisonType ──────────────────────────────────────────────────────────

pub fn encode_comparison_type(t: ComparisonType) -> &'static str {
  match t {
    ComparisonType::InitialImport => "initial-import",
    ComparisonType::PeriodicRecheck => "periodic-recheck",
    ComparisonType::BaselineChange => "baseline-change",
    ComparisonType::ManualHistorical => "manual-historical",
    ComparisonType::TestImport => "test-import",
  }
}

pub fn decode_comparison_type(s: &str) -> Result<ComparisonType> {
  match s {
    "initial-import" => Ok(ComparisonType::InitialImport),
    "periodic-recheck" => Ok(ComparisonType::PeriodicRecheck),
    "baseline-change" => Ok(ComparisonType::BaselineChange),
    "manual-historical" => Ok(ComparisonType::ManualHistorical),
    "test-import" => Ok(ComparisonType::TestImport),
    other => Err(unknown("comparison type", other)),
  }
}

fn unknown(kind: &'static str, value: &str) -> Error {
  Error::Core(folio_core::Error::UnknownDiscriminant { kind, value: value.to_owned() })
}

// ─── Chapter breakdown ───────────────────────────────────────────────────────

pub fn encode_breakdown(chapters: &[ChapterBreakdown]) -> Result<String> {
  Ok(serde_json::to_string(chapters)?)
}

pub fn decode_breakdown(s: &str) -> Result<Vec<ChapterBreakdown>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const BOOK_COLUMNS: &str =
  "book_id, title, code, language, total_changes, last_check_date, imported_at, updated_at";

/// Raw values read directly from a `books` row.
pub struct RawBook {
  pub book_id:         String,
  pub title:           String,
  pub code:            String,
  pub language:        String,
  pub total_changes:   i64,
  pub last_check_date: Option<String>,
  pub imported_at:     String,
  pub updated_at:      String,
}

impl RawBook {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:         row.get(0)?,
      title:           row.get(1)?,
      code:            row.get(2)?,
      language:        row.get(3)?,
      total_changes:   row.get(4)?,
      last_check_date: row.get(5)?,
      imported_at:     row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_book(self) -> Result<Book> {
    Ok(Book {
      book_id:         decode_uuid(&self.book_id)?,
      title:           self.title,
      code:            self.code,
      language:        self.language,
      total_changes:   self.total_changes as u64,
      last_check_date: self.last_check_date.as_deref().map(decode_dt).transpose()?,
      imported_at:     decode_dt(&self.imported_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

pub const CHAPTER_COLUMNS: &str =
  "chapter_id, book_id, number, title, change_count, created_at, updated_at";

pub struct RawChapter {
  pub chapter_id:   String,
  pub book_id:      String,
  pub number:       u32,
  pub title:        String,
  pub change_count: i64,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawChapter {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      chapter_id:   row.get(0)?,
      book_id:      row.get(1)?,
      number:       row.get(2)?,
      title:        row.get(3)?,
      change_count: row.get(4)?,
      created_at:   row.get(5)?,
      updated_at:   row.get(6)?,
    })
  }

  pub fn into_chapter(self) -> Result<Chapter> {
    Ok(Chapter {
      chapter_id:   decode_uuid(&self.chapter_id)?,
      book_id:      decode_uuid(&self.book_id)?,
      number:       self.number,
      title:        self.title,
      change_count: self.change_count as u64,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list for `paragraphs`, qualified with the `p` alias so it can be
/// used in joins.
pub const PARAGRAPH_COLUMNS: &str = "p.paragraph_id, p.chapter_id, p.paragraph_number, \
   p.refcode, p.base_text, p.latest_text, p.has_changed, p.change_history, \
   p.created_at, p.updated_at";

pub struct RawParagraph {
  pub paragraph_id:     String,
  pub chapter_id:       String,
  pub paragraph_number: u32,
  pub refcode:          Option<String>,
  pub base_text:        String,
  pub latest_text:      String,
  pub has_changed:      bool,
  pub change_history:   String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawParagraph {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      paragraph_id:     row.get(0)?,
      chapter_id:       row.get(1)?,
      paragraph_number: row.get(2)?,
      refcode:          row.get(3)?,
      base_text:        row.get(4)?,
      latest_text:      row.get(5)?,
      has_changed:      row.get(6)?,
      change_history:   row.get(7)?,
      created_at:       row.get(8)?,
      updated_at:       row.get(9)?,
    })
  }

  pub fn into_paragraph(self) -> Result<Paragraph> {
    Ok(Paragraph {
      paragraph_id:     decode_uuid(&self.paragraph_id)?,
      chapter_id:       decode_uuid(&self.chapter_id)?,
      paragraph_number: self.paragraph_number,
      refcode:          self.refcode,
      base_text:        self.base_text,
      latest_text:      self.latest_text,
      has_changed:      self.has_changed,
      change_history:   ChangeHistory::from_json(&self.change_history)?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub const VERSION_COLUMNS: &str = "version_id, book_id, version_number, source_type, \
   is_baseline, edition_date, notes, imported_at";

pub struct RawVersion {
  pub version_id:     String,
  pub book_id:        String,
  pub version_number: u32,
  pub source_type:    String,
  pub is_baseline:    bool,
  pub edition_date:   Option<String>,
  pub notes:          Option<String>,
  pub imported_at:    String,
}

impl RawVersion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      version_id:     row.get(0)?,
      book_id:        row.get(1)?,
      version_number: row.get(2)?,
      source_type:    row.get(3)?,
      is_baseline:    row.get(4)?,
      edition_date:   row.get(5)?,
      notes:          row.get(6)?,
      imported_at:    row.get(7)?,
    })
  }

  pub fn into_version(self) -> Result<BookVersion> {
    Ok(BookVersion {
      version_id:     decode_uuid(&self.version_id)?,
      book_id:        decode_uuid(&self.book_id)?,
      version_number: self.version_number,
      source_type:    decode_source_type(&self.source_type)?,
      is_baseline:    self.is_baseline,
      edition_date:   self.edition_date.as_deref().map(decode_date).transpose()?,
      notes:          self.notes,
      imported_at:    decode_dt(&self.imported_at)?,
    })
  }
}

pub struct RawSnapshot {
  pub snapshot_id:  String,
  pub version_id:   String,
  pub paragraph_id: String,
  pub text:         String,
}

impl RawSnapshot {
  pub fn into_snapshot(self) -> Result<VersionSnapshot> {
    Ok(VersionSnapshot {
      snapshot_id:  decode_uuid(&self.snapshot_id)?,
      version_id:   decode_uuid(&self.version_id)?,
      paragraph_id: decode_uuid(&self.paragraph_id)?,
      text:         self.text,
    })
  }
}

pub const COMPARISON_COLUMNS: &str = "comparison_id, book_id, comparison_date, \
   comparison_type, total_changes, changed_paragraph_count, chapters_affected, notes";

pub struct RawComparison {
  pub comparison_id:           String,
  pub book_id:                 String,
  pub comparison_date:         String,
  pub comparison_type:         String,
  pub total_changes:           i64,
  pub changed_paragraph_count: i64,
  pub chapters_affected:       String,
  pub notes:                   Option<String>,
}

impl RawComparison {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comparison_id:           row.get(0)?,
      book_id:                 row.get(1)?,
      comparison_date:         row.get(2)?,
      comparison_type:         row.get(3)?,
      total_changes:           row.get(4)?,
      changed_paragraph_count: row.get(5)?,
      chapters_affected:       row.get(6)?,
      notes:                   row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<ComparisonRecord> {
    Ok(ComparisonRecord {
      comparison_id:           decode_uuid(&self.comparison_id)?,
      book_id:                 decode_uuid(&self.book_id)?,
      comparison_date:         decode_dt(&self.comparison_date)?,
      comparison_type:         decode_comparison_type(&self.comparison_type)?,
      total_changes:           self.total_changes as u64,
      changed_paragraph_count: self.changed_paragraph_count as u64,
      chapters_affected:       decode_breakdown(&self.chapters_affected)?,
      notes:                   self.notes,
    })
  }
}
