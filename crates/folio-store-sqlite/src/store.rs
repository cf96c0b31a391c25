//! [`SqliteStore`]: the SQLite implementation of [`BookStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use folio_core::{
  book::{Book, ChangeEntry, ChangeHistory, Chapter, NewBook, NewChapter, NewParagraph, Paragraph},
  ledger::{ComparisonRecord, NewComparison},
  store::BookStore,
  version::{BaselineChange, BookVersion, NewVersion, VersionSnapshot},
};

use crate::{
  Error, Result,
  encode::{
    BOOK_COLUMNS, CHAPTER_COLUMNS, COMPARISON_COLUMNS, PARAGRAPH_COLUMNS, RawBook, RawChapter,
    RawComparison, RawParagraph, RawSnapshot, RawVersion, VERSION_COLUMNS, encode_breakdown,
    encode_comparison_type, encode_date, encode_dt, encode_source_type, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Ledger rows ─────────────────────────────────────────────────────────────

/// A ledger record with every column already encoded, ready to be moved into
/// a connection closure.
struct ComparisonRow {
  comparison_id:           String,
  book_id:                 String,
  comparison_date:         String,
  comparison_type:         &'static str,
  total_changes:           i64,
  changed_paragraph_count: i64,
  chapters_affected:       String,
  notes:                   Option<String>,
}

impl ComparisonRow {
  fn build(input: NewComparison) -> Result<(ComparisonRecord, Self)> {
    let record = ComparisonRecord {
      comparison_id:           Uuid::new_v4(),
      book_id:                 input.book_id,
      comparison_date:         Utc::now(),
      comparison_type:         input.comparison_type,
      total_changes:           input.total_changes,
      changed_paragraph_count: input.changed_paragraph_count,
      chapters_affected:       input.chapters_affected,
      notes:                   input.notes,
    };
    let row = Self {
      comparison_id:           encode_uuid(record.comparison_id),
      book_id:                 encode_uuid(record.book_id),
      comparison_date:         encode_dt(record.comparison_date),
      comparison_type:         encode_comparison_type(record.comparison_type),
      total_changes:           record.total_changes as i64,
      changed_paragraph_count: record.changed_paragraph_count as i64,
      chapters_affected:       encode_breakdown(&record.chapters_affected)?,
      notes:                   record.notes.clone(),
    };
    Ok((record, row))
  }

  fn insert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO comparisons (
         comparison_id, book_id, comparison_date, comparison_type,
         total_changes, changed_paragraph_count, chapters_affected, notes
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      rusqlite::params![
        self.comparison_id,
        self.book_id,
        self.comparison_date,
        self.comparison_type,
        self.total_changes,
        self.changed_paragraph_count,
        self.chapters_affected,
        self.notes,
      ],
    )?;
    Ok(())
  }
}

/// Raw rows read inside the baseline transaction.
struct RawBaselineSwitch {
  previous:  Option<RawVersion>,
  current:   RawVersion,
  updated:   usize,
  uncovered: usize,
}

// ─── BookStore impl ──────────────────────────────────────────────────────────

impl BookStore for SqliteStore {
  type Error = Error;

  // ── Books ─────────────────────────────────────────────────────────────────

  async fn insert_book(&self, input: NewBook) -> Result<Book> {
    let now = Utc::now();
    let book = Book {
      book_id:         Uuid::new_v4(),
      title:           input.title,
      code:            input.code,
      language:        input.language,
      total_changes:   0,
      last_check_date: None,
      imported_at:     now,
      updated_at:      now,
    };

    let id_str   = encode_uuid(book.book_id);
    let title    = book.title.clone();
    let code     = book.code.clone();
    let language = book.language.clone();
    let at_str   = encode_dt(now);

    let inserted = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO books (book_id, title, code, language, total_changes, imported_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
          rusqlite::params![id_str, title, code, language, at_str],
        );
        match res {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(folio_core::Error::DuplicateBookCode(book.code).into());
    }
    Ok(book)
  }

  async fn get_book(&self, book_id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(book_id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?1"),
            rusqlite::params![id_str],
            RawBook::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn find_book_by_code(&self, code: &str) -> Result<Option<Book>> {
    let code = code.to_owned();

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books WHERE code = ?1"),
            rusqlite::params![code],
            RawBook::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn list_books(&self) -> Result<Vec<Book>> {
    let raws: Vec<RawBook> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY title"))?;
        let rows = stmt
          .query_map([], RawBook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }

  async fn delete_book(&self, book_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(book_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM books WHERE book_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Chapters ──────────────────────────────────────────────────────────────

  async fn insert_chapter(&self, input: NewChapter) -> Result<Chapter> {
    let now = Utc::now();
    let chapter = Chapter {
      chapter_id:   Uuid::new_v4(),
      book_id:      input.book_id,
      number:       input.number,
      title:        input.title,
      change_count: 0,
      created_at:   now,
      updated_at:   now,
    };

    let id_str      = encode_uuid(chapter.chapter_id);
    let book_id_str = encode_uuid(chapter.book_id);
    let number      = chapter.number;
    let title       = chapter.title.clone();
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chapters (chapter_id, book_id, number, title, change_count, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
          rusqlite::params![id_str, book_id_str, number, title, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(chapter)
  }

  async fn get_chapter(&self, chapter_id: Uuid) -> Result<Option<Chapter>> {
    let id_str = encode_uuid(chapter_id);

    let raw: Option<RawChapter> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE chapter_id = ?1"),
            rusqlite::params![id_str],
            RawChapter::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawChapter::into_chapter).transpose()
  }

  async fn list_chapters(&self, book_id: Uuid) -> Result<Vec<Chapter>> {
    let id_str = encode_uuid(book_id);

    let raws: Vec<RawChapter> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE book_id = ?1 ORDER BY number"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawChapter::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChapter::into_chapter).collect()
  }

  // ── Paragraphs ────────────────────────────────────────────────────────────

  async fn insert_paragraph(&self, input: NewParagraph) -> Result<Paragraph> {
    let now = Utc::now();
    let paragraph = Paragraph {
      paragraph_id:     Uuid::new_v4(),
      chapter_id:       input.chapter_id,
      paragraph_number: input.paragraph_number,
      refcode:          input.refcode,
      base_text:        input.text.clone(),
      latest_text:      input.text,
      has_changed:      false,
      change_history:   ChangeHistory::default(),
      created_at:       now,
      updated_at:       now,
    };

    let id_str         = encode_uuid(paragraph.paragraph_id);
    let chapter_id_str = encode_uuid(paragraph.chapter_id);
    let number         = paragraph.paragraph_number;
    let refcode        = paragraph.refcode.clone();
    let text           = paragraph.latest_text.clone();
    let history_str    = paragraph.change_history.to_json()?;
    let at_str         = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO paragraphs (
             paragraph_id, chapter_id, paragraph_number, refcode,
             base_text, latest_text, has_changed, change_history,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?5, 0, ?6, ?7, ?7)",
          rusqlite::params![id_str, chapter_id_str, number, refcode, text, history_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(paragraph)
  }

  async fn get_paragraph(&self, paragraph_id: Uuid) -> Result<Option<Paragraph>> {
    let id_str = encode_uuid(paragraph_id);

    let raw: Option<RawParagraph> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PARAGRAPH_COLUMNS} FROM paragraphs p WHERE p.paragraph_id = ?1"),
            rusqlite::params![id_str],
            RawParagraph::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawParagraph::into_paragraph).transpose()
  }

  async fn list_paragraphs(&self, chapter_id: Uuid) -> Result<Vec<Paragraph>> {
    let id_str = encode_uuid(chapter_id);

    let raws: Vec<RawParagraph> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARAGRAPH_COLUMNS} FROM paragraphs p
           WHERE p.chapter_id = ?1
           ORDER BY p.paragraph_number, p.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawParagraph::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParagraph::into_paragraph).collect()
  }

  async fn list_book_paragraphs(&self, book_id: Uuid) -> Result<Vec<Paragraph>> {
    let id_str = encode_uuid(book_id);

    let raws: Vec<RawParagraph> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARAGRAPH_COLUMNS} FROM paragraphs p
           JOIN chapters c ON c.chapter_id = p.chapter_id
           WHERE c.book_id = ?1
           ORDER BY c.number, p.paragraph_number, p.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawParagraph::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParagraph::into_paragraph).collect()
  }

  async fn apply_change(&self, paragraph_id: Uuid, entry: ChangeEntry) -> Result<bool> {
    let id_str     = encode_uuid(paragraph_id);
    let new_text   = entry.new_text.clone();
    let at_str     = encode_dt(entry.date);
    let entry_json = serde_json::to_string(&entry)?;

    // The history append happens inside SQLite so that the read-modify-write
    // of the JSON document is a single statement.
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE paragraphs
           SET latest_text    = ?2,
               has_changed    = 1,
               change_history = json_insert(change_history, '$.entries[#]', json(?3)),
               updated_at     = ?4
           WHERE paragraph_id = ?1",
          rusqlite::params![id_str, new_text, entry_json, at_str],
        )?)
      })
      .await?;

    Ok(updated > 0)
  }

  // ── Counters ──────────────────────────────────────────────────────────────

  async fn add_chapter_changes(
    &self,
    chapter_id: Uuid,
    changes:    u64,
    at:         DateTime<Utc>,
  ) -> Result<()> {
    let id_str  = encode_uuid(chapter_id);
    let changes = changes as i64;
    let at_str  = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE chapters SET change_count = change_count + ?2, updated_at = ?3
           WHERE chapter_id = ?1",
          rusqlite::params![id_str, changes, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_book_check(&self, book_id: Uuid, changes: u64, at: DateTime<Utc>) -> Result<()> {
    let id_str  = encode_uuid(book_id);
    let changes = changes as i64;
    let at_str  = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE books
           SET total_changes = total_changes + ?2, last_check_date = ?3, updated_at = ?3
           WHERE book_id = ?1",
          rusqlite::params![id_str, changes, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Versions ──────────────────────────────────────────────────────────────

  async fn create_version(&self, input: NewVersion) -> Result<BookVersion> {
    let now        = Utc::now();
    let version_id = Uuid::new_v4();

    let id_str       = encode_uuid(version_id);
    let book_id_str  = encode_uuid(input.book_id);
    let source_str   = encode_source_type(input.source_type);
    let is_baseline  = input.is_baseline;
    let edition_str  = input.edition_date.map(encode_date);
    let notes        = input.notes.clone();
    let at_str       = encode_dt(now);
    let snapshots: Vec<(String, String, String)> = input
      .snapshots
      .into_iter()
      .map(|s| (encode_uuid(Uuid::new_v4()), encode_uuid(s.paragraph_id), s.text))
      .collect();

    let version_number: u32 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let next: u32 = tx.query_row(
          "SELECT COALESCE(MAX(version_number), 0) + 1 FROM book_versions WHERE book_id = ?1",
          rusqlite::params![book_id_str],
          |r| r.get(0),
        )?;

        if is_baseline {
          tx.execute(
            "UPDATE book_versions SET is_baseline = 0 WHERE book_id = ?1 AND is_baseline = 1",
            rusqlite::params![book_id_str],
          )?;
        }

        tx.execute(
          "INSERT INTO book_versions (
             version_id, book_id, version_number, source_type,
             is_baseline, edition_date, notes, imported_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            book_id_str,
            next,
            source_str,
            is_baseline,
            edition_str,
            notes,
            at_str,
          ],
        )?;

        {
          let mut insert = tx.prepare(
            "INSERT INTO version_snapshots (snapshot_id, version_id, paragraph_id, text)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          let mut rebase = tx.prepare(
            "UPDATE paragraphs SET base_text = ?2, updated_at = ?3 WHERE paragraph_id = ?1",
          )?;
          for (snapshot_id, paragraph_id, text) in &snapshots {
            insert.execute(rusqlite::params![snapshot_id, id_str, paragraph_id, text])?;
            if is_baseline {
              rebase.execute(rusqlite::params![paragraph_id, text, at_str])?;
            }
          }
        }

        tx.commit()?;
        Ok(next)
      })
      .await?;

    Ok(BookVersion {
      version_id,
      book_id: input.book_id,
      version_number,
      source_type: input.source_type,
      is_baseline,
      edition_date: input.edition_date,
      notes: input.notes,
      imported_at: now,
    })
  }

  async fn get_version(&self, version_id: Uuid) -> Result<Option<BookVersion>> {
    let id_str = encode_uuid(version_id);

    let raw: Option<RawVersion> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {VERSION_COLUMNS} FROM book_versions WHERE version_id = ?1"),
            rusqlite::params![id_str],
            RawVersion::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVersion::into_version).transpose()
  }

  async fn list_versions(&self, book_id: Uuid) -> Result<Vec<BookVersion>> {
    let id_str = encode_uuid(book_id);

    let raws: Vec<RawVersion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VERSION_COLUMNS} FROM book_versions WHERE book_id = ?1 ORDER BY version_number"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawVersion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVersion::into_version).collect()
  }

  async fn list_snapshots(&self, version_id: Uuid) -> Result<Vec<VersionSnapshot>> {
    let id_str = encode_uuid(version_id);

    let raws: Vec<RawSnapshot> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT snapshot_id, version_id, paragraph_id, text
           FROM version_snapshots WHERE version_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawSnapshot {
              snapshot_id:  row.get(0)?,
              version_id:   row.get(1)?,
              paragraph_id: row.get(2)?,
              text:         row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }

  async fn set_baseline(
    &self,
    book_id:    Uuid,
    version_id: Uuid,
    audit:      NewComparison,
  ) -> Result<Option<(BaselineChange, ComparisonRecord)>> {
    let book_id_str    = encode_uuid(book_id);
    let version_id_str = encode_uuid(version_id);
    let at_str         = encode_dt(Utc::now());
    let (record, row)  = ComparisonRow::build(audit)?;

    // Every step runs in one transaction: a failure anywhere rolls back the
    // flag swap, the base_text rewrite and the audit record together.
    let raw: Option<RawBaselineSwitch> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current = tx
          .query_row(
            &format!(
              "SELECT {VERSION_COLUMNS} FROM book_versions WHERE version_id = ?1 AND book_id = ?2"
            ),
            rusqlite::params![version_id_str, book_id_str],
            RawVersion::from_row,
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(None);
        };

        let previous = tx
          .query_row(
            &format!(
              "SELECT {VERSION_COLUMNS} FROM book_versions WHERE book_id = ?1 AND is_baseline = 1"
            ),
            rusqlite::params![book_id_str],
            RawVersion::from_row,
          )
          .optional()?;

        tx.execute(
          "UPDATE book_versions SET is_baseline = 0 WHERE book_id = ?1 AND is_baseline = 1",
          rusqlite::params![book_id_str],
        )?;
        tx.execute(
          "UPDATE book_versions SET is_baseline = 1 WHERE version_id = ?1",
          rusqlite::params![version_id_str],
        )?;

        let updated = tx.execute(
          "UPDATE paragraphs
           SET base_text = (
                 SELECT s.text FROM version_snapshots s
                 WHERE s.version_id = ?1 AND s.paragraph_id = paragraphs.paragraph_id
                 ORDER BY s.rowid DESC LIMIT 1
               ),
               updated_at = ?2
           WHERE paragraph_id IN (
             SELECT paragraph_id FROM version_snapshots WHERE version_id = ?1
           )",
          rusqlite::params![version_id_str, at_str],
        )?;

        let uncovered: i64 = tx.query_row(
          "SELECT COUNT(*) FROM paragraphs p
           JOIN chapters c ON c.chapter_id = p.chapter_id
           WHERE c.book_id = ?1
             AND p.paragraph_id NOT IN (
               SELECT paragraph_id FROM version_snapshots WHERE version_id = ?2
             )",
          rusqlite::params![book_id_str, version_id_str],
          |r| r.get(0),
        )?;

        row.insert(&tx)?;
        tx.commit()?;

        Ok(Some(RawBaselineSwitch { previous, current, updated, uncovered: uncovered as usize }))
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };

    let previous = raw
      .previous
      .map(RawVersion::into_version)
      .transpose()?
      .map(|mut v| {
        v.is_baseline = v.version_id == version_id;
        v
      });
    let mut current = raw.current.into_version()?;
    current.is_baseline = true;

    Ok(Some((
      BaselineChange {
        previous,
        current,
        paragraphs_updated: raw.updated,
        paragraphs_uncovered: raw.uncovered,
      },
      record,
    )))
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn append_comparison(&self, input: NewComparison) -> Result<ComparisonRecord> {
    let (record, row) = ComparisonRow::build(input)?;

    self
      .conn
      .call(move |conn| {
        row.insert(conn)?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_comparisons(&self, book_id: Uuid) -> Result<Vec<ComparisonRecord>> {
    let id_str = encode_uuid(book_id);

    let raws: Vec<RawComparison> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPARISON_COLUMNS} FROM comparisons
           WHERE book_id = ?1 ORDER BY comparison_date, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComparison::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComparison::into_record).collect()
  }

  async fn amend_comparison_notes(
    &self,
    comparison_id: Uuid,
    notes:         Option<String>,
  ) -> Result<Option<ComparisonRecord>> {
    let id_str = encode_uuid(comparison_id);

    let raw: Option<RawComparison> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE comparisons SET notes = ?2 WHERE comparison_id = ?1",
          rusqlite::params![id_str, notes],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {COMPARISON_COLUMNS} FROM comparisons WHERE comparison_id = ?1"),
          rusqlite::params![id_str],
          RawComparison::from_row,
        )?))
      })
      .await?;

    raw.map(RawComparison::into_record).transpose()
  }
}
