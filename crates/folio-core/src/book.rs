//! The stored book hierarchy: book → chapter → paragraph.
//!
//! Counters on books and chapters are accumulators. They only ever grow, one
//! comparison run at a time. Paragraph history is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Book ────────────────────────────────────────────────────────────────────

/// A tracked publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
  pub book_id:         Uuid,
  pub title:           String,
  /// Unique external code, e.g. `"DTG"`.
  pub code:            String,
  pub language:        String,
  /// Sum of every change detected across all comparison runs.
  pub total_changes:   u64,
  pub last_check_date: Option<DateTime<Utc>>,
  pub imported_at:     DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Input to [`crate::store::BookStore::insert_book`].
#[derive(Debug, Clone)]
pub struct NewBook {
  pub title:    String,
  pub code:     String,
  pub language: String,
}

// ─── Chapter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
  pub chapter_id:   Uuid,
  pub book_id:      Uuid,
  /// Sequence number; stable across versions and used as the join key.
  pub number:       u32,
  pub title:        String,
  pub change_count: u64,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChapter {
  pub book_id: Uuid,
  pub number:  u32,
  pub title:   String,
}

// ─── Change history ──────────────────────────────────────────────────────────

/// One detected modification of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
  pub date:     DateTime<Utc>,
  pub old_text: String,
  pub new_text: String,
}

/// The ordered, append-only modification log of a paragraph.
///
/// Persisted as a JSON document carrying its own schema version so that the
/// entry shape can evolve without silently misreading older rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeHistory {
  pub schema_version: u32,
  pub entries:        Vec<ChangeEntry>,
}

impl ChangeHistory {
  pub const SCHEMA_VERSION: u32 = 1;

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn push(&mut self, entry: ChangeEntry) { self.entries.push(entry); }

  pub fn last(&self) -> Option<&ChangeEntry> { self.entries.last() }

  /// Returns `true` when every entry starts from the text the previous entry
  /// left behind. `origin` is the text the paragraph held before the first
  /// recorded change.
  pub fn is_replayable_from(&self, origin: &str) -> bool {
    let mut current = origin;
    for entry in &self.entries {
      if entry.old_text != current {
        return false;
      }
      current = &entry.new_text;
    }
    true
  }

  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  pub fn from_json(s: &str) -> Result<Self> {
    let history: Self = serde_json::from_str(s)?;
    if history.schema_version != Self::SCHEMA_VERSION {
      return Err(Error::UnsupportedHistorySchema(history.schema_version));
    }
    Ok(history)
  }
}

impl Default for ChangeHistory {
  fn default() -> Self {
    Self { schema_version: Self::SCHEMA_VERSION, entries: Vec::new() }
  }
}

// ─── Paragraph ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
  pub paragraph_id:     Uuid,
  pub chapter_id:       Uuid,
  /// Position at creation time. Informational only; never a match key.
  pub paragraph_number: u32,
  /// Stable external reference code, e.g. `"DTG 46.1"`.
  pub refcode:          Option<String>,
  /// Text of the active baseline version.
  pub base_text:        String,
  /// Most recently observed text.
  pub latest_text:      String,
  pub has_changed:      bool,
  pub change_history:   ChangeHistory,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`crate::store::BookStore::insert_paragraph`].
///
/// New paragraphs always start unchanged: `base_text == latest_text` and an
/// empty history.
#[derive(Debug, Clone)]
pub struct NewParagraph {
  pub chapter_id:       Uuid,
  pub paragraph_number: u32,
  pub refcode:          Option<String>,
  pub text:             String,
}
