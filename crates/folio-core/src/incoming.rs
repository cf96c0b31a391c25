//! The structure handed over by content producers.
//!
//! Scraper, API client and manual upload all funnel into these types; the
//! reconciliation code never cares which one produced them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingBook {
  pub title:    String,
  pub code:     String,
  #[serde(default)]
  pub chapters: Vec<IncomingChapter>,
}

impl IncomingBook {
  /// Total number of paragraphs across all chapters.
  pub fn paragraph_count(&self) -> usize {
    self.chapters.iter().map(|c| c.paragraphs.len()).sum()
  }

  /// A book with no chapters, or only empty chapters, carries no structural
  /// content to import or compare.
  pub fn is_empty(&self) -> bool { self.paragraph_count() == 0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingChapter {
  pub number:     u32,
  #[serde(default)]
  pub title:      String,
  #[serde(default)]
  pub paragraphs: Vec<IncomingParagraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingParagraph {
  pub content: String,
  #[serde(default)]
  pub refcode: Option<String>,
}

impl IncomingParagraph {
  /// The reference code, if present and non-blank.
  pub fn refcode(&self) -> Option<&str> {
    self.refcode.as_deref().map(str::trim).filter(|c| !c.is_empty())
  }
}
