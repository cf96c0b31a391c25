//! Word-level diffing of paragraph texts.
//!
//! Uses the `similar` crate (Myers diff) over word and whitespace tokens, so
//! segment texts reassemble both inputs exactly.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
  Equal,
  Insert,
  Delete,
}

/// A run of text with a single edit kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
  pub kind: SegmentKind,
  pub text: String,
}

impl DiffSegment {
  fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
    Self { kind, text: text.into() }
  }
}

/// Compute the word-level edit script turning `old` into `new`.
///
/// Adjacent tokens of the same kind are merged into one segment.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffSegment> {
  if old == new {
    return if old.is_empty() {
      Vec::new()
    } else {
      vec![DiffSegment::new(SegmentKind::Equal, old)]
    };
  }
  if old.is_empty() {
    return vec![DiffSegment::new(SegmentKind::Insert, new)];
  }
  if new.is_empty() {
    return vec![DiffSegment::new(SegmentKind::Delete, old)];
  }

  let diff = TextDiff::from_words(old, new);
  let mut segments: Vec<DiffSegment> = Vec::new();

  for change in diff.iter_all_changes() {
    let kind = match change.tag() {
      ChangeTag::Equal => SegmentKind::Equal,
      ChangeTag::Insert => SegmentKind::Insert,
      ChangeTag::Delete => SegmentKind::Delete,
    };
    match segments.last_mut() {
      Some(last) if last.kind == kind => last.text.push_str(change.value()),
      _ => segments.push(DiffSegment::new(kind, change.value())),
    }
  }

  segments
}

/// Reassemble the old side (equal + delete segments).
pub fn old_side(segments: &[DiffSegment]) -> String {
  segments
    .iter()
    .filter(|s| s.kind != SegmentKind::Insert)
    .map(|s| s.text.as_str())
    .collect()
}

/// Reassemble the new side (equal + insert segments).
pub fn new_side(segments: &[DiffSegment]) -> String {
  segments
    .iter()
    .filter(|s| s.kind != SegmentKind::Delete)
    .map(|s| s.text.as_str())
    .collect()
}

/// Word counts for a rendered diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
  pub words_inserted: usize,
  pub words_deleted:  usize,
}

impl DiffStats {
  pub fn from_segments(segments: &[DiffSegment]) -> Self {
    segments.iter().fold(Self::default(), |mut acc, s| {
      let words = s.text.split_whitespace().count();
      match s.kind {
        SegmentKind::Insert => acc.words_inserted += words,
        SegmentKind::Delete => acc.words_deleted += words,
        SegmentKind::Equal => {}
      }
      acc
    })
  }
}
