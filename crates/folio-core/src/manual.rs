//! Primitives for importing a historical edition by hand.
//!
//! An administrator uploads the plain text of an older edition, each
//! uploaded paragraph is assigned a reference code (with similarity-based
//! suggestions), and the assignment list is validated before any version is
//! written.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::refcode::{MISSING_CODE, RefCode};

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Split uploaded plain text into paragraphs on blank lines.
pub fn extract_paragraphs(content: &str) -> Vec<String> {
  let mut paragraphs = Vec::new();
  let mut current: Vec<&str> = Vec::new();

  for line in content.lines() {
    if line.trim().is_empty() {
      if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_owned());
        current.clear();
      }
    } else {
      current.push(line);
    }
  }
  if !current.is_empty() {
    paragraphs.push(current.join("\n").trim().to_owned());
  }

  paragraphs.retain(|p| !p.is_empty());
  paragraphs
}

// ─── Structural comparison ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fit", content = "count", rename_all = "snake_case")]
pub enum StructuralFit {
  Exact,
  /// The upload has this many more paragraphs than the store.
  Extra(usize),
  /// The upload has this many fewer paragraphs than the store.
  Missing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralComparison {
  pub uploaded_count: usize,
  pub stored_count:   usize,
  pub fit:            StructuralFit,
}

pub fn compare_structure(uploaded_count: usize, stored_count: usize) -> StructuralComparison {
  let fit = match uploaded_count.cmp(&stored_count) {
    std::cmp::Ordering::Equal => StructuralFit::Exact,
    std::cmp::Ordering::Greater => StructuralFit::Extra(uploaded_count - stored_count),
    std::cmp::Ordering::Less => StructuralFit::Missing(stored_count - uploaded_count),
  };
  StructuralComparison { uploaded_count, stored_count, fit }
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

/// Minimum similarity for a suggestion to be proposed as the best match.
pub const BEST_MATCH_THRESHOLD: f64 = 0.7;

/// Number of ranked suggestions returned per uploaded paragraph.
pub const MAX_SUGGESTIONS: usize = 5;

/// A stored paragraph that an upload may be matched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeCandidate {
  pub code: String,
  pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSuggestion {
  pub code:       String,
  /// `1 - levenshtein / max_len`, in `[0, 1]`.
  pub similarity: f64,
  pub text:       String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphMatch {
  pub index:       usize,
  pub best_match:  Option<CodeSuggestion>,
  pub suggestions: Vec<CodeSuggestion>,
}

/// Lower-case and collapse whitespace runs.
fn normalize_for_match(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
  let mut prev: Vec<usize> = (0..=b.len()).collect();
  let mut curr = vec![0; b.len() + 1];

  for (i, ca) in a.iter().enumerate() {
    curr[0] = i + 1;
    for (j, cb) in b.iter().enumerate() {
      let cost = usize::from(ca != cb);
      curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
    }
    std::mem::swap(&mut prev, &mut curr);
  }

  prev[b.len()]
}

/// Edit-distance similarity of two texts after normalisation.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
  let a: Vec<char> = normalize_for_match(a).chars().collect();
  let b: Vec<char> = normalize_for_match(b).chars().collect();
  let max_len = a.len().max(b.len());
  if max_len == 0 {
    return 1.0;
  }
  1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// Rank `candidates` for every uploaded paragraph.
pub fn suggest_codes(uploaded: &[String], candidates: &[CodeCandidate]) -> Vec<ParagraphMatch> {
  uploaded
    .iter()
    .enumerate()
    .map(|(index, text)| {
      let mut ranked: Vec<CodeSuggestion> = candidates
        .iter()
        .map(|c| CodeSuggestion {
          code:       c.code.clone(),
          similarity: similarity_ratio(text, &c.text),
          text:       c.text.clone(),
        })
        .collect();
      ranked.sort_by(|x, y| y.similarity.total_cmp(&x.similarity));
      ranked.truncate(MAX_SUGGESTIONS);

      let best_match = ranked
        .first()
        .filter(|s| s.similarity > BEST_MATCH_THRESHOLD)
        .cloned();

      ParagraphMatch { index, best_match, suggestions: ranked }
    })
    .collect()
}

// ─── Assignment & validation ─────────────────────────────────────────────────

/// One uploaded paragraph and the code assigned to it.
///
/// `assigned_code` is `None` while the assignment is still pending, and
/// [`MISSING_CODE`] when the paragraph deliberately has no stored
/// counterpart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeAssignment {
  pub index:         usize,
  pub text:          String,
  pub assigned_code: Option<String>,
}

impl CodeAssignment {
  /// The assigned code when it names a real paragraph.
  pub fn matched_code(&self) -> Option<&str> {
    self.assigned_code.as_deref().filter(|c| !RefCode::is_missing(c))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentErrorKind {
  Format,
  Sequence,
  Duplicate,
  NonExistent,
  MissingRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentError {
  pub kind:    AssignmentErrorKind,
  pub message: String,
  /// 0-based position within the assignment list.
  pub index:   usize,
  pub code:    Option<String>,
}

impl AssignmentError {
  fn new(kind: AssignmentErrorKind, index: usize, code: Option<&str>, message: String) -> Self {
    Self { kind, message, index, code: code.map(str::to_owned) }
  }
}

/// Check a full assignment list against the target book.
///
/// Every non-sentinel code must be well-formed, carry `book_code` as its
/// prefix, exist in `existing_codes`, appear once, and directly follow the
/// previous code when both fall in the same chapter. A [`MISSING_CODE`]
/// entry breaks the sequence, so the next code may resume anywhere.
pub fn validate_assignments(
  assignments: &[CodeAssignment],
  book_code: &str,
  existing_codes: &HashSet<String>,
) -> Vec<AssignmentError> {
  use AssignmentErrorKind::*;

  let mut errors = Vec::new();
  let mut seen: HashMap<&str, usize> = HashMap::new();
  let mut last: Option<(RefCode, &str)> = None;

  for (pos, assignment) in assignments.iter().enumerate() {
    let n = pos + 1;
    let Some(code) = assignment.assigned_code.as_deref() else {
      errors.push(AssignmentError::new(
        MissingRequired,
        pos,
        None,
        format!("paragraph {n} has no assigned code"),
      ));
      continue;
    };

    if RefCode::is_missing(code) {
      last = None;
      continue;
    }

    let Ok(parsed) = code.parse::<RefCode>() else {
      errors.push(AssignmentError::new(
        Format,
        pos,
        Some(code),
        format!("invalid code in paragraph {n}: {code:?}"),
      ));
      continue;
    };

    if parsed.book_code != book_code {
      errors.push(AssignmentError::new(
        Format,
        pos,
        Some(code),
        format!("code {code:?} does not belong to book {book_code}"),
      ));
      continue;
    }

    if !existing_codes.contains(code) {
      errors.push(AssignmentError::new(
        NonExistent,
        pos,
        Some(code),
        format!("code {code:?} does not exist in the store"),
      ));
      continue;
    }

    if let Some(first) = seen.get(code) {
      errors.push(AssignmentError::new(
        Duplicate,
        pos,
        Some(code),
        format!("code {code:?} is assigned twice (paragraphs {} and {n})", first + 1),
      ));
      continue;
    }
    seen.insert(code, pos);

    if let Some((prev, prev_code)) = &last
      && prev.chapter == parsed.chapter
      && !parsed.follows(prev)
    {
      errors.push(AssignmentError::new(
        Sequence,
        pos,
        Some(code),
        match prev.successor() {
          Some(next) => {
            format!("sequence gap: after {prev_code:?} expected \"{next}\", found {code:?}")
          }
          None => format!("sequence gap: nothing can follow {prev_code:?}, found {code:?}"),
        },
      ));
    }

    last = Some((parsed, code));
  }

  errors
}

// ─── Import request ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualVersionKind {
  /// Recorded in the version history only.
  #[default]
  Regular,
  /// Becomes the new baseline; its texts replace `base_text`.
  PhysicalBaseline,
}

/// A validated-on-submit historical import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualImport {
  #[serde(default)]
  pub kind:         ManualVersionKind,
  pub edition_date: Option<NaiveDate>,
  pub notes:        Option<String>,
  pub assignments:  Vec<CodeAssignment>,
}

impl ManualImport {
  /// Assignments that name a real paragraph, in upload order.
  pub fn matched(&self) -> impl Iterator<Item = (&str, &CodeAssignment)> {
    self
      .assignments
      .iter()
      .filter_map(|a| a.matched_code().map(|c| (c, a)))
  }
}

/// An assignment explicitly marked as having no stored counterpart.
pub fn missing_assignment(index: usize, text: impl Into<String>) -> CodeAssignment {
  CodeAssignment { index, text: text.into(), assigned_code: Some(MISSING_CODE.to_owned()) }
}
