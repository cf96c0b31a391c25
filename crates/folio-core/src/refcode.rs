//! Reference codes, the stable identity of a paragraph across versions.
//!
//! Format: `<BOOK> <chapter>.<paragraph>`, e.g. `DTG 46.1`.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Sentinel assigned to an uploaded paragraph that has no stored counterpart.
pub const MISSING_CODE: &str = "FALTA";

static REFCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([A-Z]{2,5}) (\d+)\.(\d+)$").expect("reference code pattern")
});

/// A parsed reference code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefCode {
  pub book_code: String,
  pub chapter:   u32,
  pub paragraph: u32,
}

impl RefCode {
  /// `true` if `code` is the "not matched" sentinel.
  pub fn is_missing(code: &str) -> bool { code == MISSING_CODE }

  /// The code right after this one in the same chapter, if representable.
  pub fn successor(&self) -> Option<RefCode> {
    let paragraph = self.paragraph.checked_add(1)?;
    Some(RefCode { paragraph, ..self.clone() })
  }

  /// `true` if this code directly follows `prev` within the same chapter.
  pub fn follows(&self, prev: &RefCode) -> bool {
    self.chapter == prev.chapter && prev.paragraph.checked_add(1) == Some(self.paragraph)
  }
}

impl FromStr for RefCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || Error::InvalidRefCode(s.to_owned());
    let caps = REFCODE_RE.captures(s).ok_or_else(invalid)?;
    Ok(Self {
      book_code: caps[1].to_owned(),
      chapter:   caps[2].parse().map_err(|_| invalid())?,
      paragraph: caps[3].parse().map_err(|_| invalid())?,
    })
  }
}

impl fmt::Display for RefCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}.{}", self.book_code, self.chapter, self.paragraph)
  }
}
