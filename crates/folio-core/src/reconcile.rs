//! Paragraph reconciliation: has a stored paragraph changed, and what history
//! entry records the change?
//!
//! Pure decision logic. Persisting the outcome is the store's job
//! ([`crate::store::BookStore::apply_change`]) and counting it is the
//! engine's.

use chrono::{DateTime, Utc};

use crate::book::{ChangeEntry, Paragraph};

/// The result of comparing one stored paragraph with incoming text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
  pub changed: bool,
  /// Present iff `changed`.
  pub entry:   Option<ChangeEntry>,
}

/// Whitespace normalisation applied before the equality check.
pub fn normalize(text: &str) -> &str { text.trim() }

/// Compare `stored.latest_text` with `incoming` after trimming both.
///
/// History tracks successive states: the entry's `old_text` is the current
/// `latest_text`, not the baseline. Texts are recorded untrimmed so the
/// chain replays exactly.
pub fn reconcile(
  stored: &Paragraph,
  incoming: &str,
  at: DateTime<Utc>,
) -> Reconciliation {
  if normalize(&stored.latest_text) == normalize(incoming) {
    return Reconciliation { changed: false, entry: None };
  }

  Reconciliation {
    changed: true,
    entry:   Some(ChangeEntry {
      date:     at,
      old_text: stored.latest_text.clone(),
      new_text: incoming.to_owned(),
    }),
  }
}
