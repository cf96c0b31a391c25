//! Per-book run serialization.
//!
//! Mutating workflows on one book (rechecks, baseline switches, manual
//! imports, deletion) must not interleave. A run takes a [`BookGuard`]
//! before touching the store; a second run on the same book is refused
//! immediately rather than queued.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex, PoisonError},
};

use uuid::Uuid;

use crate::{Error, Result};

/// The set of books that currently have a run in progress.
#[derive(Debug, Clone, Default)]
pub struct BookLocks {
  held: Arc<Mutex<HashSet<Uuid>>>,
}

impl BookLocks {
  pub fn new() -> Self { Self::default() }

  /// Claim `book_id`, or fail with [`Error::ComparisonInProgress`] if another
  /// run holds it. The claim is released when the guard drops.
  pub fn try_acquire(&self, book_id: Uuid) -> Result<BookGuard> {
    let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
    if !held.insert(book_id) {
      return Err(Error::ComparisonInProgress(book_id));
    }
    Ok(BookGuard { held: Arc::clone(&self.held), book_id })
  }

  pub fn is_held(&self, book_id: Uuid) -> bool {
    self
      .held
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .contains(&book_id)
  }
}

/// RAII claim on one book.
#[derive(Debug)]
pub struct BookGuard {
  held:    Arc<Mutex<HashSet<Uuid>>>,
  book_id: Uuid,
}

impl BookGuard {
  pub fn book_id(&self) -> Uuid { self.book_id }
}

impl Drop for BookGuard {
  fn drop(&mut self) {
    self
      .held
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&self.book_id);
  }
}
