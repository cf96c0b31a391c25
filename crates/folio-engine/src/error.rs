//! Error type for `folio-engine`.

use folio_core::manual::AssignmentError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] folio_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),

  #[error("book not found: {0}")]
  BookNotFound(Uuid),

  #[error("chapter not found: {0}")]
  ChapterNotFound(Uuid),

  #[error("paragraph not found: {0}")]
  ParagraphNotFound(Uuid),

  #[error("version {0} not found for this book")]
  VersionNotFound(Uuid),

  #[error("comparison not found: {0}")]
  ComparisonNotFound(Uuid),

  #[error("incoming content has no paragraphs")]
  EmptyBook,

  #[error("a book with code {0:?} already exists")]
  DuplicateBookCode(String),

  #[error("a comparison is already in progress for book {0}")]
  ComparisonInProgress(Uuid),

  #[error("confirmation {given:?} does not match book code {expected:?}")]
  ConfirmationMismatch { expected: String, given: String },

  #[error("{} code assignment error(s)", .0.len())]
  Validation(Vec<AssignmentError>),
}

impl Error {
  /// Wrap a backend error, lifting a duplicate-code rejection out of its
  /// source chain so callers can report it as a conflict.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = cause {
      if let Some(folio_core::Error::DuplicateBookCode(code)) =
        e.downcast_ref::<folio_core::Error>()
      {
        return Error::DuplicateBookCode(code.clone());
      }
      cause = e.source();
    }
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
