//! Error types for `folio-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("book not found: {0}")]
  BookNotFound(Uuid),

  #[error("chapter not found: {0}")]
  ChapterNotFound(Uuid),

  #[error("paragraph not found: {0}")]
  ParagraphNotFound(Uuid),

  #[error("version not found: {0}")]
  VersionNotFound(Uuid),

  #[error("comparison record not found: {0}")]
  ComparisonNotFound(Uuid),

  #[error("a book with code {0:?} already exists")]
  DuplicateBookCode(String),

  #[error("invalid reference code: {0:?}")]
  InvalidRefCode(String),

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("unsupported change history schema version {0}")]
  UnsupportedHistorySchema(u32),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
