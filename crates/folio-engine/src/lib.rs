//! Change-detection engine for Folio.
//!
//! [`Tracker`] orchestrates every mutating workflow over any
//! [`folio_core::store::BookStore`]: initial imports, periodic rechecks,
//! baseline switches, manual historical imports and test seeds. The lower
//! level pieces are public so they can be driven individually:
//!
//! - [`align`] matches incoming chapters and paragraphs against the store,
//! - [`counters`] folds an alignment into the chapter and book counters,
//! - [`ledger`] turns an alignment into a comparison record,
//! - [`locks`] serializes runs per book,
//! - [`catalog`] caches the external book catalog.

pub mod align;
pub mod catalog;
pub mod counters;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod tracker;

pub use error::{Error, Result};
pub use tracker::{Tracker, TrackerConfig};
