//! Core types and trait definitions for the Folio change tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the domain model, the pure text algorithms (word diff, paragraph
//! reconciliation, reference codes, manual-import checks) and the
//! [`store::BookStore`] abstraction that storage backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod book;
pub mod diff;
pub mod error;
pub mod incoming;
pub mod ledger;
pub mod manual;
pub mod reconcile;
pub mod refcode;
pub mod store;
pub mod version;

pub use error::{Error, Result};
