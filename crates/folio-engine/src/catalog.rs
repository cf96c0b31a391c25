//! Book-code → external-ID cache for the remote catalog.
//!
//! The cache is an explicit service: it is filled by a catalog-sync event
//! ([`CatalogCache::replace`]), expires after a fixed TTL, and can be cleared
//! on demand. Once stale, lookups miss until the next sync.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::RwLock, time::Instant};

#[derive(Debug, Default)]
struct CatalogState {
  entries:        HashMap<String, String>,
  last_refreshed: Option<Instant>,
}

#[derive(Debug)]
pub struct CatalogCache {
  state: RwLock<CatalogState>,
  ttl:   Duration,
}

impl CatalogCache {
  pub fn new(ttl: Duration) -> Self {
    Self { state: RwLock::new(CatalogState::default()), ttl }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  /// The external ID for `code`, if the cache is fresh and knows it.
  pub async fn resolve(&self, code: &str) -> Option<String> {
    let state = self.state.read().await;
    if !Self::fresh(&state, self.ttl) {
      return None;
    }
    state.entries.get(code).cloned()
  }

  /// Replace every entry and restamp the cache. Returns the entry count.
  pub async fn replace(&self, entries: HashMap<String, String>) -> usize {
    let mut state = self.state.write().await;
    state.entries = entries;
    state.last_refreshed = Some(Instant::now());
    tracing::info!(entries = state.entries.len(), "catalog cache refreshed");
    state.entries.len()
  }

  pub async fn invalidate(&self) {
    let mut state = self.state.write().await;
    state.entries.clear();
    state.last_refreshed = None;
    tracing::info!("catalog cache invalidated");
  }

  pub async fn is_fresh(&self) -> bool { Self::fresh(&*self.state.read().await, self.ttl) }

  fn fresh(state: &CatalogState, ttl: Duration) -> bool {
    state.last_refreshed.is_some_and(|at| at.elapsed() < ttl)
  }
}
