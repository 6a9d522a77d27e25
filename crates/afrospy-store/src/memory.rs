//! In-process [`AdSink`] used by `--dry-run` and by tests.

use std::sync::RwLock;

use afrospy_core::AdRecord;
use async_trait::async_trait;

use crate::{AdSink, StoreError};

/// Rows kept in first-insertion order; an upsert on an existing key
/// replaces the row in place.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<AdRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored rows.
    #[must_use]
    pub fn records(&self) -> Vec<AdRecord> {
        self.rows
            .read()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, page_name: &str, ad_copy: &str) -> Option<AdRecord> {
        self.rows.read().ok().and_then(|rows| {
            rows.iter()
                .find(|r| r.conflict_key() == (page_name, ad_copy))
                .cloned()
        })
    }
}

#[async_trait]
impl AdSink for MemoryStore {
    async fn upsert_ad(&self, ad: &AdRecord) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match rows.iter_mut().find(|r| r.conflict_key() == ad.conflict_key()) {
            Some(existing) => *existing = ad.clone(),
            None => rows.push(ad.clone()),
        }
        Ok(())
    }
}
