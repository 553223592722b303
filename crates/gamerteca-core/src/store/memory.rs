//! In-memory [`CacheStore`] implementation for tests and ephemeral runs.
//!
//! Records live in a `HashMap` behind `std::sync::RwLock`. Recency is a
//! monotonic write sequence, so [`get_recent`](CacheStore::get_recent)
//! ordering is exact even when writes land in the same millisecond.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::CatalogRecord;
use crate::query::Category;

use super::{matches_category, CacheStore};

struct StoredRecord {
    record: CatalogRecord,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    records: HashMap<i64, StoredRecord>,
    next_seq: u64,
}

/// In-memory catalog cache.
#[derive(Default)]
pub struct InMemoryCacheStore {
    inner: RwLock<Inner>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by<F>(&self, mut filter: F, limit: Option<usize>) -> Vec<CatalogRecord>
    where
        F: FnMut(&CatalogRecord) -> bool,
    {
        let inner = self.inner.read().unwrap();
        let mut hits: Vec<&StoredRecord> = inner
            .records
            .values()
            .filter(|s| filter(&s.record))
            .collect();
        hits.sort_by_key(|s| s.record.id);
        hits.into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|s| s.record.clone())
            .collect()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn upsert_many(&self, records: &[CatalogRecord]) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        for record in records {
            inner.next_seq += 1;
            let seq = inner.next_seq;
            inner.records.insert(
                record.id,
                StoredRecord {
                    record: record.clone(),
                    seq,
                },
            );
        }
        Ok(())
    }

    async fn upsert_one(&self, record: &CatalogRecord) -> Result<()> {
        self.upsert_many(std::slice::from_ref(record)).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CatalogRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.get(&id).map(|s| s.record.clone()))
    }

    async fn get_all(&self) -> Result<Vec<CatalogRecord>> {
        Ok(self.sorted_by(|_| true, None))
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<CatalogRecord>> {
        let inner = self.inner.read().unwrap();
        let mut stored: Vec<&StoredRecord> = inner.records.values().collect();
        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(stored
            .into_iter()
            .take(limit)
            .map(|s| s.record.clone())
            .collect())
    }

    async fn cached_ids(&self) -> Result<HashSet<i64>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.keys().copied().collect())
    }

    async fn find_by_category(
        &self,
        category: &Category,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>> {
        Ok(self.sorted_by(|r| matches_category(r, category), Some(limit)))
    }

    async fn search_by_name(&self, text: &str, limit: usize) -> Result<Vec<CatalogRecord>> {
        // ASCII folding only, the same as SQLite's lower()
        let needle = text.to_ascii_lowercase();
        Ok(self.sorted_by(
            |r| r.name.to_ascii_lowercase().contains(&needle),
            Some(limit),
        ))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().unwrap().records.len())
    }

    async fn clear(&self) -> Result<()> {
        self.inner.write().unwrap().records.clear();
        Ok(())
    }
}
