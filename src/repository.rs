//! Catalog repository: reconciles the remote catalog with the local cache.
//!
//! Every read goes through [`CatalogRepository::fetch`] with an explicit
//! [`FetchPolicy`]:
//!
//! ```text
//! RemoteFirst                          CacheFirst
//! ───────────                          ──────────
//! remote ──ok──▶ write-through ──▶ ok  cache ──non-empty──▶ ok
//!   │                                    │
//!   ├─cancelled──▶ cancelled             └─empty──▶ remote ──err──▶ err
//!   │                                                 │
//!   └─err──▶ cache ──non-empty──▶ ok (stale)          └─ok──▶ upsert ids not yet cached ──▶ ok
//!              └─empty──▶ original remote err
//! ```
//!
//! Single lookups, "popular", related games and search are remote-first;
//! category browsing (genre, platform, developer, year) is cache-first.
//! The cache-first path never refreshes records it already holds.
//!
//! Once the remote has answered, cache failures are only logged: the remote
//! records are returned either way.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gamerteca_core::error::CatalogError;
use gamerteca_core::models::CatalogRecord;
use gamerteca_core::query::{CatalogQuery, Category};
use gamerteca_core::store::CacheStore;

use crate::source::CatalogSource;

/// Which side of the repository answers first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Ask the remote; write through on success, fall back to the cache on
    /// failure.
    RemoteFirst,
    /// Serve from the cache; only an empty cache result goes remote, and
    /// only ids not already cached are written.
    CacheFirst,
}

pub struct CatalogRepository {
    source: Arc<dyn CatalogSource>,
    cache: Arc<dyn CacheStore>,
    page_size: usize,
}

impl CatalogRepository {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        cache: Arc<dyn CacheStore>,
        page_size: usize,
    ) -> Self {
        Self {
            source,
            cache,
            page_size: page_size.max(1),
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Run `query` under `policy`. An empty id list answers empty without
    /// touching either side.
    pub async fn fetch(
        &self,
        query: &CatalogQuery,
        policy: FetchPolicy,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        if let CatalogQuery::ByIds(ids) = query {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
        }
        match policy {
            FetchPolicy::RemoteFirst => self.remote_first(query, cancel).await,
            FetchPolicy::CacheFirst => self.cache_first(query, cancel).await,
        }
    }

    async fn remote_first(
        &self,
        query: &CatalogQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let err = match self.source.fetch(query, self.page_size, 0, cancel).await {
            Ok(records) => {
                if let Err(e) = self.cache.upsert_many(&records).await {
                    warn!(
                        query = %query.describe(),
                        error = %format!("{:#}", e),
                        "cache write-through failed"
                    );
                } else {
                    debug!(
                        query = %query.describe(),
                        count = records.len(),
                        "cached remote result"
                    );
                }
                return Ok(records);
            }
            Err(CatalogError::Cancelled) => return Err(CatalogError::Cancelled),
            Err(err) => err,
        };

        match self.read_cache(query).await {
            Ok(cached) if !cached.is_empty() => {
                warn!(
                    query = %query.describe(),
                    error = %err,
                    count = cached.len(),
                    "remote fetch failed, serving cached records"
                );
                Ok(cached)
            }
            Ok(_) => Err(err),
            Err(cache_err) => {
                warn!(
                    query = %query.describe(),
                    error = %format!("{:#}", cache_err),
                    "cache fallback failed"
                );
                Err(err)
            }
        }
    }

    async fn cache_first(
        &self,
        query: &CatalogQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let cached = self.read_cache(query).await?;
        if !cached.is_empty() {
            debug!(query = %query.describe(), count = cached.len(), "served from cache");
            return Ok(cached);
        }

        let remote = self.source.fetch(query, self.page_size, 0, cancel).await?;
        if remote.is_empty() {
            return Ok(remote);
        }

        let known = match self.cache.cached_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(
                    query = %query.describe(),
                    error = %format!("{:#}", e),
                    "cache id lookup failed, skipping merge"
                );
                return Ok(remote);
            }
        };
        let fresh: Vec<CatalogRecord> = remote
            .iter()
            .filter(|r| !known.contains(&r.id))
            .cloned()
            .collect();
        if !fresh.is_empty() {
            if let Err(e) = self.cache.upsert_many(&fresh).await {
                warn!(query = %query.describe(), error = %format!("{:#}", e), "cache merge failed");
            } else {
                debug!(
                    query = %query.describe(),
                    new = fresh.len(),
                    skipped = remote.len() - fresh.len(),
                    "merged remote result into cache"
                );
            }
        }
        Ok(remote)
    }

    /// The cache-side answer for a query.
    async fn read_cache(&self, query: &CatalogQuery) -> anyhow::Result<Vec<CatalogRecord>> {
        match query {
            CatalogQuery::Popular => self.cache.get_recent(self.page_size).await,
            CatalogQuery::ById(id) => Ok(self.cache.get_by_id(*id).await?.into_iter().collect()),
            CatalogQuery::ByIds(ids) => {
                let mut found = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(record) = self.cache.get_by_id(*id).await? {
                        found.push(record);
                    }
                }
                Ok(found)
            }
            CatalogQuery::ByCategory(category) => {
                self.cache.find_by_category(category, self.page_size).await
            }
            CatalogQuery::Search(text) => self.cache.search_by_name(text, self.page_size).await,
        }
    }

    // ── Named operations ───────────────────────────────────────────────

    pub async fn get_record_by_id(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<CatalogRecord, CatalogError> {
        self.fetch(&CatalogQuery::ById(id), FetchPolicy::RemoteFirst, cancel)
            .await?
            .into_iter()
            .next()
            .ok_or(CatalogError::NotFound(id))
    }

    /// Popular games. Without `force_refresh` a warm cache answers directly
    /// with its most recent records.
    pub async fn get_popular(
        &self,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        if !force_refresh && self.cache.count().await? > 0 {
            info!("serving popular games from cache");
            return Ok(self.cache.get_recent(self.page_size).await?);
        }
        self.fetch(&CatalogQuery::Popular, FetchPolicy::RemoteFirst, cancel)
            .await
    }

    pub async fn get_by_category(
        &self,
        category: Category,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.fetch(
            &CatalogQuery::ByCategory(category),
            FetchPolicy::CacheFirst,
            cancel,
        )
        .await
    }

    pub async fn search(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(
            &CatalogQuery::Search(text.to_string()),
            FetchPolicy::RemoteFirst,
            cancel,
        )
        .await
    }

    /// Games related to `id`, in the order the record lists them.
    pub async fn get_related(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let record = self.get_record_by_id(id, cancel).await?;
        if record.related_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut related = self
            .fetch(
                &CatalogQuery::ByIds(record.related_ids.clone()),
                FetchPolicy::RemoteFirst,
                cancel,
            )
            .await?;
        let position = |r: &CatalogRecord| record.related_ids.iter().position(|x| *x == r.id);
        related.sort_by_key(|r| position(r));
        Ok(related)
    }

    /// Most recently cached records; never touches the remote.
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<CatalogRecord>, CatalogError> {
        Ok(self.cache.get_recent(limit).await?)
    }

    pub async fn clear_cache(&self) -> Result<(), CatalogError> {
        self.cache.clear().await?;
        info!("catalog cache cleared");
        Ok(())
    }
}
