//! Local catalog cache abstraction.
//!
//! The [`CacheStore`] trait is the durable, id-keyed table of
//! [`CatalogRecord`]s that the repository writes through to and falls back
//! on. Implementations: SQLite (in the `gamerteca` crate) and
//! [`memory::InMemoryCacheStore`].
//!
//! Every operation is total: a batch upsert either fully succeeds or fails
//! as a unit. Writes replace on conflict by id; no field-level merge is
//! attempted, and no URL rewriting happens here.

pub mod memory;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::CatalogRecord;
use crate::query::Category;

/// Abstract catalog cache.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert_many`](CacheStore::upsert_many) | Replace-on-conflict batch write |
/// | [`upsert_one`](CacheStore::upsert_one) | Replace-on-conflict single write |
/// | [`get_by_id`](CacheStore::get_by_id) | Point lookup, `None` when absent |
/// | [`get_all`](CacheStore::get_all) | Every record, ordered by id |
/// | [`get_recent`](CacheStore::get_recent) | Most recently written first |
/// | [`cached_ids`](CacheStore::cached_ids) | Id set for incremental merges |
/// | [`find_by_category`](CacheStore::find_by_category) | Genre/platform/developer/year filter |
/// | [`search_by_name`](CacheStore::search_by_name) | Case-insensitive name substring |
/// | [`count`](CacheStore::count) | Number of records |
/// | [`clear`](CacheStore::clear) | Delete everything |
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn upsert_many(&self, records: &[CatalogRecord]) -> Result<()>;

    async fn upsert_one(&self, record: &CatalogRecord) -> Result<()>;

    async fn get_by_id(&self, id: i64) -> Result<Option<CatalogRecord>>;

    async fn get_all(&self) -> Result<Vec<CatalogRecord>>;

    /// Up to `limit` records, newest write first. Ties are broken by
    /// insertion order (later first).
    async fn get_recent(&self, limit: usize) -> Result<Vec<CatalogRecord>>;

    async fn cached_ids(&self) -> Result<HashSet<i64>>;

    /// Name categories match case-insensitively against the record's
    /// list field; [`Category::Year`] matches the UTC release year.
    async fn find_by_category(&self, category: &Category, limit: usize)
        -> Result<Vec<CatalogRecord>>;

    async fn search_by_name(&self, text: &str, limit: usize) -> Result<Vec<CatalogRecord>>;

    async fn count(&self) -> Result<usize>;

    async fn clear(&self) -> Result<()>;
}

/// Shared predicate for category membership, used by stores that filter
/// in Rust rather than in SQL.
pub fn matches_category(record: &CatalogRecord, category: &Category) -> bool {
    fn contains(values: &[String], needle: &str) -> bool {
        values.iter().any(|v| v.eq_ignore_ascii_case(needle))
    }
    match category {
        Category::Genre(name) => contains(&record.genres, name),
        Category::Platform(name) => contains(&record.platforms, name),
        Category::Developer(name) => contains(&record.developers, name),
        Category::Year(year) => record.release_year() == Some(*year),
    }
}
