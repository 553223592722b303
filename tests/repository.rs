//! Reconciliation tests for `CatalogRepository` against a scripted catalog
//! and a cache wrapper that records every read and write.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use gamerteca::repository::{CatalogRepository, FetchPolicy};
use gamerteca::source::CatalogSource;
use gamerteca_core::error::CatalogError;
use gamerteca_core::models::CatalogRecord;
use gamerteca_core::query::{CatalogQuery, Category};
use gamerteca_core::store::memory::InMemoryCacheStore;
use gamerteca_core::store::{matches_category, CacheStore};

// ─── Fakes ──────────────────────────────────────────────────────────

/// Remote catalog backed by a map. `fail_with` makes every call fail.
#[derive(Default)]
struct FakeCatalog {
    games: Mutex<BTreeMap<i64, CatalogRecord>>,
    fail_with: Mutex<Option<CatalogError>>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    fn with(records: Vec<CatalogRecord>) -> Arc<Self> {
        let fake = Self::default();
        {
            let mut games = fake.games.lock().unwrap();
            for r in records {
                games.insert(r.id, r);
            }
        }
        Arc::new(fake)
    }

    fn fail(&self, err: CatalogError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch(
        &self,
        query: &CatalogQuery,
        limit: usize,
        _offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        let games = self.games.lock().unwrap();
        let mut found: Vec<CatalogRecord> = match query {
            CatalogQuery::Popular => games.values().cloned().collect(),
            CatalogQuery::ById(id) => match games.get(id) {
                Some(r) => vec![r.clone()],
                None => return Err(CatalogError::NotFound(*id)),
            },
            // id order, not request order
            CatalogQuery::ByIds(ids) => games
                .values()
                .filter(|r| ids.contains(&r.id))
                .cloned()
                .collect(),
            CatalogQuery::ByCategory(category) => games
                .values()
                .filter(|r| matches_category(r, category))
                .cloned()
                .collect(),
            CatalogQuery::Search(text) => games
                .values()
                .filter(|r| r.name.to_lowercase().contains(&text.to_lowercase()))
                .cloned()
                .collect(),
        };
        found.truncate(limit);
        Ok(found)
    }
}

/// In-memory cache that counts reads and records the ids of each upsert.
#[derive(Default)]
struct RecordingCache {
    inner: InMemoryCacheStore,
    reads: AtomicUsize,
    upserts: Mutex<Vec<Vec<i64>>>,
    fail_writes: AtomicBool,
    fail_id_lookup: AtomicBool,
}

impl RecordingCache {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn upserts(&self) -> Vec<Vec<i64>> {
        self.upserts.lock().unwrap().clone()
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn upsert_many(&self, records: &[CatalogRecord]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.upserts
            .lock()
            .unwrap()
            .push(records.iter().map(|r| r.id).collect());
        self.inner.upsert_many(records).await
    }

    async fn upsert_one(&self, record: &CatalogRecord) -> Result<()> {
        self.upsert_many(std::slice::from_ref(record)).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CatalogRecord>> {
        self.read();
        self.inner.get_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<CatalogRecord>> {
        self.read();
        self.inner.get_all().await
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<CatalogRecord>> {
        self.read();
        self.inner.get_recent(limit).await
    }

    async fn cached_ids(&self) -> Result<HashSet<i64>> {
        if self.fail_id_lookup.load(Ordering::SeqCst) {
            anyhow::bail!("database is locked");
        }
        self.inner.cached_ids().await
    }

    async fn find_by_category(
        &self,
        category: &Category,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>> {
        self.read();
        self.inner.find_by_category(category, limit).await
    }

    async fn search_by_name(&self, text: &str, limit: usize) -> Result<Vec<CatalogRecord>> {
        self.read();
        self.inner.search_by_name(text, limit).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

fn game(id: i64, name: &str, genres: &[&str]) -> CatalogRecord {
    let mut r = CatalogRecord::named(id, name);
    r.genres = genres.iter().map(|g| g.to_string()).collect();
    r
}

fn setup(remote: Vec<CatalogRecord>) -> (Arc<FakeCatalog>, Arc<RecordingCache>, CatalogRepository) {
    let catalog = FakeCatalog::with(remote);
    let cache = Arc::new(RecordingCache::default());
    let repo = CatalogRepository::new(catalog.clone(), cache.clone(), 20);
    (catalog, cache, repo)
}

fn ids(records: &[CatalogRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

// ─── Remote first ───────────────────────────────────────────────────

#[tokio::test]
async fn test_remote_success_writes_through() {
    let (_catalog, cache, repo) = setup(vec![game(1, "Celeste", &["Platform"])]);
    let cancel = CancellationToken::new();

    let record = repo.get_record_by_id(1, &cancel).await.unwrap();
    assert_eq!(record.name, "Celeste");
    assert_eq!(cache.upserts(), vec![vec![1]]);
    assert_eq!(cache.inner.get_by_id(1).await.unwrap(), Some(record));
}

#[tokio::test]
async fn test_remote_failure_serves_stale_cache() {
    let (catalog, cache, repo) = setup(vec![]);
    cache
        .inner
        .upsert_one(&game(7, "Hades (cached)", &[]))
        .await
        .unwrap();
    catalog.fail(CatalogError::Transport("connection refused".into()));

    let record = repo
        .get_record_by_id(7, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(record.name, "Hades (cached)");
    assert_eq!(cache.reads(), 1);
}

#[tokio::test]
async fn test_remote_failure_with_empty_cache_returns_original_error() {
    let (catalog, _cache, repo) = setup(vec![]);
    let err = CatalogError::Remote {
        status: 503,
        body: "maintenance".into(),
    };
    catalog.fail(err.clone());

    let got = repo
        .fetch(&CatalogQuery::Popular, FetchPolicy::RemoteFirst, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(got, err);
}

#[tokio::test]
async fn test_not_found_without_cache_is_not_found() {
    let (_catalog, _cache, repo) = setup(vec![]);
    let err = repo
        .get_record_by_id(404, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::NotFound(404));
}

#[tokio::test]
async fn test_cancellation_never_reads_cache() {
    let (catalog, cache, repo) = setup(vec![]);
    cache.inner.upsert_one(&game(1, "Cached", &[])).await.unwrap();
    catalog.fail(CatalogError::Cancelled);

    let err = repo
        .get_record_by_id(1, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(cache.reads(), 0);
}

#[tokio::test]
async fn test_cancelled_token_short_circuits() {
    let (catalog, cache, repo) = setup(vec![game(1, "Celeste", &[])]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    for policy in [FetchPolicy::RemoteFirst, FetchPolicy::CacheFirst] {
        let err = repo
            .fetch(&CatalogQuery::ById(1), policy, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::Cancelled);
    }
    assert_eq!(catalog.calls(), 0);
    assert_eq!(cache.reads(), 0);
}

#[tokio::test]
async fn test_write_through_failure_still_returns_remote_value() {
    let (_catalog, cache, repo) = setup(vec![game(3, "Tunic", &[])]);
    cache.fail_writes.store(true, Ordering::SeqCst);

    let record = repo
        .get_record_by_id(3, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(record.name, "Tunic");
    assert_eq!(cache.inner.count().await.unwrap(), 0);
}

// ─── Cache first ────────────────────────────────────────────────────

#[tokio::test]
async fn test_category_served_from_cache_without_remote() {
    let (catalog, cache, repo) = setup(vec![game(9, "Remote Indie", &["Indie"])]);
    cache
        .inner
        .upsert_one(&game(4, "Cached Indie", &["indie"]))
        .await
        .unwrap();

    let records = repo
        .get_by_category(Category::Genre("Indie".into()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids(&records), vec![4]);
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_category_merge_writes_only_new_ids() {
    let (_catalog, cache, repo) = setup(vec![
        game(2, "Two (remote)", &["Indie"]),
        game(3, "Three", &["Indie"]),
    ]);
    cache
        .inner
        .upsert_many(&[game(1, "One", &["Puzzle"]), game(2, "Two (cached)", &["Puzzle"])])
        .await
        .unwrap();

    let records = repo
        .get_by_category(Category::Genre("Indie".into()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(ids(&records), vec![2, 3]);
    assert_eq!(cache.upserts(), vec![vec![3]]);
    let cached: Vec<i64> = ids(&cache.inner.get_all().await.unwrap());
    assert_eq!(cached, vec![1, 2, 3]);
    // the already-cached record is not refreshed
    let two = cache.inner.get_by_id(2).await.unwrap().unwrap();
    assert_eq!(two.name, "Two (cached)");
}

#[tokio::test]
async fn test_category_merge_id_lookup_failure_keeps_remote_records() {
    let (_catalog, cache, repo) = setup(vec![game(3, "Three", &["Indie"])]);
    cache.fail_id_lookup.store(true, Ordering::SeqCst);

    let records = repo
        .get_by_category(Category::Genre("Indie".into()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids(&records), vec![3]);
    assert!(cache.upserts().is_empty());
}

#[tokio::test]
async fn test_cache_first_remote_error_propagates() {
    let (catalog, _cache, repo) = setup(vec![]);
    catalog.fail(CatalogError::Transport("dns".into()));

    let err = repo
        .get_by_category(Category::Year(2020), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::Transport("dns".into()));
}

#[tokio::test]
async fn test_cache_first_empty_remote_writes_nothing() {
    let (_catalog, cache, repo) = setup(vec![game(1, "Doom", &["Shooter"])]);
    let records = repo
        .get_by_category(Category::Genre("Racing".into()), &CancellationToken::new())
        .await
        .unwrap();
    assert!(records.is_empty());
    assert!(cache.upserts().is_empty());
}

// ─── Named operations ───────────────────────────────────────────────

#[tokio::test]
async fn test_popular_warm_cache_skips_remote() {
    let (catalog, cache, repo) = setup(vec![game(1, "Remote", &[])]);
    cache.inner.upsert_one(&game(5, "Cached", &[])).await.unwrap();

    let records = repo
        .get_popular(false, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids(&records), vec![5]);
    assert_eq!(catalog.calls(), 0);

    let refreshed = repo
        .get_popular(true, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids(&refreshed), vec![1]);
    assert_eq!(catalog.calls(), 1);
}

#[tokio::test]
async fn test_popular_refresh_is_idempotent() {
    let (_catalog, cache, repo) = setup(vec![game(1, "A", &[]), game(2, "B", &[])]);
    let cancel = CancellationToken::new();

    let first = repo.get_popular(true, &cancel).await.unwrap();
    let after_first = cache.inner.get_all().await.unwrap();
    assert_eq!(after_first, first);

    let second = repo.get_popular(true, &cancel).await.unwrap();
    let after_second = cache.inner.get_all().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_write_through_stores_every_record() {
    let mut witcher = game(1942, "The Witcher 3", &["Role-playing (RPG)"]);
    witcher.platforms = vec!["PC".into()];
    witcher.related_ids = vec![10];
    witcher.rating = Some(92.5);
    let remote = vec![witcher, game(10, "Ten", &["Shooter"]), game(20, "Twenty", &[])];
    let (_catalog, cache, repo) = setup(remote.clone());

    let returned = repo
        .fetch(&CatalogQuery::Popular, FetchPolicy::RemoteFirst, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(returned.len(), 3);
    for record in &remote {
        assert_eq!(cache.inner.get_by_id(record.id).await.unwrap().as_ref(), Some(record));
    }
}

#[tokio::test]
async fn test_empty_id_list_touches_nothing() {
    let (catalog, cache, repo) = setup(vec![game(1, "A", &[])]);

    for policy in [FetchPolicy::RemoteFirst, FetchPolicy::CacheFirst] {
        let records = repo
            .fetch(&CatalogQuery::ByIds(vec![]), policy, &CancellationToken::new())
            .await
            .unwrap();
        assert!(records.is_empty());
    }
    assert_eq!(catalog.calls(), 0);
    assert_eq!(cache.reads(), 0);
}

#[tokio::test]
async fn test_related_keeps_record_order() {
    let mut root = game(1, "Root", &[]);
    root.related_ids = vec![30, 10, 20];
    let (_catalog, _cache, repo) = setup(vec![
        root,
        game(10, "Ten", &[]),
        game(20, "Twenty", &[]),
        game(30, "Thirty", &[]),
    ]);

    let related = repo
        .get_related(1, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids(&related), vec![30, 10, 20]);
}

#[tokio::test]
async fn test_related_without_links_is_empty() {
    let (catalog, _cache, repo) = setup(vec![game(1, "Alone", &[])]);
    let related = repo
        .get_related(1, &CancellationToken::new())
        .await
        .unwrap();
    assert!(related.is_empty());
    assert_eq!(catalog.calls(), 1);
}

#[tokio::test]
async fn test_blank_search_skips_remote() {
    let (catalog, _cache, repo) = setup(vec![game(1, "Zelda", &[])]);
    let records = repo.search("   ", &CancellationToken::new()).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_search_falls_back_to_cached_names() {
    let (catalog, cache, repo) = setup(vec![]);
    cache
        .inner
        .upsert_many(&[game(1, "The Legend of Zelda", &[]), game(2, "Metroid", &[])])
        .await
        .unwrap();
    catalog.fail(CatalogError::Transport("offline".into()));

    let records = repo.search("zelda", &CancellationToken::new()).await.unwrap();
    assert_eq!(ids(&records), vec![1]);
}

#[tokio::test]
async fn test_recent_and_clear_never_call_remote() {
    let (catalog, cache, repo) = setup(vec![]);
    cache
        .inner
        .upsert_many(&[game(1, "A", &[]), game(2, "B", &[])])
        .await
        .unwrap();

    let recent = repo.get_recent(1).await.unwrap();
    assert_eq!(ids(&recent), vec![2]);

    repo.clear_cache().await.unwrap();
    assert_eq!(cache.inner.count().await.unwrap(), 0);
    assert_eq!(catalog.calls(), 0);
}
