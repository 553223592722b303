//! Composition root.
//!
//! Opens the database once, applies migrations, and wires the stores, the
//! catalog client, and both repositories together. Every store is built
//! here and handed to the repositories by `Arc`; nothing is global.

use std::sync::Arc;

use anyhow::Result;
use sqlx::SqlitePool;

use gamerteca_core::documents::DocumentStore;
use gamerteca_core::library::LibraryRepository;
use gamerteca_core::store::CacheStore;

use crate::catalog::IgdbClient;
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::repository::CatalogRepository;
use crate::source::CatalogSource;
use crate::sqlite_documents::SqliteDocumentStore;
use crate::sqlite_store::SqliteCacheStore;

pub struct App {
    pub catalog: CatalogRepository,
    pub library: LibraryRepository,
    pool: SqlitePool,
}

impl App {
    /// Wire the production stack: SQLite stores and the HTTP catalog client.
    pub async fn open(config: &Config) -> Result<Self> {
        let source: Arc<dyn CatalogSource> = Arc::new(IgdbClient::new(&config.catalog)?);
        Self::open_with_source(config, source).await
    }

    /// Same as [`App::open`] with a caller-supplied catalog source.
    pub async fn open_with_source(config: &Config, source: Arc<dyn CatalogSource>) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply(&pool).await?;

        let cache: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::new(pool.clone()));
        let documents: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(pool.clone()));

        Ok(Self {
            catalog: CatalogRepository::new(source, cache, config.catalog.page_size),
            library: LibraryRepository::new(documents, config.user.id.clone()),
            pool,
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
