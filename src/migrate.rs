//! Database schema migrations.
//!
//! Every statement is idempotent. [`apply`] runs each time the app opens the
//! database and again from `gamerteca init`, which can be repeated safely.
//!
//! List-valued record fields are stored as JSON arrays, one TEXT column per
//! list, which keeps order and allows empty-string elements.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn apply(pool: &SqlitePool) -> Result<()> {
    // Catalog cache
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            summary TEXT,
            rating REAL,
            release_date INTEGER,
            cover_url TEXT,
            platforms_json TEXT NOT NULL DEFAULT '[]',
            genres_json TEXT NOT NULL DEFAULT '[]',
            related_ids_json TEXT NOT NULL DEFAULT '[]',
            developers_json TEXT NOT NULL DEFAULT '[]',
            screenshot_urls_json TEXT NOT NULL DEFAULT '[]',
            updated_at INTEGER NOT NULL,
            write_seq INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Library and list documents
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body_json TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_games_recent ON games(updated_at DESC, write_seq DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_release_date ON games(release_date)")
        .execute(pool)
        .await?;

    Ok(())
}
