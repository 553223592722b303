//! SQLite-backed [`CacheStore`] implementation.
//!
//! Maps each cache operation onto the `games` table created by
//! [`crate::migrate`]. Writes use `INSERT OR REPLACE` keyed by id, so the
//! newest write always wins and no fields are merged. Each write also takes
//! the next `write_seq`, which orders records written within the same
//! millisecond for [`get_recent`](CacheStore::get_recent).

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};

use gamerteca_core::models::CatalogRecord;
use gamerteca_core::query::Category;
use gamerteca_core::store::CacheStore;

const COLUMNS: &str = "id, name, summary, rating, release_date, cover_url, platforms_json, \
genres_json, related_ids_json, developers_json, screenshot_urls_json";

/// SQLite implementation of the [`CacheStore`] trait.
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_records<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<Vec<CatalogRecord>> {
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }
}

fn encode_list<T: serde::Serialize>(values: &[T]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

fn decode_list<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<Vec<T>> {
    let raw: String = row.get(column);
    serde_json::from_str(&raw).with_context(|| format!("corrupt {} column: {}", column, raw))
}

fn row_to_record(row: &SqliteRow) -> Result<CatalogRecord> {
    Ok(CatalogRecord {
        id: row.get("id"),
        name: row.get("name"),
        summary: row.get("summary"),
        rating: row.get("rating"),
        release_date: row.get("release_date"),
        cover_url: row.get("cover_url"),
        platforms: decode_list(row, "platforms_json")?,
        genres: decode_list(row, "genres_json")?,
        related_ids: decode_list(row, "related_ids_json")?,
        developers: decode_list(row, "developers_json")?,
        screenshot_urls: decode_list(row, "screenshot_urls_json")?,
    })
}

async fn insert_record<'e, E>(executor: E, record: &CatalogRecord, now: i64) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO games (id, name, summary, rating, release_date, cover_url,
                                      platforms_json, genres_json, related_ids_json,
                                      developers_json, screenshot_urls_json,
                                      updated_at, write_seq)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                (SELECT COALESCE(MAX(write_seq), 0) + 1 FROM games))
        "#,
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.summary)
    .bind(record.rating)
    .bind(record.release_date)
    .bind(&record.cover_url)
    .bind(encode_list(&record.platforms)?)
    .bind(encode_list(&record.genres)?)
    .bind(encode_list(&record.related_ids)?)
    .bind(encode_list(&record.developers)?)
    .bind(encode_list(&record.screenshot_urls)?)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn upsert_many(&self, records: &[CatalogRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        for record in records {
            insert_record(&mut *tx, record, now).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn upsert_one(&self, record: &CatalogRecord) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        insert_record(&self.pool, record, now).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CatalogRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM games WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn get_all(&self) -> Result<Vec<CatalogRecord>> {
        let sql = format!("SELECT {} FROM games ORDER BY id", COLUMNS);
        self.fetch_records(sqlx::query(&sql)).await
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<CatalogRecord>> {
        let sql = format!(
            "SELECT {} FROM games ORDER BY updated_at DESC, write_seq DESC LIMIT ?",
            COLUMNS
        );
        self.fetch_records(sqlx::query(&sql).bind(limit as i64))
            .await
    }

    async fn cached_ids(&self) -> Result<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM games")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn find_by_category(
        &self,
        category: &Category,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>> {
        let member_of = |column: &str| {
            format!(
                "SELECT {} FROM games WHERE EXISTS (SELECT 1 FROM json_each(games.{}) \
                 WHERE lower(json_each.value) = lower(?)) ORDER BY id LIMIT ?",
                COLUMNS, column
            )
        };
        match category {
            Category::Genre(name) => {
                let sql = member_of("genres_json");
                self.fetch_records(sqlx::query(&sql).bind(name).bind(limit as i64))
                    .await
            }
            Category::Platform(name) => {
                let sql = member_of("platforms_json");
                self.fetch_records(sqlx::query(&sql).bind(name).bind(limit as i64))
                    .await
            }
            Category::Developer(name) => {
                let sql = member_of("developers_json");
                self.fetch_records(sqlx::query(&sql).bind(name).bind(limit as i64))
                    .await
            }
            Category::Year(year) => {
                let Some((start, end)) = Category::year_bounds(*year) else {
                    return Ok(Vec::new());
                };
                let sql = format!(
                    "SELECT {} FROM games WHERE release_date >= ? AND release_date < ? \
                     ORDER BY id LIMIT ?",
                    COLUMNS
                );
                self.fetch_records(sqlx::query(&sql).bind(start).bind(end).bind(limit as i64))
                    .await
            }
        }
    }

    async fn search_by_name(&self, text: &str, limit: usize) -> Result<Vec<CatalogRecord>> {
        let sql = format!(
            "SELECT {} FROM games WHERE instr(lower(name), lower(?)) > 0 ORDER BY id LIMIT ?",
            COLUMNS
        );
        self.fetch_records(sqlx::query(&sql).bind(text).bind(limit as i64))
            .await
    }

    async fn count(&self) -> Result<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as usize)
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM games").execute(&self.pool).await?;
        Ok(())
    }
}
