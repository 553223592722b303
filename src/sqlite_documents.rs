//! SQLite-backed [`DocumentStore`].
//!
//! Local stand-in for the cloud document store: one `documents` row per
//! `(collection, id)` holding the JSON body. Equality queries load the
//! collection and compare top-level fields in Rust, which keeps JSON typing
//! (numbers vs strings vs booleans) exact.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use gamerteca_core::documents::{DocumentStore, WriteOp};

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_body(collection: &str, id: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("corrupt document {}/{}", collection, id))
}

const UPSERT: &str = r#"
    INSERT INTO documents (collection, id, body_json, updated_at) VALUES (?, ?, ?, ?)
    ON CONFLICT(collection, id) DO UPDATE SET
        body_json = excluded.body_json,
        updated_at = excluded.updated_at
"#;

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT body_json FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        raw.map(|r| parse_body(collection, id, &r)).transpose()
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<()> {
        sqlx::query(UPSERT)
            .bind(collection)
            .bind(id)
            .bind(body.to_string())
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>> {
        let rows =
            sqlx::query("SELECT id, body_json FROM documents WHERE collection = ? ORDER BY id")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;

        let mut hits = Vec::new();
        for row in rows {
            let id: String = row.get("id");
            let raw: String = row.get("body_json");
            let body = parse_body(collection, &id, &raw)?;
            if body.get(field) == Some(value) {
                hits.push((id, body));
            }
        }
        Ok(hits)
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    body,
                } => {
                    sqlx::query(UPSERT)
                        .bind(collection)
                        .bind(id)
                        .bind(body.to_string())
                        .bind(now)
                        .execute(&mut *tx)
                        .await?;
                }
                WriteOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                        .bind(collection)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }
}
