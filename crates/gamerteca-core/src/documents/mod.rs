//! Per-user document storage abstraction.
//!
//! The personal library and curated lists live in a document store: JSON
//! documents grouped in named collections and addressed by string ids. The
//! core only needs get / set / delete / equality query / atomic batch write,
//! which is what [`DocumentStore`] exposes. Decoding into typed structs is
//! the caller's job (see [`crate::library`]).

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One write inside a [`DocumentStore::batch_write`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        collection: String,
        id: String,
        body: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Create or fully replace a document.
    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<()>;

    /// Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Documents whose top-level `field` equals `value`, ordered by id.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>>;

    /// Apply every op or none.
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()>;
}
