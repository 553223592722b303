//! In-memory [`DocumentStore`] for tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentStore, WriteOp};

/// `(collection, id) -> body`, kept ordered so queries come back sorted by id.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<BTreeMap<(String, String), Value>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let docs = self.docs.read().unwrap();
        Ok(docs
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        docs.insert((collection.to_string(), id.to_string()), body);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        docs.remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>> {
        let docs = self.docs.read().unwrap();
        Ok(docs
            .iter()
            .filter(|((c, _), body)| c == collection && body.get(field) == Some(value))
            .map(|((_, id), body)| (id.clone(), body.clone()))
            .collect())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        // Single lock acquisition makes the batch atomic for readers.
        let mut docs = self.docs.write().unwrap();
        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    body,
                } => {
                    docs.insert((collection, id), body);
                }
                WriteOp::Delete { collection, id } => {
                    docs.remove(&(collection, id));
                }
            }
        }
        Ok(())
    }
}
