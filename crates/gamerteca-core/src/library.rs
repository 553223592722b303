//! Personal library and curated lists on top of a [`DocumentStore`].
//!
//! A [`LibraryRepository`] is scoped to one user. Library entries live in
//! the `library` collection under `"{user}:{game_id}"`; lists live in the
//! `lists` collection under a random UUID. Every read is decoded through
//! serde into the typed models, and a document that does not fit fails with
//! [`LibraryError::Schema`] instead of being patched up with defaults.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::documents::{DocumentStore, WriteOp};
use crate::error::LibraryError;
use crate::models::{GameList, GameStatus, LibraryEntry};

pub const LIBRARY_COLLECTION: &str = "library";
pub const LISTS_COLLECTION: &str = "lists";

pub struct LibraryRepository {
    store: Arc<dyn DocumentStore>,
    user: String,
}

impl LibraryRepository {
    pub fn new(store: Arc<dyn DocumentStore>, user: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    fn entry_id(&self, game_id: i64) -> String {
        format!("{}:{}", self.user, game_id)
    }

    fn blank_entry(&self, game_id: i64) -> LibraryEntry {
        LibraryEntry {
            owner: self.user.clone(),
            game_id,
            status: GameStatus::Wishlist,
            favorite: false,
            rating: None,
            updated_at: now_millis(),
        }
    }

    // ── Library entries ────────────────────────────────────────────────

    pub async fn entry(&self, game_id: i64) -> Result<Option<LibraryEntry>, LibraryError> {
        let id = self.entry_id(game_id);
        match self.store.get(LIBRARY_COLLECTION, &id).await? {
            Some(body) => Ok(Some(decode(LIBRARY_COLLECTION, &id, body)?)),
            None => Ok(None),
        }
    }

    async fn update_entry<F>(&self, game_id: i64, change: F) -> Result<LibraryEntry, LibraryError>
    where
        F: FnOnce(&mut LibraryEntry),
    {
        let mut entry = match self.entry(game_id).await? {
            Some(e) => e,
            None => self.blank_entry(game_id),
        };
        change(&mut entry);
        entry.updated_at = now_millis();
        self.store
            .set(LIBRARY_COLLECTION, &self.entry_id(game_id), encode(&entry)?)
            .await?;
        Ok(entry)
    }

    /// Set the status, adding the game to the library if needed.
    pub async fn set_status(
        &self,
        game_id: i64,
        status: GameStatus,
    ) -> Result<LibraryEntry, LibraryError> {
        self.update_entry(game_id, |e| e.status = status).await
    }

    pub async fn toggle_favorite(&self, game_id: i64) -> Result<LibraryEntry, LibraryError> {
        self.update_entry(game_id, |e| e.favorite = !e.favorite).await
    }

    /// `None` clears the rating.
    pub async fn set_rating(
        &self,
        game_id: i64,
        rating: Option<u8>,
    ) -> Result<LibraryEntry, LibraryError> {
        if let Some(r) = rating {
            if !(1..=10).contains(&r) {
                return Err(LibraryError::InvalidRating(r));
            }
        }
        self.update_entry(game_id, |e| e.rating = rating).await
    }

    pub async fn remove(&self, game_id: i64) -> Result<(), LibraryError> {
        self.store
            .delete(LIBRARY_COLLECTION, &self.entry_id(game_id))
            .await?;
        Ok(())
    }

    /// All entries of this user, newest change first, optionally filtered
    /// by status.
    pub async fn entries(
        &self,
        status: Option<GameStatus>,
    ) -> Result<Vec<LibraryEntry>, LibraryError> {
        let docs = self
            .store
            .query_eq(LIBRARY_COLLECTION, "owner", &json!(self.user))
            .await?;
        let mut entries = Vec::with_capacity(docs.len());
        for (id, body) in docs {
            let entry: LibraryEntry = decode(LIBRARY_COLLECTION, &id, body)?;
            if status.map_or(true, |s| s == entry.status) {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(a.game_id.cmp(&b.game_id))
        });
        Ok(entries)
    }

    pub async fn favorites(&self) -> Result<Vec<LibraryEntry>, LibraryError> {
        Ok(self
            .entries(None)
            .await?
            .into_iter()
            .filter(|e| e.favorite)
            .collect())
    }

    // ── Lists ──────────────────────────────────────────────────────────

    pub async fn create_list(
        &self,
        name: &str,
        description: Option<String>,
        public: bool,
    ) -> Result<GameList, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::InvalidName);
        }
        let now = now_millis();
        let list = GameList {
            id: Uuid::new_v4().to_string(),
            owner: self.user.clone(),
            name: name.to_string(),
            description,
            game_ids: Vec::new(),
            public,
            created_at: now,
            updated_at: now,
        };
        self.store
            .set(LISTS_COLLECTION, &list.id, encode(&list)?)
            .await?;
        Ok(list)
    }

    /// Read a list. Lists of other users are visible only when public.
    pub async fn list(&self, list_id: &str) -> Result<GameList, LibraryError> {
        let body = self
            .store
            .get(LISTS_COLLECTION, list_id)
            .await?
            .ok_or_else(|| LibraryError::ListNotFound(list_id.to_string()))?;
        let list: GameList = decode(LISTS_COLLECTION, list_id, body)?;
        if list.owner != self.user && !list.public {
            return Err(LibraryError::ListNotFound(list_id.to_string()));
        }
        Ok(list)
    }

    async fn owned_list(&self, list_id: &str) -> Result<GameList, LibraryError> {
        let list = self.list(list_id).await?;
        if list.owner != self.user {
            return Err(LibraryError::NotOwner(list_id.to_string()));
        }
        Ok(list)
    }

    /// Append a game (no-op if already present) and make sure the game has
    /// a library entry. Both documents are written in one batch.
    pub async fn add_to_list(&self, list_id: &str, game_id: i64) -> Result<GameList, LibraryError> {
        let mut list = self.owned_list(list_id).await?;
        let mut ops = Vec::new();

        if !list.game_ids.contains(&game_id) {
            list.game_ids.push(game_id);
            list.updated_at = now_millis();
            ops.push(WriteOp::Set {
                collection: LISTS_COLLECTION.to_string(),
                id: list.id.clone(),
                body: encode(&list)?,
            });
        }
        if self.entry(game_id).await?.is_none() {
            ops.push(WriteOp::Set {
                collection: LIBRARY_COLLECTION.to_string(),
                id: self.entry_id(game_id),
                body: encode(&self.blank_entry(game_id))?,
            });
        }

        if !ops.is_empty() {
            self.store.batch_write(ops).await?;
        }
        Ok(list)
    }

    pub async fn remove_from_list(
        &self,
        list_id: &str,
        game_id: i64,
    ) -> Result<GameList, LibraryError> {
        let mut list = self.owned_list(list_id).await?;
        let before = list.game_ids.len();
        list.game_ids.retain(|id| *id != game_id);
        if list.game_ids.len() != before {
            list.updated_at = now_millis();
            self.store
                .set(LISTS_COLLECTION, &list.id, encode(&list)?)
                .await?;
        }
        Ok(list)
    }

    /// Share or unshare a list.
    pub async fn set_list_visibility(
        &self,
        list_id: &str,
        public: bool,
    ) -> Result<GameList, LibraryError> {
        let mut list = self.owned_list(list_id).await?;
        list.public = public;
        list.updated_at = now_millis();
        self.store
            .set(LISTS_COLLECTION, &list.id, encode(&list)?)
            .await?;
        Ok(list)
    }

    pub async fn delete_list(&self, list_id: &str) -> Result<(), LibraryError> {
        self.owned_list(list_id).await?;
        self.store.delete(LISTS_COLLECTION, list_id).await?;
        Ok(())
    }

    /// Lists owned by this user, by name.
    pub async fn lists(&self) -> Result<Vec<GameList>, LibraryError> {
        let mut lists = self.decode_lists("owner", json!(self.user)).await?;
        lists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(lists)
    }

    /// Shared lists of every user, most recently updated first.
    pub async fn public_lists(&self) -> Result<Vec<GameList>, LibraryError> {
        let mut lists = self.decode_lists("public", json!(true)).await?;
        lists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(lists)
    }

    async fn decode_lists(&self, field: &str, value: Value) -> Result<Vec<GameList>, LibraryError> {
        self.store
            .query_eq(LISTS_COLLECTION, field, &value)
            .await?
            .into_iter()
            .map(|(id, body)| decode(LISTS_COLLECTION, &id, body))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(collection: &str, id: &str, body: Value) -> Result<T, LibraryError> {
    serde_json::from_value(body).map_err(|e| LibraryError::Schema {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value, LibraryError> {
    serde_json::to_value(value).map_err(|e| LibraryError::Store(e.to_string()))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
