//! Core data models shared by every Gamerteca layer.
//!
//! [`CatalogRecord`] is the canonical game entity: it is produced by the
//! response mapper, persisted by the cache store, and rendered by the CLI.
//! The library types ([`LibraryEntry`], [`GameList`]) are the typed views of
//! documents kept in the document store.

use serde::{Deserialize, Serialize};

/// Display title used when the upstream record has no usable name.
pub const PLACEHOLDER_NAME: &str = "Sin título";

/// A single game's canonical data as known to this app.
///
/// URLs are always absolute and `name` is never empty once a record has
/// been materialized by [`crate::mapping::map_game`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: i64,
    pub name: String,
    pub summary: Option<String>,
    /// Upstream score on a 0–100 scale.
    pub rating: Option<f64>,
    /// First release date, epoch seconds.
    pub release_date: Option<i64>,
    pub cover_url: Option<String>,
    pub platforms: Vec<String>,
    pub genres: Vec<String>,
    pub related_ids: Vec<i64>,
    pub developers: Vec<String>,
    pub screenshot_urls: Vec<String>,
}

impl CatalogRecord {
    /// Minimal record with only an id and a name; the rest empty.
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            summary: None,
            rating: None,
            release_date: None,
            cover_url: None,
            platforms: Vec::new(),
            genres: Vec::new(),
            related_ids: Vec::new(),
            developers: Vec::new(),
            screenshot_urls: Vec::new(),
        }
    }

    /// Calendar year of the first release, in UTC.
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.year())
    }
}

/// Where a game sits in the user's personal library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Wishlist,
    Playing,
    Completed,
    Dropped,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Wishlist => "wishlist",
            GameStatus::Playing => "playing",
            GameStatus::Completed => "completed",
            GameStatus::Dropped => "dropped",
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wishlist" => Ok(GameStatus::Wishlist),
            "playing" => Ok(GameStatus::Playing),
            "completed" => Ok(GameStatus::Completed),
            "dropped" => Ok(GameStatus::Dropped),
            other => Err(format!(
                "unknown status '{}'. Must be wishlist, playing, completed, or dropped.",
                other
            )),
        }
    }
}

/// One game in one user's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub owner: String,
    pub game_id: i64,
    pub status: GameStatus,
    #[serde(default)]
    pub favorite: bool,
    /// Personal score, 1..=10.
    #[serde(default)]
    pub rating: Option<u8>,
    pub updated_at: i64,
}

/// A curated, optionally shared list of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameList {
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub game_ids: Vec<i64>,
    #[serde(default)]
    pub public: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
