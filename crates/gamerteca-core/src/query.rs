//! Catalog query intents and their rendering to the remote query grammar.
//!
//! The remote catalog accepts a single textual request body per call
//! (IGDB "apicalypse" syntax):
//!
//! ```text
//! fields <fields>; [search "<text>";] [where <predicate>;] [sort <key> desc;] limit <n>; offset <m>;
//! ```
//!
//! [`CatalogQuery`] is the typed intent; [`CatalogQuery::to_body`] renders it.
//!
//! ```rust
//! use gamerteca_core::mapping::CompanyRole;
//! use gamerteca_core::query::CatalogQuery;
//!
//! let body = CatalogQuery::ById(1942).to_body(20, 0, CompanyRole::Developer);
//! assert!(body.contains("where id = 1942;"));
//! assert!(body.ends_with("limit 1; offset 0;"));
//! ```

use chrono::{TimeZone, Utc};

use crate::mapping::CompanyRole;

/// Upper bound the remote endpoint accepts for `limit`.
pub const MAX_LIMIT: usize = 500;

/// Fields requested for every game query. Nested objects are expanded so a
/// single round-trip carries everything [`crate::mapping::map_game`] needs.
pub const GAME_FIELDS: &str = "id,name,summary,total_rating,first_release_date,cover.url,\
platforms.name,genres.name,similar_games,involved_companies.company.name,\
involved_companies.developer,involved_companies.publisher,screenshots.url";

/// A browsing category. Names match the display names stored on records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Genre(String),
    Platform(String),
    Developer(String),
    /// Calendar year of first release (UTC).
    Year(i32),
}

impl Category {
    /// Half-open `[start, end)` epoch-second range covering a release year.
    pub fn year_bounds(year: i32) -> Option<(i64, i64)> {
        let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
        let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?;
        Some((start.timestamp(), end.timestamp()))
    }

    pub fn label(&self) -> String {
        match self {
            Category::Genre(name) => format!("genre:{}", name),
            Category::Platform(name) => format!("platform:{}", name),
            Category::Developer(name) => format!("developer:{}", name),
            Category::Year(year) => format!("year:{}", year),
        }
    }
}

/// A typed catalog query intent.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogQuery {
    Popular,
    ById(i64),
    ByIds(Vec<i64>),
    ByCategory(Category),
    Search(String),
}

impl CatalogQuery {
    /// Render the request body. `limit` is clamped to `1..=MAX_LIMIT`;
    /// single-id lookups always use `limit 1`. `role` picks which involved
    /// companies a developer filter accepts, matching the mapper.
    pub fn to_body(&self, limit: usize, offset: usize, role: CompanyRole) -> String {
        let limit = match self {
            CatalogQuery::ById(_) => 1,
            _ => limit.clamp(1, MAX_LIMIT),
        };

        let mut body = format!("fields {};", GAME_FIELDS);
        if let CatalogQuery::Search(text) = self {
            body.push_str(&format!(" search \"{}\";", escape(text)));
        }
        if let Some(predicate) = self.predicate(role) {
            body.push_str(&format!(" where {};", predicate));
        }
        if let Some(key) = self.sort_key() {
            body.push_str(&format!(" sort {} desc;", key));
        }
        body.push_str(&format!(" limit {}; offset {};", limit, offset));
        body
    }

    fn predicate(&self, role: CompanyRole) -> Option<String> {
        match self {
            CatalogQuery::Popular => Some("total_rating_count != null & cover != null".to_string()),
            CatalogQuery::ById(id) => Some(format!("id = {}", id)),
            CatalogQuery::ByIds(ids) => {
                let list = ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                Some(format!("id = ({})", list))
            }
            CatalogQuery::ByCategory(Category::Genre(name)) => {
                Some(format!("genres.name = \"{}\"", escape(name)))
            }
            CatalogQuery::ByCategory(Category::Platform(name)) => {
                Some(format!("platforms.name = \"{}\"", escape(name)))
            }
            CatalogQuery::ByCategory(Category::Developer(name)) => {
                let role_filter = match role {
                    CompanyRole::Developer => "involved_companies.developer = true",
                    CompanyRole::DeveloperOrPublisher => {
                        "(involved_companies.developer = true | involved_companies.publisher = true)"
                    }
                };
                Some(format!(
                    "involved_companies.company.name = \"{}\" & {}",
                    escape(name),
                    role_filter
                ))
            }
            CatalogQuery::ByCategory(Category::Year(year)) => {
                // Out-of-range years render an empty window rather than an error.
                let (start, end) = Category::year_bounds(*year).unwrap_or((0, 0));
                Some(format!(
                    "first_release_date >= {} & first_release_date < {}",
                    start, end
                ))
            }
            CatalogQuery::Search(_) => None,
        }
    }

    fn sort_key(&self) -> Option<&'static str> {
        match self {
            CatalogQuery::Popular => Some("total_rating_count"),
            CatalogQuery::ByCategory(Category::Year(_)) => Some("first_release_date"),
            CatalogQuery::ByCategory(_) => Some("total_rating_count"),
            // search and sort cannot be combined upstream
            CatalogQuery::Search(_) => None,
            CatalogQuery::ById(_) | CatalogQuery::ByIds(_) => None,
        }
    }

    /// Short human label used in log lines.
    pub fn describe(&self) -> String {
        match self {
            CatalogQuery::Popular => "popular".to_string(),
            CatalogQuery::ById(id) => format!("id:{}", id),
            CatalogQuery::ByIds(ids) => format!("ids:{}", ids.len()),
            CatalogQuery::ByCategory(category) => category.label(),
            CatalogQuery::Search(text) => format!("search:{}", text),
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
