//! Remote response mapping.
//!
//! The catalog endpoint returns a JSON array of nested game objects. This
//! module holds the wire DTOs and the single mapper, [`map_game`], applied
//! identically on every query path:
//!
//! - protocol-relative URLs (`//host/path`) are rewritten to `https://host/path`;
//! - a missing or blank name becomes [`PLACEHOLDER_NAME`];
//! - nested lists are reduced to names, dropping null and unnamed entries;
//! - involved companies are filtered by [`CompanyRole`] before taking names.

use serde::Deserialize;

use crate::models::{CatalogRecord, PLACEHOLDER_NAME};

/// Which involved companies count as "developers" on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyRole {
    #[default]
    Developer,
    DeveloperOrPublisher,
}

impl CompanyRole {
    fn accepts(&self, company: &InvolvedCompanyDto) -> bool {
        match self {
            CompanyRole::Developer => company.developer,
            CompanyRole::DeveloperOrPublisher => company.developer || company.publisher,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDto {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedDto {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvolvedCompanyDto {
    #[serde(default)]
    pub company: Option<NamedDto>,
    #[serde(default)]
    pub developer: bool,
    #[serde(default)]
    pub publisher: bool,
}

/// One element of the remote response array.
#[derive(Debug, Clone, Deserialize)]
pub struct GameDto {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub total_rating: Option<f64>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
    #[serde(default)]
    pub cover: Option<ImageDto>,
    #[serde(default)]
    pub platforms: Option<Vec<Option<NamedDto>>>,
    #[serde(default)]
    pub genres: Option<Vec<Option<NamedDto>>>,
    #[serde(default)]
    pub similar_games: Option<Vec<i64>>,
    #[serde(default)]
    pub involved_companies: Option<Vec<Option<InvolvedCompanyDto>>>,
    #[serde(default)]
    pub screenshots: Option<Vec<Option<ImageDto>>>,
}

/// Rewrite a protocol-relative URL to explicit HTTPS. Anything else is
/// returned unchanged.
pub fn normalize_url(raw: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    }
}

/// Map one wire object into a [`CatalogRecord`].
pub fn map_game(dto: GameDto, role: CompanyRole) -> CatalogRecord {
    let name = dto
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

    let developers = dto
        .involved_companies
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|c| role.accepts(c))
        .filter_map(|c| c.company.and_then(|company| company.name))
        .collect();

    CatalogRecord {
        id: dto.id,
        name,
        summary: dto.summary,
        rating: dto.total_rating,
        release_date: dto.first_release_date,
        cover_url: dto.cover.and_then(|c| c.url).map(|u| normalize_url(&u)),
        platforms: names(dto.platforms),
        genres: names(dto.genres),
        related_ids: dto.similar_games.unwrap_or_default(),
        developers,
        screenshot_urls: dto
            .screenshots
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|s| s.url)
            .map(|u| normalize_url(&u))
            .collect(),
    }
}

/// Parse a full response body and map every element.
pub fn parse_games(body: &str, role: CompanyRole) -> serde_json::Result<Vec<CatalogRecord>> {
    let dtos: Vec<GameDto> = serde_json::from_str(body)?;
    Ok(dtos.into_iter().map(|dto| map_game(dto, role)).collect())
}

fn names(items: Option<Vec<Option<NamedDto>>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|item| item.name)
        .collect()
}
