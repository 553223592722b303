//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/gamerteca.sqlite"
//!
//! [catalog]
//! endpoint = "https://api.igdb.com/v4/games"
//! client_id = "..."            # or GAMERTECA_CLIENT_ID
//! token = "..."                # or GAMERTECA_TOKEN
//! timeout_secs = 15
//! page_size = 20
//! company_role = "developer"   # or "developer_or_publisher"
//!
//! [user]
//! id = "local"
//! ```
//!
//! Only `[db]` is required. Credentials may be left out of the file and
//! supplied through the environment; the environment wins when both are set.

use anyhow::{Context, Result};
use gamerteca_core::mapping::CompanyRole;
use gamerteca_core::query::MAX_LIMIT;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CLIENT_ID_ENV: &str = "GAMERTECA_CLIENT_ID";
pub const TOKEN_ENV: &str = "GAMERTECA_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub company_role: CompanyRole,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            client_id: None,
            token: None,
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            company_role: CompanyRole::default(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.igdb.com/v4/games".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_page_size() -> usize {
    20
}

impl CatalogConfig {
    /// `(client_id, bearer_token)`, environment first, then file, then empty.
    pub fn credentials(&self) -> (String, String) {
        let pick = |env: &str, file: &Option<String>| {
            std::env::var(env)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.clone())
                .unwrap_or_default()
        };
        (
            pick(CLIENT_ID_ENV, &self.client_id),
            pick(TOKEN_ENV, &self.token),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

/// Parse and validate a configuration document.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.catalog.endpoint.trim().is_empty() {
        anyhow::bail!("catalog.endpoint must not be empty");
    }
    if !config.catalog.endpoint.starts_with("http://")
        && !config.catalog.endpoint.starts_with("https://")
    {
        anyhow::bail!(
            "catalog.endpoint must be an http(s) URL, got '{}'",
            config.catalog.endpoint
        );
    }

    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs must be > 0");
    }

    if !(1..=MAX_LIMIT).contains(&config.catalog.page_size) {
        anyhow::bail!("catalog.page_size must be in [1, {}]", MAX_LIMIT);
    }

    if config.user.id.trim().is_empty() {
        anyhow::bail!("user.id must not be empty");
    }

    Ok(config)
}
