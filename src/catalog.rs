//! HTTP client for the remote game catalog.
//!
//! Sends one `POST` per query to the configured endpoint with the rendered
//! query grammar as a `text/plain` body, authenticated by the `Client-ID`
//! and `Authorization: Bearer` header pair, and maps the JSON array
//! response through [`gamerteca_core::mapping::parse_games`].
//!
//! There is no retry loop: a failed attempt is reported to the repository,
//! which decides whether the cache can answer instead.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gamerteca_core::error::CatalogError;
use gamerteca_core::mapping::{parse_games, CompanyRole};
use gamerteca_core::models::CatalogRecord;
use gamerteca_core::query::CatalogQuery;

use crate::config::CatalogConfig;
use crate::source::CatalogSource;

pub struct IgdbClient {
    http: Client,
    endpoint: String,
    client_id: String,
    token: String,
    role: CompanyRole,
}

impl IgdbClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let (client_id, token) = config.credentials();
        let http = Client::builder()
            .user_agent(concat!("gamerteca/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to construct catalog HTTP client")?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            client_id,
            token,
            role: config.company_role,
        })
    }

    async fn execute(&self, body: String) -> Result<Vec<CatalogRecord>, CatalogError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Client-ID", &self.client_id)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(CatalogError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_games(&text, self.role)
            .map_err(|e| CatalogError::Transport(format!("failed to parse catalog payload: {}", e)))
    }
}

fn transport(err: reqwest::Error) -> CatalogError {
    CatalogError::Transport(format!("{:#}", anyhow::Error::new(err)))
}

#[async_trait]
impl CatalogSource for IgdbClient {
    async fn fetch(
        &self,
        query: &CatalogQuery,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let body = query.to_body(limit, offset, self.role);
        debug!(query = %query.describe(), %body, "catalog request");

        let records = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
            result = self.execute(body) => result?,
        };

        debug!(query = %query.describe(), count = records.len(), "catalog response");
        if let CatalogQuery::ById(id) = query {
            if records.is_empty() {
                return Err(CatalogError::NotFound(*id));
            }
        }
        Ok(records)
    }
}
