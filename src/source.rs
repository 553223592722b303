//! The remote side of the catalog repository.
//!
//! [`CatalogSource`] is what [`crate::repository::CatalogRepository`] calls
//! for fresh data. The production implementation is
//! [`crate::catalog::IgdbClient`]; tests plug in scripted sources.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use gamerteca_core::error::CatalogError;
use gamerteca_core::models::CatalogRecord;
use gamerteca_core::query::CatalogQuery;

/// A remote catalog that answers typed queries.
///
/// # Contract
///
/// - Exactly one remote attempt per call, no retries.
/// - Non-2xx responses → [`CatalogError::Remote`] with status and body.
/// - An empty answer to [`CatalogQuery::ById`] → [`CatalogError::NotFound`].
/// - Network or decode failures → [`CatalogError::Transport`].
/// - When `cancel` fires the call returns [`CatalogError::Cancelled`] and
///   never wraps it in another variant.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(
        &self,
        query: &CatalogQuery,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogRecord>, CatalogError>;
}
