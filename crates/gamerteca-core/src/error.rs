//! Typed errors at the repository boundaries.
//!
//! Store traits and application plumbing return `anyhow::Result`; the
//! repositories convert those into the enums below so callers can tell a
//! remote rejection from a transport failure or a cancellation.

use thiserror::Error;

/// Failure of a catalog operation.
///
/// [`CatalogError::Cancelled`] is not a real failure: it signals that the
/// caller abandoned the request and must never trigger a cache fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("catalog request failed (status={status}): {body}")]
    Remote { status: u16, body: String },

    #[error("game not found: {0}")]
    NotFound(i64),

    #[error("catalog transport error: {0}")]
    Transport(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("local cache error: {0}")]
    Cache(String),
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}

/// Store traits report failures through `anyhow`; on the catalog side every
/// such failure is a local cache failure.
impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        CatalogError::Cache(format!("{:#}", err))
    }
}

/// Failure of a library or list operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LibraryError {
    #[error("document {collection}/{id} does not match its schema: {reason}")]
    Schema {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("list not found: {0}")]
    ListNotFound(String),

    #[error("list {0} belongs to another user")]
    NotOwner(String),

    #[error("rating must be between 1 and 10, got {0}")]
    InvalidRating(u8),

    #[error("list name must not be empty")]
    InvalidName,

    #[error("document store error: {0}")]
    Store(String),
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        LibraryError::Store(format!("{:#}", err))
    }
}
