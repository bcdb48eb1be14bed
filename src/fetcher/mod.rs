pub mod static_site;

use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Re-export common types
pub use static_site::{StaticFetcher, StaticPage};

/// Content and outbound links returned by a successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    pub content: String,
    pub links: Vec<String>,
}

impl FetchedPage {
    pub fn new(content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            content: content.into(),
            links,
        }
    }
}

/// Errors reported by a fetcher
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Nothing is known at the address
    #[error("not found: {0}")]
    NotFound(String),

    /// The fetch was attempted and failed
    #[error("failed to fetch {address}: {reason}")]
    Failed { address: String, reason: String },
}

/// Retrieves the content and links of an address.
///
/// The crawler makes no assumption about how this happens. It could be a
/// network call, a disk read or a lookup table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<FetchedPage, FetchError>;
}
