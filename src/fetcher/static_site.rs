use anyhow::{Result, Context};
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

use super::{FetchError, FetchedPage, Fetcher};

/// A canned page served by [`StaticFetcher`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPage {
    pub body: String,

    #[serde(default)]
    pub links: Vec<String>,
}

impl StaticPage {
    pub fn new(body: &str, links: &[&str]) -> Self {
        Self {
            body: body.to_string(),
            links: links.iter().map(|link| link.to_string()).collect(),
        }
    }
}

/// Fetcher backed by a fixed address -> page table.
///
/// Unknown addresses fail with [`FetchError::NotFound`]. Every call is
/// counted per address so callers can check how often each one was fetched.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    /// Site map
    pages: HashMap<String, StaticPage>,

    /// Fetch calls per address, including failed ones
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    /// Create a fetcher serving the given pages
    pub fn new(pages: HashMap<String, StaticPage>) -> Self {
        Self {
            pages,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Add or replace a page
    pub fn with_page(mut self, address: &str, page: StaticPage) -> Self {
        self.pages.insert(address.to_string(), page);
        self
    }

    /// The built-in sample site
    pub fn sample() -> Self {
        Self::default()
            .with_page(
                "http://golang.org/",
                StaticPage::new(
                    "The Go Programming Language",
                    &["http://golang.org/pkg/", "http://golang.org/cmd/"],
                ),
            )
            .with_page(
                "http://golang.org/pkg/",
                StaticPage::new(
                    "Packages",
                    &[
                        "http://golang.org/",
                        "http://golang.org/cmd/",
                        "http://golang.org/pkg/fmt/",
                        "http://golang.org/pkg/os/",
                    ],
                ),
            )
            .with_page(
                "http://golang.org/pkg/fmt/",
                StaticPage::new("Package fmt", &["http://golang.org/", "http://golang.org/pkg/"]),
            )
            .with_page(
                "http://golang.org/pkg/os/",
                StaticPage::new("Package os", &["http://golang.org/", "http://golang.org/pkg/"]),
            )
    }

    /// Parse a site map from YAML (a mapping of address to `{body, links}`)
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let pages: HashMap<String, StaticPage> = serde_yaml::from_str(contents)
            .context("Failed to parse site map")?;

        Ok(Self::new(pages))
    }

    /// Load a site map from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        debug!("Loading site map from: {}", path.display());
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read site map: {}", path.display()))?;

        Self::from_yaml_str(&contents)
            .context(format!("Invalid site map: {}", path.display()))
    }

    /// Number of pages in the site map
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// How many times `fetch` was called for an address
    pub async fn fetch_count(&self, address: &str) -> usize {
        self.calls.lock().await.get(address).copied().unwrap_or(0)
    }

    /// Total `fetch` calls across all addresses
    pub async fn total_fetches(&self) -> usize {
        self.calls.lock().await.values().sum()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, address: &str) -> Result<FetchedPage, FetchError> {
        *self.calls.lock().await.entry(address.to_string()).or_default() += 1;

        match self.pages.get(address) {
            Some(page) => Ok(FetchedPage::new(page.body.clone(), page.links.clone())),
            None => Err(FetchError::NotFound(address.to_string())),
        }
    }
}
