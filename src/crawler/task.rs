use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::utils::metrics::CrawlStats;

/// A pending unit of work: an address plus its remaining depth budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Address to fetch
    pub address: String,

    /// How many more link hops may be followed from this address
    pub remaining_depth: u32,
}

impl Task {
    /// Create the seed task for a crawl
    pub fn seed(address: impl Into<String>, max_depth: u32) -> Self {
        Self {
            address: address.into(),
            remaining_depth: max_depth,
        }
    }

    /// Create the task for a link discovered on this task's page.
    ///
    /// Only called after a successful fetch, which requires a non-zero depth.
    pub fn child(&self, link: &str) -> Self {
        Self {
            address: link.to_string(),
            remaining_depth: self.remaining_depth.saturating_sub(1),
        }
    }

    /// Whether the depth budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.remaining_depth == 0
    }
}

/// How a task was resolved by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Another task already claimed the address
    Duplicate,

    /// The address was claimed but no depth budget was left
    DepthExhausted,

    /// The crawl was cancelled before the fetch started
    Cancelled,

    /// The fetch capability reported an error
    FetchFailed(FetchFailure),

    /// The page was fetched and its links were submitted
    Expanded(CrawledPage),
}

impl TaskOutcome {
    /// Short label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Duplicate => "skipped-duplicate",
            TaskOutcome::DepthExhausted => "skipped-depth-exhausted",
            TaskOutcome::Cancelled => "skipped-cancelled",
            TaskOutcome::FetchFailed(_) => "skipped-fetch-error",
            TaskOutcome::Expanded(_) => "expanded",
        }
    }
}

/// A page fetched during the crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Address that was fetched
    pub address: String,

    /// Remaining depth at the time of the fetch
    pub depth: u32,

    /// Content returned by the fetcher
    pub content: String,

    /// Links discovered on the page, in fetcher order
    pub links: Vec<String>,
}

/// A fetch that failed during the crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Address that could not be fetched
    pub address: String,

    /// Error message reported by the fetcher
    pub reason: String,
}

/// Summary of a finished crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Unique identifier for this crawl run
    pub crawl_id: Uuid,

    /// Seed address
    pub seed: String,

    /// Depth budget given to the seed
    pub max_depth: u32,

    /// Number of workers in the pool
    pub workers: usize,

    /// Pages that were fetched and expanded
    pub pages: Vec<CrawledPage>,

    /// Fetches that failed
    pub errors: Vec<FetchFailure>,

    /// Task accounting
    pub stats: CrawlStats,

    /// When the seed was submitted
    pub started_at: DateTime<Utc>,

    /// When the outstanding count returned to zero
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Whether every submitted task was resolved exactly once, each with a
    /// recorded outcome
    pub fn is_balanced(&self) -> bool {
        self.stats.submitted == self.stats.resolved && self.stats.outcomes() == self.stats.resolved
    }

    /// Addresses whose fetch succeeded
    pub fn fetched_addresses(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.address.as_str()).collect()
    }

    /// Wall-clock duration of the crawl in milliseconds
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
