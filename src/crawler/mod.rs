pub mod cancel;
pub mod controller;
pub mod registry;
pub mod task;
pub mod tracker;

use std::sync::Arc;

use crate::cli::config::CrawlerSettings;
use crate::fetcher::Fetcher;

// Re-export common types
pub use cancel::CancellationFlag;
pub use controller::CrawlerController;
pub use registry::VisitedRegistry;
pub use task::{CrawlReport, CrawledPage, FetchFailure, Task, TaskOutcome};
pub use tracker::CompletionTracker;

/// Crawl with the default worker pool size
pub async fn crawl(seed: &str, max_depth: u32, fetcher: Arc<dyn Fetcher>) -> CrawlReport {
    CrawlerController::new(CrawlerSettings::default(), fetcher)
        .crawl(seed, max_depth)
        .await
}
