//! Concurrent, depth-bounded crawl coordination.
//!
//! A [`crawler::CrawlerController`] runs a fixed pool of workers over a shared
//! work queue. A [`crawler::VisitedRegistry`] guarantees each address is
//! fetched at most once, and a [`crawler::CompletionTracker`] ends the crawl
//! when no task is queued or in flight. Fetching is delegated to any
//! [`fetcher::Fetcher`].

pub mod cli;
pub mod crawler;
pub mod fetcher;
pub mod storage;
pub mod utils;

pub use crawler::{crawl, CrawlReport, CrawlerController};
pub use fetcher::{FetchError, FetchedPage, Fetcher, StaticFetcher};
