use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use chrono::Utc;
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cli::config::CrawlerSettings;
use crate::crawler::cancel::CancellationFlag;
use crate::crawler::registry::VisitedRegistry;
use crate::crawler::task::{CrawlReport, CrawledPage, FetchFailure, Task, TaskOutcome};
use crate::crawler::tracker::CompletionTracker;
use crate::fetcher::Fetcher;
use crate::storage::queue::QueueManager;
use crate::utils::metrics::StatsCollector;

/// Per-crawl state handed to every worker
#[derive(Clone)]
struct WorkerContext {
    queue: Arc<QueueManager>,
    registry: Arc<VisitedRegistry>,
    tracker: Arc<CompletionTracker>,
    stats: StatsCollector,
    fetcher: Arc<dyn Fetcher>,
    cancellation: CancellationFlag,
}

/// Runs crawls with a fixed pool of workers.
///
/// Each call to [`CrawlerController::crawl`] builds its own queue, registry,
/// tracker and cancellation flag, so independent crawls can run side by side.
/// Dropping an unfinished crawl aborts its workers.
pub struct CrawlerController {
    settings: CrawlerSettings,
    fetcher: Arc<dyn Fetcher>,
}

impl CrawlerController {
    /// Create a new crawler controller with the given settings and fetcher
    pub fn new(settings: CrawlerSettings, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            settings,
            fetcher,
        }
    }

    /// Size of the worker pool
    pub fn workers(&self) -> usize {
        self.settings.workers.max(1)
    }

    /// Crawl from `seed`, following links at most `max_depth` hops.
    ///
    /// Returns once every submitted task has been resolved. Fetch failures are
    /// recorded in the report and never abort the crawl.
    pub async fn crawl(&self, seed: &str, max_depth: u32) -> CrawlReport {
        self.crawl_with_cancellation(seed, max_depth, CancellationFlag::new()).await
    }

    /// Like [`CrawlerController::crawl`], stopping further fetches once
    /// `cancellation` is set. The flag only affects this crawl.
    pub async fn crawl_with_cancellation(
        &self,
        seed: &str,
        max_depth: u32,
        cancellation: CancellationFlag,
    ) -> CrawlReport {
        let crawl_id = Uuid::new_v4();
        let span = info_span!("crawl", %crawl_id, seed, max_depth);

        self.run(crawl_id, seed, max_depth, cancellation).instrument(span).await
    }

    async fn run(
        &self,
        crawl_id: Uuid,
        seed: &str,
        max_depth: u32,
        cancellation: CancellationFlag,
    ) -> CrawlReport {
        let workers = self.workers();
        let context = WorkerContext {
            queue: Arc::new(QueueManager::new()),
            registry: Arc::new(VisitedRegistry::new()),
            tracker: Arc::new(CompletionTracker::new()),
            stats: StatsCollector::new(),
            fetcher: self.fetcher.clone(),
            cancellation,
        };

        let started_at = Utc::now();
        info!("Starting crawl of {} with {} workers", seed, workers);

        context.tracker.submitted();
        if let Err(e) = context.queue.push_task(Task::seed(seed, max_depth)).await {
            error!("Failed to submit seed: {}", e);
            context.stats.record_dropped().await;
            context.tracker.resolved();
        }

        // Dropping the set aborts every worker
        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            let context = context.clone();
            let span = info_span!("worker", worker_id);
            pool.spawn(Self::run_worker(worker_id, context).instrument(span));
        }

        context.tracker.wait().await;
        context.queue.close().await;

        while let Some(result) = pool.join_next().await {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }

        let finished_at = Utc::now();
        let records = context.stats.take().await;

        let mut stats = records.stats;
        stats.submitted = context.tracker.submitted_total();
        stats.resolved = context.tracker.resolved_total();

        info!(
            submitted = stats.submitted,
            expanded = stats.expanded,
            duplicates = stats.duplicates,
            depth_exhausted = stats.depth_exhausted,
            fetch_errors = stats.fetch_errors,
            cancelled = stats.cancelled,
            dropped = stats.dropped,
            "Crawl finished"
        );

        CrawlReport {
            crawl_id,
            seed: seed.to_string(),
            max_depth,
            workers,
            pages: records.pages,
            errors: records.errors,
            stats,
            started_at,
            finished_at,
        }
    }

    /// Worker loop: runs until the queue is closed and drained
    async fn run_worker(worker_id: usize, context: WorkerContext) {
        debug!("Worker {} started", worker_id);

        while let Some(task) = context.queue.pop_task().await {
            let outcome = Self::process_task(&task, &context).await;
            debug!("Worker {} resolved {} as {}", worker_id, task.address, outcome.label());

            // Record before resolving so the report is complete once the
            // tracker drains.
            context.stats.record_outcome(outcome).await;
            context.tracker.resolved();
        }

        debug!("Worker {} stopped", worker_id);
    }

    /// Decide what to do with a task. Never resolves it; the caller does.
    async fn process_task(task: &Task, context: &WorkerContext) -> TaskOutcome {
        if !context.registry.claim(&task.address).await {
            return TaskOutcome::Duplicate;
        }

        if task.is_exhausted() {
            debug!("Depth exhausted at {}", task.address);
            return TaskOutcome::DepthExhausted;
        }

        if context.cancellation.is_cancelled() {
            debug!("Crawl cancelled, not fetching {}", task.address);
            return TaskOutcome::Cancelled;
        }

        info!("Crawl: {}", task.address);

        let fetched = AssertUnwindSafe(async { context.fetcher.fetch(&task.address).await })
            .catch_unwind()
            .await;

        let page = match fetched {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                warn!("Failed to fetch {}: {}", task.address, e);
                return TaskOutcome::FetchFailed(FetchFailure {
                    address: task.address.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                error!("Fetcher panicked on {}", task.address);
                return TaskOutcome::FetchFailed(FetchFailure {
                    address: task.address.clone(),
                    reason: "fetcher panicked".to_string(),
                });
            }
        };

        debug!("found: {} {:?}", task.address, page.content);

        for link in &page.links {
            // Count the child before it is visible to other workers and
            // before this task resolves.
            context.tracker.submitted();

            if let Err(e) = context.queue.push_task(task.child(link)).await {
                error!("Failed to submit {}: {}", link, e);
                context.stats.record_dropped().await;
                context.tracker.resolved();
            }
        }

        TaskOutcome::Expanded(CrawledPage {
            address: task.address.clone(),
            depth: task.remaining_depth,
            content: page.content,
            links: page.links,
        })
    }
}
