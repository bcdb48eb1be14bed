use anyhow::{Result, Context};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::config::CoordinatorConfig;
use crate::crawler::{CancellationFlag, CrawlReport, CrawlerController};
use crate::fetcher::StaticFetcher;

/// Arguments of the `crawl` command
#[derive(Debug, Clone)]
pub struct CrawlArgs {
    pub seed: String,
    pub depth: Option<u32>,
    pub workers: Option<usize>,
    pub site_map: Option<PathBuf>,
    pub json: bool,
}

/// Apply command line overrides on top of the loaded configuration
pub fn apply_overrides(mut config: CoordinatorConfig, args: &CrawlArgs) -> Result<CoordinatorConfig> {
    if let Some(d) = args.depth {
        config.crawler.max_depth = d;
    }

    if let Some(w) = args.workers {
        config.crawler.workers = w;
    }

    config.validate().context("Invalid crawl settings")?;
    Ok(config)
}

/// Run a crawl against a static site map
pub async fn crawl(args: CrawlArgs, config: CoordinatorConfig) -> Result<()> {
    let config = apply_overrides(config, &args)?;

    let fetcher = match &args.site_map {
        Some(path) => StaticFetcher::from_yaml_file(path)
            .context(format!("Failed to load site map: {}", path.display()))?,
        None => {
            info!("No site map given, crawling the built-in sample site");
            StaticFetcher::sample()
        }
    };

    let controller = CrawlerController::new(config.crawler.clone(), Arc::new(fetcher));

    // First Ctrl-C stops new fetches while queued work drains; a second one
    // exits immediately.
    let cancellation = CancellationFlag::new();
    let interrupt = cancellation.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt.is_cancelled() {
                warn!("Second interrupt received, exiting");
                std::process::exit(130);
            }
            warn!("Interrupt received, finishing outstanding tasks without fetching");
            interrupt.cancel();
        }
    });

    let report = controller
        .crawl_with_cancellation(&args.seed, config.crawler.max_depth, cancellation)
        .await;

    if args.json {
        let json_output = serde_json::to_string_pretty(&report)
            .context("Failed to serialize crawl report")?;
        println!("{}", json_output);
    } else {
        print_summary(&report);
    }

    Ok(())
}

/// Print a human-readable crawl summary
fn print_summary(report: &CrawlReport) {
    println!("Crawl ID: {}", report.crawl_id);
    println!("Seed: {} (depth {}, {} workers)", report.seed, report.max_depth, report.workers);
    println!();

    for page in &report.pages {
        println!("found: {} {:?}", page.address, page.content);
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for failure in &report.errors {
            println!("  - {}", failure.reason);
        }
    }

    let stats = &report.stats;
    println!();
    println!("Fetched: {}", stats.expanded);
    println!("Fetch errors: {}", stats.fetch_errors);
    println!("Duplicates skipped: {}", stats.duplicates);
    println!("Depth exhausted: {}", stats.depth_exhausted);
    if stats.cancelled > 0 {
        println!("Cancelled: {}", stats.cancelled);
    }
    if stats.dropped > 0 {
        println!("Dropped: {}", stats.dropped);
    }
    println!("Tasks: {} submitted, {} resolved", stats.submitted, stats.resolved);
    println!("Elapsed: {} ms", report.elapsed_ms());
}

/// Show the current configuration
pub fn show_config(config: &CoordinatorConfig) -> Result<()> {
    let contents = serde_yaml::to_string(config)
        .context("Failed to serialize configuration")?;

    println!("Current configuration:");
    println!("{}", contents);

    Ok(())
}
