use std::sync::Arc;
use std::time::Duration;

use crawl_coordinator::cli::config::CrawlerSettings;
use crawl_coordinator::fetcher::StaticPage;
use crawl_coordinator::{CrawlReport, CrawlerController, StaticFetcher};

async fn run(fetcher: Arc<StaticFetcher>, seed: &str, depth: u32, workers: usize) -> CrawlReport {
    let controller = CrawlerController::new(CrawlerSettings { max_depth: depth, workers }, fetcher);

    tokio::time::timeout(Duration::from_secs(10), controller.crawl(seed, depth))
        .await
        .expect("crawl did not terminate")
}

fn sorted(mut addresses: Vec<&str>) -> Vec<&str> {
    addresses.sort();
    addresses
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_links_at_depth_limit_are_claimed_not_fetched() {
    let fetcher = Arc::new(StaticFetcher::default().with_page("A", StaticPage::new("Page A", &["B", "C"])));

    let report = run(fetcher.clone(), "A", 1, 4).await;

    assert_eq!(report.fetched_addresses(), vec!["A"]);
    assert_eq!(fetcher.fetch_count("A").await, 1);
    assert_eq!(fetcher.fetch_count("B").await, 0);
    assert_eq!(fetcher.fetch_count("C").await, 0);
    assert_eq!(report.stats.depth_exhausted, 2);
    assert_eq!(report.stats.submitted, 3);
    assert!(report.is_balanced());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unknown_links_resolve_via_fetch_failure() {
    let fetcher = Arc::new(StaticFetcher::default().with_page("A", StaticPage::new("Page A", &["B", "C"])));

    let report = run(fetcher.clone(), "A", 2, 4).await;

    for address in ["A", "B", "C"] {
        assert_eq!(fetcher.fetch_count(address).await, 1, "{} fetched once", address);
    }
    assert_eq!(report.fetched_addresses(), vec!["A"]);
    assert_eq!(report.stats.expanded, 1);
    assert_eq!(report.stats.fetch_errors, 2);

    let failed: Vec<&str> = report.errors.iter().map(|failure| failure.address.as_str()).collect();
    assert_eq!(sorted(failed), vec!["B", "C"]);
    assert!(report.is_balanced());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_terminates_and_skips_duplicate() {
    let fetcher = Arc::new(
        StaticFetcher::default()
            .with_page("A", StaticPage::new("Page A", &["B"]))
            .with_page("B", StaticPage::new("Page B", &["A"])),
    );

    let report = run(fetcher.clone(), "A", 2, 4).await;

    assert_eq!(fetcher.fetch_count("A").await, 1);
    assert_eq!(fetcher.fetch_count("B").await, 1);
    assert_eq!(sorted(report.fetched_addresses()), vec!["A", "B"]);
    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.stats.depth_exhausted, 0);
    assert!(report.is_balanced());
}

#[tokio::test]
async fn test_zero_depth_fetches_nothing() {
    let fetcher = Arc::new(StaticFetcher::sample());

    let report = run(fetcher.clone(), "A", 0, 4).await;

    assert_eq!(fetcher.total_fetches().await, 0);
    assert!(report.pages.is_empty());
    assert_eq!(report.stats.depth_exhausted, 1);
    assert_eq!(report.stats.submitted, 1);
    assert_eq!(report.stats.resolved, 1);
}

#[tokio::test]
async fn test_failed_seed_terminates_cleanly() {
    let fetcher = Arc::new(StaticFetcher::default());

    let report = run(fetcher.clone(), "A", 3, 4).await;

    assert_eq!(fetcher.fetch_count("A").await, 1);
    assert!(report.pages.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].reason, "not found: A");
    assert_eq!(report.stats.submitted, 1);
    assert!(report.is_balanced());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sample_site_fetches_each_address_once() {
    let fetcher = Arc::new(StaticFetcher::sample());

    let report = run(fetcher.clone(), "http://golang.org/", 4, 4).await;

    assert_eq!(
        sorted(report.fetched_addresses()),
        vec![
            "http://golang.org/",
            "http://golang.org/pkg/",
            "http://golang.org/pkg/fmt/",
            "http://golang.org/pkg/os/",
        ]
    );
    assert_eq!(fetcher.fetch_count("http://golang.org/cmd/").await, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(fetcher.total_fetches().await, 5);
    assert_eq!(report.stats.fetches(), 5);
    assert!(report.is_balanced());
}

/// Every node links to every other node, so each address is referenced by
/// many concurrent tasks.
fn complete_graph(nodes: usize) -> StaticFetcher {
    let names: Vec<String> = (0..nodes).map(|n| format!("node-{}", n)).collect();

    names.iter().fold(StaticFetcher::default(), |fetcher, name| {
        let links: Vec<&str> = names.iter().filter(|other| *other != name).map(String::as_str).collect();
        fetcher.with_page(name, StaticPage::new(name, &links))
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_dense_graph_dedup_under_contention() {
    let nodes = 40;
    let fetcher = Arc::new(complete_graph(nodes));

    let report = run(fetcher.clone(), "node-0", 4, 8).await;

    // Every address is claimed exactly once; a claim either fetches or, if
    // the claiming task had no depth left, stops there.
    assert_eq!(report.pages.len() + report.stats.depth_exhausted, nodes);
    for n in 0..nodes {
        assert!(fetcher.fetch_count(&format!("node-{}", n)).await <= 1);
    }
    assert_eq!(fetcher.total_fetches().await, report.pages.len());

    // Seed plus (nodes - 1) links from every fetched page
    assert_eq!(report.stats.submitted, 1 + report.pages.len() * (nodes - 1));
    assert_eq!(report.stats.duplicates, report.stats.submitted - nodes);
    assert!(report.is_balanced());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_crawls_run_side_by_side() {
    let fetcher = Arc::new(StaticFetcher::sample());
    let controller = Arc::new(CrawlerController::new(
        CrawlerSettings { max_depth: 4, workers: 2 },
        fetcher.clone(),
    ));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.crawl("http://golang.org/", 4).await })
    };
    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.crawl("http://golang.org/", 4).await })
    };

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    // Each crawl has its own registry
    assert_eq!(first.pages.len(), 4);
    assert_eq!(second.pages.len(), 4);
    assert_ne!(first.crawl_id, second.crawl_id);
    assert_eq!(fetcher.fetch_count("http://golang.org/").await, 2);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let fetcher = Arc::new(StaticFetcher::sample());
    let report = run(fetcher, "http://golang.org/", 1, 2).await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["seed"], "http://golang.org/");
    assert_eq!(json["stats"]["expanded"], 1);
    assert_eq!(json["pages"][0]["content"], "The Go Programming Language");
}
