pub mod commands;
pub mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use config::CoordinatorConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl from a seed address
    Crawl {
        /// Address to start crawling from
        #[arg(required = true)]
        seed: String,

        /// Maximum number of link hops from the seed
        #[arg(short, long)]
        depth: Option<u32>,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// YAML site map to crawl (defaults to the built-in sample site)
        #[arg(short, long)]
        site_map: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

/// Parse command line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Load the configuration named on the command line, or the default one
pub fn load_config(cli: &Cli) -> Result<CoordinatorConfig> {
    match &cli.config {
        Some(path) => CoordinatorConfig::load_from_file(path),
        None => CoordinatorConfig::load_default(),
    }
}

/// Process the command
pub async fn process_command(cli: Cli, config: CoordinatorConfig) -> Result<()> {
    match cli.command {
        Commands::Crawl { seed, depth, workers, site_map, json } => {
            let args = commands::CrawlArgs { seed, depth, workers, site_map, json };
            commands::crawl(args, config).await
        },
        Commands::Config => {
            info!("Showing current configuration");
            commands::show_config(&config)
        },
    }
}
