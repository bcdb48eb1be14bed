use anyhow::Result;
use tracing::{info, error};

use crawl_coordinator::cli;
use crawl_coordinator::utils::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = cli::parse_args();
    let config = cli::load_config(&args)?;

    // Initialize logging
    let verbose = args.verbose || config.logging.verbose;
    let log_file = args.log_file.clone().or_else(|| config.logging.log_file.clone());
    init_logging(verbose, log_file)?;

    info!("Starting crawl coordinator v{}", env!("CARGO_PKG_VERSION"));

    // Process commands
    match cli::process_command(args, config).await {
        Ok(_) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        }
    }
}
