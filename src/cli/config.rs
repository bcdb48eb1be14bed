use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use tracing::{info, debug, error};

/// Default depth budget for the seed
pub const DEFAULT_MAX_DEPTH: u32 = 4;

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 4;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CoordinatorConfig {
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Crawler-specific settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Depth budget given to the seed when none is passed on the command line
    pub max_depth: u32,
    /// Number of concurrent workers
    pub workers: usize,
}

/// Logging settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl CrawlerSettings {
    /// Check the settings can drive a crawl
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        Ok(())
    }
}

impl CoordinatorConfig {
    /// Get the path to the config directory
    fn config_dir() -> PathBuf {
        let path = if let Some(proj_dirs) = directories::ProjectDirs::from("com", "crawl-coordinator", "crawl-coordinator") {
            proj_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from("./config")
        };

        if !path.exists() {
            if let Err(e) = fs::create_dir_all(&path) {
                error!("Failed to create config directory: {}", e);
            }
        }

        path
    }

    /// Load the default configuration
    pub fn load_default() -> Result<Self> {
        let config_path = Self::config_dir().join("default.yaml");

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            // Create and save the default configuration
            info!("Default configuration not found. Creating...");
            let config = Self::default();
            config.save_as_default()?;
            Ok(config)
        }
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read configuration file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .context(format!("Failed to parse configuration file: {}", path.display()))?;

        config.validate()
            .context(format!("Invalid configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Check the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.crawler.validate()
    }

    /// Save the configuration as the default
    pub fn save_as_default(&self) -> Result<()> {
        let config_path = Self::config_dir().join("default.yaml");
        self.save_to_file(&config_path)
    }

    /// Save the configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let contents = serde_yaml::to_string(self)
            .context("Failed to serialize configuration")?;

        fs::write(path, contents)
            .context(format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }
}
