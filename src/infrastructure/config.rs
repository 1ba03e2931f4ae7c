//! Configuration infrastructure
//!
//! Contains configuration loading and management for catalog harvesting.
//!
//! Configuration is organized into sections:
//! 1. Harvest settings (credential, endpoint, limits, request pacing)
//! 2. Item filter thresholds
//! 3. Partition (decade) and category (subgenre) definitions
//! 4. Output locations and logging

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use crate::domain::{CategoryVocabulary, ItemFilter, Partition};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote catalog access and pagination limits
    pub harvest: HarvestConfig,

    /// Acceptance thresholds for harvested items
    pub filter: FilterConfig,

    /// Decade partitions for the decade dataset
    pub decades: Vec<DecadeConfig>,

    /// Keyword categories for the subgenre dataset
    pub subgenres: SubgenreConfig,

    /// Output file locations
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Explicit harvesting configuration passed to the fetcher and harvester
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Static API credential
    pub api_key: String,

    /// Catalog API root, without trailing slash
    pub base_url: String,

    /// Genre every harvested item must carry
    pub genre_id: u32,

    /// Safety cap on pages per partition
    pub max_pages: u32,

    /// Pause between successful page requests in milliseconds
    pub request_delay_ms: u64,

    /// Extra attempts after a failed request
    pub retry_count: u32,

    /// Fixed pause before each retry in milliseconds
    pub retry_delay_ms: u64,

    /// Timeout for HTTP requests in seconds
    pub request_timeout_seconds: u64,

    /// Response language
    pub language: String,

    /// Remote sort order
    pub sort_by: String,

    pub user_agent: String,
}

/// Item filter thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_score: f64,
    pub min_votes: u64,
    pub min_popularity: f64,
}

/// One decade partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecadeConfig {
    pub label: String,
    pub start_year: i32,
    pub end_year: i32,
}

/// Subgenre (keyword category) dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgenreConfig {
    /// Pages of the bulk pull that feeds classification
    pub pages: u32,

    /// Items kept per category
    pub top_n: usize,

    /// Pause between keyword lookups in milliseconds
    pub keyword_delay_ms: u64,

    /// Run the item filter on the bulk pull before enrichment
    pub apply_filter: bool,

    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Output file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub decade_dataset_file: String,
    pub subgenre_dataset_file: String,
    pub cache_file: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for daily log files
    pub log_dir: PathBuf,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            harvest: HarvestConfig::default(),
            filter: FilterConfig::default(),
            decades: default_decades(),
            subgenres: SubgenreConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: tmdb::BASE_URL.to_string(),
            genre_id: defaults::GENRE_ID,
            max_pages: defaults::MAX_PAGES,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            retry_count: defaults::RETRY_COUNT,
            retry_delay_ms: defaults::RETRY_DELAY_MS,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            language: defaults::LANGUAGE.to_string(),
            sort_by: defaults::SORT_BY.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_score: ItemFilter::DEFAULT_MIN_SCORE,
            min_votes: ItemFilter::DEFAULT_MIN_VOTES,
            min_popularity: ItemFilter::DEFAULT_MIN_POPULARITY,
        }
    }
}

impl Default for SubgenreConfig {
    fn default() -> Self {
        Self {
            pages: defaults::SUBGENRE_PAGES,
            top_n: defaults::TOP_N,
            keyword_delay_ms: defaults::REQUEST_DELAY_MS,
            apply_filter: true,
            categories: defaults::SUBGENRES
                .iter()
                .map(|(name, keywords)| CategoryConfig {
                    name: (*name).to_string(),
                    keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DATA_DIR),
            decade_dataset_file: defaults::DECADE_DATASET_FILE.to_string(),
            subgenre_dataset_file: defaults::SUBGENRE_DATASET_FILE.to_string(),
            cache_file: defaults::CACHE_FILE.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.harvest.max_pages == 0 {
            bail!("harvest.max_pages must be at least 1");
        }
        if self.subgenres.pages == 0 {
            bail!("subgenres.pages must be at least 1");
        }
        if self.subgenres.top_n == 0 {
            bail!("subgenres.top_n must be at least 1");
        }
        for decade in &self.decades {
            if decade.start_year > decade.end_year {
                bail!(
                    "decade '{}' starts after it ends ({} > {})",
                    decade.label,
                    decade.start_year,
                    decade.end_year
                );
            }
        }
        for category in &self.subgenres.categories {
            if category.keywords.iter().all(|k| k.trim().is_empty()) {
                bail!("category '{}' has no keywords", category.name);
            }
        }
        Ok(())
    }

    pub fn item_filter(&self) -> ItemFilter {
        ItemFilter {
            min_score: self.filter.min_score,
            min_votes: self.filter.min_votes,
            min_popularity: self.filter.min_popularity,
            genre_id: self.harvest.genre_id,
        }
    }

    pub fn partitions(&self) -> Vec<Partition> {
        self.decades
            .iter()
            .map(|d| Partition::decade(d.label.clone(), d.start_year, d.end_year))
            .collect()
    }

    pub fn vocabularies(&self) -> Vec<CategoryVocabulary> {
        self.subgenres
            .categories
            .iter()
            .map(|c| CategoryVocabulary::new(c.name.clone(), c.keywords.clone()))
            .collect()
    }

    pub fn decade_dataset_path(&self) -> PathBuf {
        self.output.data_dir.join(&self.output.decade_dataset_file)
    }

    pub fn subgenre_dataset_path(&self) -> PathBuf {
        self.output.data_dir.join(&self.output.subgenre_dataset_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.output.data_dir.join(&self.output.cache_file)
    }
}

impl HarvestConfig {
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_decades() -> Vec<DecadeConfig> {
    defaults::DECADES
        .iter()
        .map(|(label, start, end)| DecadeConfig {
            label: (*label).to_string(),
            start_year: *start,
            end_year: *end,
        })
        .collect()
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("cine-harvest");

        Ok(config_dir)
    }

    /// Configuration manager at the default per-user location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.json");
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist.
    /// A file that fails to parse is backed up and replaced by defaults.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;

                info!("✅ Reset to default configuration");
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Remote catalog endpoints and query parameter names
pub mod tmdb {
    /// API root of the movie catalog
    pub const BASE_URL: &str = "https://api.themoviedb.org/3";

    /// Paginated discovery endpoint
    pub const DISCOVER_PATH: &str = "/discover/movie";

    /// Per-movie keyword endpoint
    pub fn keywords_path(movie_id: &str) -> String {
        format!("/movie/{}/keywords", movie_id)
    }

    pub mod params {
        pub const API_KEY: &str = "api_key";
        pub const WITH_GENRES: &str = "with_genres";
        pub const PAGE: &str = "page";
        pub const SORT_BY: &str = "sort_by";
        pub const LANGUAGE: &str = "language";
        pub const RELEASE_DATE_GTE: &str = "primary_release_date.gte";
        pub const RELEASE_DATE_LTE: &str = "primary_release_date.lte";
    }
}

/// Default configuration values
pub mod defaults {
    /// Horror
    pub const GENRE_ID: u32 = 27;

    /// Default safety cap on pages per partition
    pub const MAX_PAGES: u32 = crate::domain::harvest::DEFAULT_MAX_PAGES;

    /// Default delay between requests in milliseconds
    pub const REQUEST_DELAY_MS: u64 = 150;

    /// One retry after the first failure
    pub const RETRY_COUNT: u32 = 1;

    /// Default retry delay in milliseconds
    pub const RETRY_DELAY_MS: u64 = 1000;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    pub const LANGUAGE: &str = "en-US";
    pub const SORT_BY: &str = "popularity.desc";
    pub const USER_AGENT: &str = "cine-harvest/0.1 (dataset research)";

    /// Environment variable overriding the API credential
    pub const API_KEY_ENV: &str = "TMDB_API_KEY";

    /// Pages of the bulk pull used for subgenre ranking
    pub const SUBGENRE_PAGES: u32 = 5;

    /// Items kept per subgenre
    pub const TOP_N: usize = 10;

    pub const DECADES: &[(&str, i32, i32)] = &[
        ("1980-1989", 1980, 1989),
        ("1990-1999", 1990, 1999),
        ("2000-2009", 2000, 2009),
        ("2010-2019", 2010, 2019),
        ("2020-2025", 2020, 2025),
    ];

    pub const SUBGENRES: &[(&str, &[&str])] = &[
        ("slasher", &["slasher", "serial killer", "knife", "stalker"]),
        ("found_footage", &["found footage"]),
        ("gore", &["gore", "extreme violence"]),
        ("paranormal", &["ghost", "demon", "haunted house"]),
        ("psychological", &["psychological horror", "psychological thriller"]),
    ];

    pub const DATA_DIR: &str = "data";
    pub const DECADE_DATASET_FILE: &str = "horror_by_decade.csv";
    pub const SUBGENRE_DATASET_FILE: &str = "top_by_subgenre.csv";
    pub const CACHE_FILE: &str = "catalog_cache.json";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_DIR: &str = "logs";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.harvest.max_pages, 200);
        assert_eq!(config.harvest.retry_count, 1);
        assert_eq!(config.harvest.genre_id, 27);
        assert_eq!(config.decades.len(), 5);
        assert_eq!(config.subgenres.categories.len(), 5);
        assert_eq!(config.subgenres.top_n, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn item_filter_uses_harvest_genre() {
        let mut config = AppConfig::default();
        config.harvest.genre_id = 53;
        config.filter.min_votes = 100;
        let filter = config.item_filter();
        assert_eq!(filter.genre_id, 53);
        assert_eq!(filter.min_votes, 100);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.harvest.max_pages = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.decades[0].start_year = 2100;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.subgenres.categories[0].keywords = vec![" ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"harvest": {"max_pages": 5}}"#).unwrap();
        assert_eq!(config.harvest.max_pages, 5);
        assert_eq!(config.harvest.request_delay_ms, 150);
        assert_eq!(config.output.cache_file, "catalog_cache.json");
    }

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));
        let config = manager.load_config().await.unwrap();
        assert_eq!(config.decades.len(), 5);
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn corrupted_file_is_backed_up_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await.unwrap();
        assert_eq!(config.harvest.max_pages, 200);
        assert!(path.with_extension("json.corrupted").exists());
    }
}
