//! Cine Harvest - horror catalog harvesting and ranking
//!
//! Pulls movie metadata from a paginated remote catalog, filters and
//! deduplicates it, and writes two datasets for the dashboards: every
//! accepted item per release decade, and the most popular items per
//! keyword-defined subgenre.

#![allow(clippy::uninlined_format_args)]

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::application::{
    DecadeDatasetUseCases, KeywordEnricher, PaginatedHarvester, RunReport, SubgenreDatasetUseCases,
};
use crate::domain::{CatalogSource, KeywordClassifier, KeywordSource, Ranker};
use crate::infrastructure::config::defaults;
use crate::infrastructure::{
    AppConfig, CacheStore, ConfigManager, FileBlobStore, RetryManager, RetryPolicy, TmdbClient, logging,
};

#[derive(Debug, Parser)]
#[command(
    name = "cine-harvest",
    version,
    about = "Harvest horror movie metadata and build decade and subgenre datasets"
)]
pub struct Cli {
    /// Path to the JSON config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Catalog API key, overriding the config file
    #[arg(long, env = defaults::API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Safety cap on pages per partition
    #[arg(long)]
    pub max_pages: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Build the per-decade dataset
    Decades,
    /// Build the top-N per subgenre dataset
    Subgenres,
    /// Build both datasets
    All,
    /// Delete the cached harvest so the next subgenre run starts cold
    InvalidateCache,
}

/// Entry point behind the binary. Failures are logged, never returned.
pub async fn run(cli: Cli) {
    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet
            eprintln!("❌ Configuration error: {:#}", e);
            return;
        }
    };

    if let Err(e) = logging::init_logging_with_config(&config.logging) {
        eprintln!("⚠️ Logging setup failed: {:#}", e);
    }

    let run_id = Uuid::new_v4();
    let span = info_span!("run", run_id = %run_id, command = ?cli.command);
    async {
        info!("🚀 Starting cine-harvest");
        match run_with_remote(&config, cli.command).await {
            Ok(reports) => info!("✅ Run complete ({} pipeline(s))", reports.len()),
            Err(e) => error!("❌ Run failed: {:#}", e),
        }
    }
    .instrument(span)
    .await;
}

/// Config file, then command-line overrides. The API key flag also reads
/// `TMDB_API_KEY`, so the environment goes through clap alone.
pub async fn load_config(cli: &Cli) -> Result<AppConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;

    if let Some(key) = cli.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        config.harvest.api_key = key.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.harvest.max_pages = max_pages;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run_with_remote(config: &AppConfig, command: Command) -> Result<Vec<RunReport>> {
    if command == Command::InvalidateCache {
        return run_with::<TmdbClient, TmdbClient>(config, command, None).await;
    }
    let client = Arc::new(TmdbClient::new(config.harvest.clone()).context("Failed to build catalog client")?);
    run_with(config, command, Some((Arc::clone(&client), client))).await
}

/// Run `command` against the given collaborators.
///
/// `sources` may be `None` only for `Command::InvalidateCache`.
pub async fn run_with<S, K>(
    config: &AppConfig,
    command: Command,
    sources: Option<(Arc<S>, Arc<K>)>,
) -> Result<Vec<RunReport>>
where
    S: CatalogSource + ?Sized,
    K: KeywordSource + ?Sized,
{
    let cache = CacheStore::with_key(
        FileBlobStore::new(&config.output.data_dir),
        config.output.cache_file.clone(),
    );

    let (catalog, keywords) = match (command, sources) {
        (Command::InvalidateCache, _) => {
            cache.invalidate().await?;
            return Ok(Vec::new());
        }
        (_, Some(sources)) => sources,
        (_, None) => anyhow::bail!("No catalog source available for {:?}", command),
    };

    let retry = Arc::new(RetryManager::new(RetryPolicy::from_harvest_config(&config.harvest)));
    let harvester = PaginatedHarvester::from_config(catalog, Arc::clone(&retry), &config.harvest);
    let mut reports = Vec::new();

    if matches!(command, Command::Decades | Command::All) {
        let use_cases = DecadeDatasetUseCases::new(
            harvester.with_max_pages(config.harvest.max_pages),
            config.item_filter(),
            config.partitions(),
            config.decade_dataset_path(),
        );
        reports.push(use_cases.execute().await?);
    }

    if matches!(command, Command::Subgenres | Command::All) {
        let enricher = KeywordEnricher::new(
            keywords,
            Arc::clone(&retry),
            std::time::Duration::from_millis(config.subgenres.keyword_delay_ms),
        );
        let use_cases = SubgenreDatasetUseCases::new(
            harvester.with_max_pages(config.subgenres.pages.min(config.harvest.max_pages)),
            enricher,
            cache,
            config.harvest.genre_id,
            config.subgenres.apply_filter.then(|| config.item_filter()),
            KeywordClassifier::new(config.vocabularies()),
            Ranker::new(config.subgenres.top_n),
            config.subgenre_dataset_path(),
        );
        reports.push(use_cases.execute().await?);
    }

    Ok(reports)
}
