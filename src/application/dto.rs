//! Output row types handed to the presentation layer, and run summaries
//!
//! Field order is column order. The column sets are the only contract the
//! dashboards depend on.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{CatalogItem, PartitionHarvest, RankedEntry, year_prefix};
use crate::infrastructure::dataset_emitter::TabularRow;
use crate::infrastructure::retry_manager::RetryStats;

/// One filtered, deduplicated item of the decade dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecadeRow {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub release_date: String,
    pub year: String,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    /// Pipe-separated genre identifiers
    pub genre_ids: String,
    pub decade: String,
}

impl TabularRow for DecadeRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "original_title",
        "original_language",
        "release_date",
        "year",
        "vote_average",
        "vote_count",
        "popularity",
        "genre_ids",
        "decade",
    ];
}

impl From<&CatalogItem> for DecadeRow {
    fn from(item: &CatalogItem) -> Self {
        let release_date = item.release_date.clone().unwrap_or_default();
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            original_title: item.original_title.clone().unwrap_or_default(),
            original_language: item.original_language.clone().unwrap_or_default(),
            year: year_prefix(&release_date).to_string(),
            release_date,
            vote_average: item.vote_average,
            vote_count: item.vote_count,
            popularity: item.popularity,
            genre_ids: item
                .genre_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|"),
            decade: item.partition.clone().unwrap_or_default(),
        }
    }
}

/// One (category, ranked item) pair of the subgenre dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgenreRow {
    pub category: String,
    pub title: String,
    pub popularity: f64,
    pub year: String,
}

impl TabularRow for SubgenreRow {
    const COLUMNS: &'static [&'static str] = &["category", "title", "popularity", "year"];
}

impl From<RankedEntry> for SubgenreRow {
    fn from(entry: RankedEntry) -> Self {
        Self {
            category: entry.category,
            title: entry.title,
            popularity: entry.popularity,
            year: entry.year,
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub pipeline: String,
    pub partitions: usize,
    pub pages_fetched: u32,
    pub retries: u64,
    pub failed_requests: u64,
    /// Labels of partitions cut off by the page cap
    pub limit_reached: Vec<String>,
    pub cache_hit: bool,
    pub rows_written: usize,
}

impl RunReport {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            ..Self::default()
        }
    }

    pub fn record_harvest(&mut self, label: &str, harvest: &PartitionHarvest) {
        self.partitions += 1;
        self.pages_fetched += harvest.pages_fetched;
        if harvest.termination.is_limit_reached() {
            self.limit_reached.push(label.to_string());
        }
    }

    pub fn record_retries(&mut self, stats: RetryStats) {
        self.retries += stats.retries;
        self.failed_requests += stats.failed;
    }

    pub fn log_summary(&self) {
        info!(
            pipeline = %self.pipeline,
            partitions = self.partitions,
            pages = self.pages_fetched,
            retries = self.retries,
            failed = self.failed_requests,
            cache_hit = self.cache_hit,
            "✅ {} finished: {} rows written",
            self.pipeline,
            self.rows_written
        );
        if !self.limit_reached.is_empty() {
            warn!(
                "⚠️ {} partition(s) hit the page cap: {}",
                self.limit_reached.len(),
                self.limit_reached.join(", ")
            );
        }
    }
}
