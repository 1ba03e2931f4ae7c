//! Subgenre ranking use cases
//!
//! A valid, non-empty cache short-circuits harvesting entirely. On a cold run one
//! undated partition is harvested, optionally filtered, deduplicated,
//! keyword-enriched and cached before classification and ranking.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use crate::application::dto::{RunReport, SubgenreRow};
use crate::application::enrichment::KeywordEnricher;
use crate::application::harvester::PaginatedHarvester;
use crate::domain::{
    CatalogItem, CatalogQuery, CatalogSource, ItemFilter, KeywordClassifier, KeywordSource,
    Partition, Ranker, dedup_by_id,
};
use crate::infrastructure::cache_store::{BlobStore, CacheLoad, CacheStore};
use crate::infrastructure::dataset_emitter::DatasetEmitter;

/// Label of the single undated partition feeding classification
pub const BULK_PARTITION_LABEL: &str = "all";

pub struct SubgenreDatasetUseCases<S, K, B>
where
    S: CatalogSource + ?Sized,
    K: KeywordSource + ?Sized,
    B: BlobStore,
{
    harvester: PaginatedHarvester<S>,
    enricher: KeywordEnricher<K>,
    cache: CacheStore<B>,
    genre_id: u32,
    filter: Option<ItemFilter>,
    classifier: KeywordClassifier,
    ranker: Ranker,
    emitter: DatasetEmitter,
    output_path: PathBuf,
}

impl<S, K, B> SubgenreDatasetUseCases<S, K, B>
where
    S: CatalogSource + ?Sized,
    K: KeywordSource + ?Sized,
    B: BlobStore,
{
    pub fn new(
        harvester: PaginatedHarvester<S>,
        enricher: KeywordEnricher<K>,
        cache: CacheStore<B>,
        genre_id: u32,
        filter: Option<ItemFilter>,
        classifier: KeywordClassifier,
        ranker: Ranker,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            harvester,
            enricher,
            cache,
            genre_id,
            filter,
            classifier,
            ranker,
            emitter: DatasetEmitter::new(),
            output_path: output_path.into(),
        }
    }

    /// Cached collection, or a fresh harvest that is then cached.
    pub async fn load_or_harvest(&self, report: &mut RunReport) -> Vec<CatalogItem> {
        match self.cache.load().await {
            CacheLoad::Hit(items) if !items.is_empty() => {
                report.cache_hit = true;
                return items;
            }
            CacheLoad::Hit(_) => {
                info!("Cached collection is empty, harvesting again");
            }
            CacheLoad::Discarded { reason } => {
                info!("Falling back to a cold harvest after discarding cache: {}", reason);
            }
            CacheLoad::Absent => {}
        }

        let items = self.harvest_fresh(report).await;
        // Empty harvests are never cached
        if items.is_empty() {
            warn!("⚠️ Harvest returned no items, cache left untouched");
        } else if let Err(e) = self.cache.save(&items).await {
            warn!("⚠️ Failed to save cache, next run will harvest again: {:#}", e);
        }
        items
    }

    async fn harvest_fresh(&self, report: &mut RunReport) -> Vec<CatalogItem> {
        let before = self.harvester.retry_manager().get_retry_stats();

        let query = CatalogQuery::new(self.genre_id, Partition::unbounded(BULK_PARTITION_LABEL));
        let harvest = self.harvester.harvest(&query).await;
        report.record_harvest(BULK_PARTITION_LABEL, &harvest);

        let items = match &self.filter {
            Some(filter) => filter.apply(harvest.items),
            None => harvest.items,
        };
        let mut items = dedup_by_id(items);
        self.enricher.enrich(&mut items).await;

        report.record_retries(self.harvester.retry_manager().get_retry_stats().since(before));
        items
    }

    /// Build the subgenre ranking and write it to the configured path.
    pub async fn execute(&self) -> Result<RunReport> {
        let mut report = RunReport::new("subgenres");
        let items = self.load_or_harvest(&mut report).await;

        let buckets = self.classifier.classify(&items);
        for bucket in &buckets {
            info!("🔪 {}: {} matching items", bucket.category, bucket.items.len());
        }

        let rows: Vec<SubgenreRow> = self
            .ranker
            .rank_all(&buckets)
            .into_iter()
            .map(SubgenreRow::from)
            .collect();
        report.rows_written = self.emitter.emit(self.output_path.clone(), rows).await?;

        report.log_summary();
        Ok(report)
    }
}
