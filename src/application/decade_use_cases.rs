//! Decade dataset use cases
//!
//! Harvests every configured decade partition in order, filters each one,
//! stamps the partition label, then deduplicates the concatenation and
//! writes it out.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::application::dto::{DecadeRow, RunReport};
use crate::application::harvester::PaginatedHarvester;
use crate::domain::{CatalogItem, CatalogQuery, CatalogSource, ItemFilter, Partition, dedup_by_id};
use crate::infrastructure::dataset_emitter::DatasetEmitter;

pub struct DecadeDatasetUseCases<S: CatalogSource + ?Sized> {
    harvester: PaginatedHarvester<S>,
    filter: ItemFilter,
    partitions: Vec<Partition>,
    emitter: DatasetEmitter,
    output_path: PathBuf,
}

impl<S: CatalogSource + ?Sized> DecadeDatasetUseCases<S> {
    pub fn new(
        harvester: PaginatedHarvester<S>,
        filter: ItemFilter,
        partitions: Vec<Partition>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            harvester,
            filter,
            partitions,
            emitter: DatasetEmitter::new(),
            output_path: output_path.into(),
        }
    }

    /// Harvest, filter, label and deduplicate every partition.
    pub async fn collect(&self, report: &mut RunReport) -> Vec<CatalogItem> {
        let before = self.harvester.retry_manager().get_retry_stats();
        let mut combined = Vec::new();

        for partition in &self.partitions {
            let query = CatalogQuery::new(self.filter.genre_id, partition.clone());
            let harvest = self.harvester.harvest(&query).await;
            report.record_harvest(&partition.label, &harvest);

            let raw = harvest.items.len();
            let accepted: Vec<CatalogItem> = self
                .filter
                .apply(harvest.items)
                .into_iter()
                .map(|item| item.with_partition(&partition.label))
                .collect();
            info!(
                "🎬 {}: {} of {} items accepted",
                partition.label,
                accepted.len(),
                raw
            );
            combined.extend(accepted);
        }

        let before_dedup = combined.len();
        let unique = dedup_by_id(combined);
        info!(
            "Decade dataset: {} unique items ({} duplicates dropped)",
            unique.len(),
            before_dedup - unique.len()
        );

        report.record_retries(self.harvester.retry_manager().get_retry_stats().since(before));
        unique
    }

    /// Build the decade dataset and write it to the configured path.
    pub async fn execute(&self) -> Result<RunReport> {
        let mut report = RunReport::new("decades");
        let items = self.collect(&mut report).await;

        let rows: Vec<DecadeRow> = items.iter().map(DecadeRow::from).collect();
        report.rows_written = self.emitter.emit(self.output_path.clone(), rows).await?;

        report.log_summary();
        Ok(report)
    }
}
