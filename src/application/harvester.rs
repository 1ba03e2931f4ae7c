//! Paginated harvester
//!
//! Drives the resilient request wrapper page by page for one partition,
//! following `HarvestState` until a terminal state. One request is in
//! flight at a time; successful non-terminal pages are followed by a fixed
//! pause before the next request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{
    CatalogItem, CatalogQuery, CatalogSource, HarvestState, HarvestTermination, PartitionHarvest,
};
use crate::infrastructure::config::HarvestConfig;
use crate::infrastructure::retry_manager::RetryManager;

pub struct PaginatedHarvester<S: CatalogSource + ?Sized> {
    source: Arc<S>,
    retry: Arc<RetryManager>,
    max_pages: u32,
    request_delay: Duration,
}

impl<S: CatalogSource + ?Sized> PaginatedHarvester<S> {
    pub fn new(source: Arc<S>, retry: Arc<RetryManager>, max_pages: u32, request_delay: Duration) -> Self {
        Self {
            source,
            retry,
            max_pages: max_pages.max(1),
            request_delay,
        }
    }

    pub fn from_config(source: Arc<S>, retry: Arc<RetryManager>, config: &HarvestConfig) -> Self {
        Self::new(source, retry, config.max_pages, config.request_delay())
    }

    /// Same source and pacing, different page cap
    pub fn with_max_pages(&self, max_pages: u32) -> Self {
        Self::new(
            Arc::clone(&self.source),
            Arc::clone(&self.retry),
            max_pages,
            self.request_delay,
        )
    }

    pub const fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn retry_manager(&self) -> &Arc<RetryManager> {
        &self.retry
    }

    /// Harvest every page of `query` up to the safety cap.
    pub async fn harvest(&self, query: &CatalogQuery) -> PartitionHarvest {
        let label = query.partition.label.as_str();
        let mut items: Vec<CatalogItem> = Vec::new();
        let mut pages_fetched = 0;
        let mut state = HarvestState::initial();

        info!("🔍 Harvesting partition '{}' (max {} pages)", label, self.max_pages);

        let termination = loop {
            let page = match state {
                HarvestState::Fetching { page } => page,
                HarvestState::Done(termination) => break termination,
            };

            let result = self.retry.fetch_page(self.source.as_ref(), query, page).await;
            pages_fetched += 1;

            let item_count = result.items.len();
            state = HarvestState::next(page, item_count, result.total_pages, self.max_pages);
            items.extend(result.items);

            debug!(
                partition = label,
                page,
                item_count,
                total_pages = result.total_pages,
                "Fetched catalog page"
            );

            if !state.is_terminal() && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        };

        match termination {
            HarvestTermination::LimitReached { max_pages } => {
                warn!(
                    "⚠️ Safety limit reached for '{}' ({} pages); continuing with partial data",
                    label, max_pages
                );
            }
            HarvestTermination::EmptyFirstPage => {
                info!("Partition '{}' returned no data on its first page", label);
            }
            HarvestTermination::EmptyPage { page } => {
                debug!("Partition '{}' ended on empty page {}", label, page);
            }
            HarvestTermination::Exhausted => {}
        }

        info!(
            "📊 Partition '{}' harvested: {} raw items from {} pages",
            label,
            items.len(),
            pages_fetched
        );

        PartitionHarvest {
            items,
            pages_fetched,
            termination,
        }
    }
}
