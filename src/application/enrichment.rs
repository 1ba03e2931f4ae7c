//! Per-item keyword enrichment
//!
//! Lookups run one at a time through the retry wrapper; a failed lookup
//! leaves the item with no keywords rather than aborting the batch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::{CatalogItem, KeywordSource};
use crate::infrastructure::retry_manager::RetryManager;

pub struct KeywordEnricher<K: KeywordSource + ?Sized> {
    source: Arc<K>,
    retry: Arc<RetryManager>,
    delay: Duration,
}

impl<K: KeywordSource + ?Sized> KeywordEnricher<K> {
    pub fn new(source: Arc<K>, retry: Arc<RetryManager>, delay: Duration) -> Self {
        Self { source, retry, delay }
    }

    /// Fill `keywords` on every item, in place. Returns how many items ended
    /// up with at least one keyword.
    pub async fn enrich(&self, items: &mut [CatalogItem]) -> usize {
        let total = items.len();
        info!("🏷️ Fetching keywords for {} items", total);

        let mut tagged = 0;
        for (index, item) in items.iter_mut().enumerate() {
            let keywords = self.retry.fetch_keywords(self.source.as_ref(), &item.id).await;
            item.keywords = keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if !item.keywords.is_empty() {
                tagged += 1;
            }
            debug!(item = %item.id, count = item.keywords.len(), "Keywords attached");

            if index + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!("✅ Keywords attached: {}/{} items tagged", tagged, total);
        tagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchError, ItemId};
    use crate::infrastructure::retry_manager::RetryPolicy;
    use async_trait::async_trait;

    struct Scripted;

    #[async_trait]
    impl KeywordSource for Scripted {
        async fn fetch_keywords(&self, id: &ItemId) -> Result<Vec<String>, FetchError> {
            match id {
                ItemId::Number(1) => Ok(vec![" Serial Killer ".into(), "Knife".into()]),
                ItemId::Number(2) => Err(FetchError::status(404, "keywords/2")),
                _ => Ok(Vec::new()),
            }
        }
    }

    #[tokio::test]
    async fn failed_lookup_leaves_item_untagged() {
        let retry = Arc::new(RetryManager::new(RetryPolicy::no_delay(1)));
        let enricher = KeywordEnricher::new(Arc::new(Scripted), Arc::clone(&retry), Duration::ZERO);
        let mut items = vec![
            CatalogItem::new(1, "a"),
            CatalogItem::new(2, "b"),
            CatalogItem::new(3, "c"),
        ];

        let tagged = enricher.enrich(&mut items).await;

        assert_eq!(tagged, 1);
        assert_eq!(items[0].keywords, vec!["serial killer", "knife"]);
        assert!(items[1].keywords.is_empty());
        assert!(items[2].keywords.is_empty());
        assert_eq!(retry.get_retry_stats().failed, 1);
    }
}
