//! Top-N ranking per category

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;
use crate::domain::classifier::CategoryMatches;

/// One (category, item) pair of a ranked bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub category: String,
    pub title: String,
    pub popularity: f64,
    pub year: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    top_n: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self { top_n: Self::DEFAULT_TOP_N }
    }
}

impl Ranker {
    pub const DEFAULT_TOP_N: usize = 10;

    pub const fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Sort by popularity descending and keep the first `top_n`.
    /// `sort_by` is stable, so equal popularity keeps collection order.
    pub fn top<'a>(&self, items: &[&'a CatalogItem]) -> Vec<&'a CatalogItem> {
        let mut ranked = items.to_vec();
        ranked.sort_by(|a, b| b.popularity_score().total_cmp(&a.popularity_score()));
        ranked.truncate(self.top_n);
        ranked
    }

    pub fn rank_bucket(&self, bucket: &CategoryMatches<'_>) -> Vec<RankedEntry> {
        self.top(&bucket.items)
            .into_iter()
            .map(|item| RankedEntry {
                category: bucket.category.to_string(),
                title: item.title.clone(),
                popularity: item.popularity_score(),
                year: year_prefix(item.release_date.as_deref().unwrap_or_default()).to_string(),
            })
            .collect()
    }

    /// Flatten every bucket, keeping bucket order.
    pub fn rank_all(&self, buckets: &[CategoryMatches<'_>]) -> Vec<RankedEntry> {
        buckets.iter().flat_map(|bucket| self.rank_bucket(bucket)).collect()
    }
}

/// First four characters of a date string, or whatever is there if shorter.
pub fn year_prefix(date: &str) -> &str {
    match date.char_indices().nth(4) {
        Some((end, _)) => &date[..end],
        None => date,
    }
}
