//! Item acceptance rules
//!
//! An item is kept only when every predicate holds. Each predicate is a
//! separate method so it can be checked on its own; rejected items are
//! dropped without any error.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;

/// Minimum-quality thresholds plus the genre every item must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    pub min_score: f64,
    pub min_votes: u64,
    pub min_popularity: f64,
    pub genre_id: u32,
}

impl ItemFilter {
    pub const DEFAULT_MIN_SCORE: f64 = 1.0;
    pub const DEFAULT_MIN_VOTES: u64 = 10;
    pub const DEFAULT_MIN_POPULARITY: f64 = 5.0;

    pub fn for_genre(genre_id: u32) -> Self {
        Self {
            min_score: Self::DEFAULT_MIN_SCORE,
            min_votes: Self::DEFAULT_MIN_VOTES,
            min_popularity: Self::DEFAULT_MIN_POPULARITY,
            genre_id,
        }
    }

    pub fn has_release_date(&self, item: &CatalogItem) -> bool {
        item.release_date
            .as_deref()
            .is_some_and(|date| !date.trim().is_empty())
    }

    /// Unrated records come back as 0 and fail here.
    pub fn meets_score(&self, item: &CatalogItem) -> bool {
        item.vote_average.is_some_and(|score| score >= self.min_score)
    }

    pub fn meets_votes(&self, item: &CatalogItem) -> bool {
        item.vote_count.unwrap_or(0) >= self.min_votes
    }

    pub fn meets_popularity(&self, item: &CatalogItem) -> bool {
        item.popularity
            .is_some_and(|popularity| popularity >= self.min_popularity)
    }

    /// Upstream queries already filter by genre; this re-checks the tags.
    pub fn has_genre(&self, item: &CatalogItem) -> bool {
        item.genre_ids.contains(&self.genre_id)
    }

    pub fn accepts(&self, item: &CatalogItem) -> bool {
        self.has_release_date(item)
            && self.meets_score(item)
            && self.meets_votes(item)
            && self.meets_popularity(item)
            && self.has_genre(item)
    }

    /// Keep accepted items in their original order.
    pub fn apply(&self, items: Vec<CatalogItem>) -> Vec<CatalogItem> {
        let before = items.len();
        let kept: Vec<CatalogItem> = items.into_iter().filter(|item| self.accepts(item)).collect();
        tracing::debug!(before, after = kept.len(), "Applied item filter");
        kept
    }
}
