//! Pagination state machine for a single partition.
//!
//! States: `Fetching { page }` until one of the terminal outcomes is reached.
//! The transition only looks at the fetched page, so it is a pure function
//! and can be exercised without any I/O.

use serde::Serialize;

use crate::domain::catalog::CatalogItem;

pub const DEFAULT_MAX_PAGES: u32 = 200;

/// How a partition's harvest ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestTermination {
    /// The very first page was empty (or its request failed).
    EmptyFirstPage,
    /// A later page was empty (or failed); everything before it is kept.
    /// Failure and true end-of-data look the same at this layer.
    EmptyPage { page: u32 },
    /// The reported last page was reached.
    Exhausted,
    /// The safety cap on pages stopped the harvest; data is partial.
    LimitReached { max_pages: u32 },
}

impl HarvestTermination {
    pub const fn is_limit_reached(self) -> bool {
        matches!(self, Self::LimitReached { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestState {
    Fetching { page: u32 },
    Done(HarvestTermination),
}

impl HarvestState {
    pub const fn initial() -> Self {
        Self::Fetching { page: 1 }
    }

    /// Advance after fetching `page`, which returned `item_count` items and
    /// reported `total_pages`. Order of checks: empty page, exhaustion,
    /// safety limit.
    pub fn next(page: u32, item_count: usize, total_pages: u32, max_pages: u32) -> Self {
        if item_count == 0 {
            return Self::Done(if page == 1 {
                HarvestTermination::EmptyFirstPage
            } else {
                HarvestTermination::EmptyPage { page }
            });
        }
        if page >= total_pages {
            return Self::Done(HarvestTermination::Exhausted);
        }
        if page >= max_pages {
            return Self::Done(HarvestTermination::LimitReached { max_pages });
        }
        Self::Fetching { page: page + 1 }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Accumulated raw output of one partition (never filtered nor deduplicated).
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionHarvest {
    pub items: Vec<CatalogItem>,
    pub pages_fetched: u32,
    pub termination: HarvestTermination,
}
