//! Identifier-based deduplication
//!
//! The first occurrence of an identifier wins; later duplicates are dropped
//! and the retained items keep their relative order.

use std::collections::HashSet;

use crate::domain::catalog::CatalogItem;

pub fn dedup_by_id(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();

    let unique: Vec<CatalogItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    let dropped = before - unique.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = unique.len(), "Removed duplicate catalog items");
    }
    unique
}
