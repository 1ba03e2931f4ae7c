//! Domain module - catalog entities and pipeline rules
//!
//! Pure types and functions: nothing here performs I/O apart from the
//! collaborator traits in `services`, which are implemented elsewhere.

pub mod catalog;
pub mod classifier;
pub mod dedup;
pub mod errors;
pub mod filter;
pub mod harvest;
pub mod ranking;
pub mod services;

// Re-export commonly used items for convenience
pub use catalog::{CatalogItem, CatalogPage, CatalogQuery, ItemId, Partition};
pub use classifier::{CategoryMatches, CategoryVocabulary, KeywordClassifier};
pub use dedup::dedup_by_id;
pub use errors::FetchError;
pub use filter::ItemFilter;
pub use harvest::{HarvestState, HarvestTermination, PartitionHarvest};
pub use ranking::{RankedEntry, Ranker, year_prefix};
pub use services::{CatalogSource, KeywordSource};
