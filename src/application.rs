//! Application layer module
//!
//! Use cases that wire the harvester, enrichment, cache and emitter into the
//! two dataset pipelines, plus the row types they produce.

pub mod decade_use_cases;
pub mod dto;
pub mod enrichment;
pub mod harvester;
pub mod subgenre_use_cases;

// Re-export commonly used items
pub use decade_use_cases::DecadeDatasetUseCases;
pub use dto::{DecadeRow, RunReport, SubgenreRow};
pub use enrichment::KeywordEnricher;
pub use harvester::PaginatedHarvester;
pub use subgenre_use_cases::SubgenreDatasetUseCases;
