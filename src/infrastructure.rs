//! Infrastructure layer for configuration, logging and external integrations
//!
//! Concrete implementations of the domain collaborators (the remote catalog
//! client), the retry wrapper around them, and file-backed cache and dataset
//! storage.

pub mod cache_store;
pub mod config; // Configuration constants and helpers
pub mod dataset_emitter;
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod retry_manager;
pub mod tmdb_client;

// Re-export commonly used items
pub use cache_store::{BlobStore, CacheLoad, CacheStore, FileBlobStore, MemoryBlobStore};
pub use config::{AppConfig, ConfigManager};
pub use dataset_emitter::{DatasetEmitter, TabularRow};
pub use http_client::{HttpClient, HttpClientConfig};
pub use retry_manager::{RetryManager, RetryPolicy, RetryStats};
pub use tmdb_client::TmdbClient;
