//! Harvest cache
//!
//! A single-slot cache of the pre-classification item collection. Storage is
//! an abstract blob store (`get`/`put`/`delete`); `CacheStore` owns the typed
//! boundary on top of it. There is no expiry: a blob that decodes is a valid
//! cache until someone deletes it. A blob that does not decode is deleted
//! and reported as discarded, so callers fall back to a cold harvest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::CatalogItem;

/// Key under which the harvested dataset is stored
pub const CACHE_KEY: &str = "catalog_cache.json";

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, blob: &[u8]) -> Result<()>;
    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Blobs as files in one directory
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read blob {}", path.display())),
        }
    }

    async fn put(&self, key: &str, blob: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create cache directory {}", self.root.display()))?;

        // Write beside the target, then rename over it
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, blob)
            .await
            .with_context(|| format!("Failed to write blob {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move blob into place at {}", path.display()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob {}", path.display())),
        }
    }
}

/// In-memory blobs, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, blob: &[u8]) -> Result<()> {
        self.blobs.lock().await.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs.lock().await.remove(key);
        Ok(())
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLoad {
    /// A stored dataset decoded successfully
    Hit(Vec<CatalogItem>),
    /// Nothing stored
    Absent,
    /// A stored blob failed to decode and has been deleted
    Discarded { reason: String },
}

impl CacheLoad {
    pub fn into_dataset(self) -> Option<Vec<CatalogItem>> {
        match self {
            Self::Hit(items) => Some(items),
            Self::Absent | Self::Discarded { .. } => None,
        }
    }

    pub const fn is_corrupted(&self) -> bool {
        matches!(self, Self::Discarded { .. })
    }
}

pub struct CacheStore<B: BlobStore> {
    store: B,
    key: String,
}

impl<B: BlobStore> CacheStore<B> {
    pub fn new(store: B) -> Self {
        Self::with_key(store, CACHE_KEY)
    }

    pub fn with_key(store: B, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist the full collection, replacing whatever was stored
    pub async fn save(&self, items: &[CatalogItem]) -> Result<()> {
        let blob = serde_json::to_vec(items).context("Failed to serialize cache dataset")?;
        self.store.put(&self.key, &blob).await?;
        info!("💾 Cache saved: {} items under '{}'", items.len(), self.key);
        Ok(())
    }

    /// Restore the collection. Read and decode failures are never returned
    /// as errors; they degrade to `Absent` or `Discarded`.
    pub async fn load(&self) -> CacheLoad {
        let blob = match self.store.get(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("No cache found under '{}'", self.key);
                return CacheLoad::Absent;
            }
            Err(e) => {
                warn!("⚠️ Cache could not be read, treating as absent: {:#}", e);
                return CacheLoad::Absent;
            }
        };

        match serde_json::from_slice::<Vec<CatalogItem>>(&blob) {
            Ok(items) => {
                info!("📦 Cache loaded: {} items from '{}'", items.len(), self.key);
                CacheLoad::Hit(items)
            }
            Err(e) => {
                warn!("⚠️ Cache '{}' is corrupted, discarding it: {}", self.key, e);
                if let Err(delete_error) = self.store.delete(&self.key).await {
                    warn!("Failed to delete corrupted cache: {:#}", delete_error);
                }
                CacheLoad::Discarded {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Manual invalidation
    pub async fn invalidate(&self) -> Result<()> {
        self.store.delete(&self.key).await?;
        info!("🗑️ Cache '{}' invalidated", self.key);
        Ok(())
    }
}
