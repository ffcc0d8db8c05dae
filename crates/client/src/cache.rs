//! Durable local mirror of the cart's line items.
//!
//! The cache exists so the cart survives a cold start before the first
//! remote pull completes; a successful pull always supersedes it. Writes are
//! fire-and-forget from the coordinator's perspective, but complete before
//! the next `load` in the same process is relied upon. There is no
//! cross-process guarantee.
//!
//! Cache failures never interrupt the user-visible flow: the coordinator
//! logs them and keeps working from memory for the rest of the session.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use tangelo_core::CartItem;

const CACHE_FILE_NAME: &str = "cart.json";

/// Errors from the durable cart cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Underlying storage is unavailable or unwritable.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cached payload could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A durable store for the current cart's line items.
#[async_trait]
pub trait CartCache: Send + Sync {
    /// Overwrite the cached items with the given snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the snapshot cannot be persisted.
    async fn save(&self, items: &[CartItem]) -> Result<(), CacheError>;

    /// Load the cached items, or an empty list when nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if a cached payload exists but cannot be read.
    async fn load(&self) -> Result<Vec<CartItem>, CacheError>;

    /// Remove the cached items.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cached payload cannot be removed.
    async fn clear(&self) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: CartCache + ?Sized> CartCache for std::sync::Arc<T> {
    async fn save(&self, items: &[CartItem]) -> Result<(), CacheError> {
        (**self).save(items).await
    }

    async fn load(&self) -> Result<Vec<CartItem>, CacheError> {
        (**self).load().await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        (**self).clear().await
    }
}

/// On-disk envelope for the cached cart.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    saved_at: DateTime<Utc>,
    items: Vec<CartItem>,
}

/// File-backed cart cache: a single JSON document under the cache directory.
///
/// Saves go through a temp file followed by a rename, so an interrupted
/// write can never truncate an existing cache.
#[derive(Debug, Clone)]
pub struct FileCartCache {
    path: PathBuf,
}

impl FileCartCache {
    /// Create a cache rooted at the given directory.
    ///
    /// The directory is created lazily on the first save.
    #[must_use]
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(CACHE_FILE_NAME),
        }
    }
}

#[async_trait]
impl CartCache for FileCartCache {
    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn save(&self, items: &[CartItem]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let envelope = CacheEnvelope {
            saved_at: Utc::now(),
            items: items.to_vec(),
        };
        let payload = serde_json::to_vec(&envelope)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("cart cache saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Vec<CartItem>, CacheError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let envelope: CacheEnvelope = serde_json::from_slice(&raw)?;
        Ok(envelope.items)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory cart cache for tests and cache-less operation.
#[derive(Debug, Default)]
pub struct MemoryCartCache {
    items: std::sync::Mutex<Option<Vec<CartItem>>>,
}

impl MemoryCartCache {
    /// Create an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartCache for MemoryCartCache {
    async fn save(&self, items: &[CartItem]) -> Result<(), CacheError> {
        *self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(items.to_vec());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<CartItem>, CacheError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .unwrap_or_default())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        *self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tangelo_core::ProductId;

    use super::*;

    fn item(id: i64, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Decimal::new(1099, 2),
            image: format!("https://img.example/{id}.jpg"),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_file_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCartCache::new(dir.path());

        let items = vec![item(1, 2), item(2, 1)];
        cache.save(&items).await.unwrap();

        assert_eq!(cache.load().await.unwrap(), items);
    }

    #[tokio::test]
    async fn test_file_cache_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCartCache::new(dir.path());

        assert!(cache.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_cache_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCartCache::new(dir.path());

        cache.save(&[item(1, 2)]).await.unwrap();
        cache.save(&[item(3, 5)]).await.unwrap();

        let loaded = cache.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, ProductId::new(3));
    }

    #[tokio::test]
    async fn test_file_cache_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCartCache::new(dir.path());

        cache.save(&[item(1, 2)]).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.load().await.unwrap().is_empty());

        // Clearing an already-empty cache is fine
        cache.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_payload_errors() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCartCache::new(dir.path());

        tokio::fs::write(dir.path().join(CACHE_FILE_NAME), b"not json")
            .await
            .unwrap();

        assert!(matches!(cache.load().await, Err(CacheError::Serde(_))));
    }

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryCartCache::new();
        assert!(cache.load().await.unwrap().is_empty());

        cache.save(&[item(1, 4)]).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), vec![item(1, 4)]);

        cache.clear().await.unwrap();
        assert!(cache.load().await.unwrap().is_empty());
    }
}
