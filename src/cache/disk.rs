use crate::cache::{CacheStats, TileCache, TileKey};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tile cache in a fixed directory laid out as `{z}/{x}/{y}.png`.
///
/// Survives restarts and is shared by every request; nothing is ever evicted.
pub struct DiskTileCache {
    root: PathBuf,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DiskTileCache {
    /// Create the cache root if needed. Fails when the directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!("Tile cache directory: {}", root.display());

        Ok(DiskTileCache {
            root,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tile_path(&self, key: &TileKey) -> PathBuf {
        self.root
            .join(key.z.to_string())
            .join(key.x.to_string())
            .join(format!("{}.png", key.y))
    }
}

#[async_trait]
impl TileCache for DiskTileCache {
    async fn get_tile(&self, key: &TileKey) -> Option<Vec<u8>> {
        match tokio::fs::read(self.tile_path(key)).await {
            Ok(bytes) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Disk cache hit for tile: {}", key);
                Some(bytes)
            }
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Disk cache miss for tile: {}", key);
                None
            }
        }
    }

    async fn store_tile(&self, key: &TileKey, bytes: &[u8]) {
        let path = self.tile_path(key);
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!("Failed to create tile cache dir {}: {}", parent.display(), e);
                return;
            }
        }
        match tokio::fs::write(&path, bytes).await {
            Ok(()) => tracing::debug!("Disk cached tile {} ({} bytes)", key, bytes.len()),
            Err(e) => tracing::warn!("Failed to cache tile {}: {}", key, e),
        }
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}
