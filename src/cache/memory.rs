use crate::cache::{CacheStats, TileCache, TileKey};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory tile cache backed by moka with bounded capacity.
/// Every method takes `&self`; moka does its own locking.
pub struct MemoryTileCache {
    tiles: Cache<TileKey, Arc<Vec<u8>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryTileCache {
    pub fn new(max_capacity: u64) -> Self {
        let tiles = Cache::builder().max_capacity(max_capacity).build();

        MemoryTileCache {
            tiles,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl TileCache for MemoryTileCache {
    async fn get_tile(&self, key: &TileKey) -> Option<Vec<u8>> {
        match self.tiles.get(key).await {
            Some(bytes) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache hit for tile: {}", key);
                Some((*bytes).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache miss for tile: {}", key);
                None
            }
        }
    }

    async fn store_tile(&self, key: &TileKey, bytes: &[u8]) {
        self.tiles.insert(*key, Arc::new(bytes.to_vec())).await;
        tracing::debug!("Memory cached tile {} ({} bytes)", key, bytes.len());
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
