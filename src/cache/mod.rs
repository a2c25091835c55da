pub mod disk;
pub mod memory;

pub use disk::DiskTileCache;
pub use memory::MemoryTileCache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of one slippy-map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        TileKey { z, x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Store for encoded basemap tiles, shared by every request in the process.
///
/// Entries are never invalidated; a failed write only costs a re-download.
#[async_trait]
pub trait TileCache: Send + Sync {
    async fn get_tile(&self, key: &TileKey) -> Option<Vec<u8>>;
    async fn store_tile(&self, key: &TileKey, bytes: &[u8]);
    async fn get_stats(&self) -> CacheStats;
    fn backend_name(&self) -> &'static str;
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn from_counts(hits: u64, misses: u64) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_key_display() {
        assert_eq!(TileKey::new(13, 4401, 2686).to_string(), "13/4401/2686");
    }

    #[test]
    fn hit_rate_handles_no_traffic() {
        let stats = CacheStats::from_counts(0, 0);
        assert_eq!(stats.hit_rate, 0.0);

        let stats = CacheStats::from_counts(3, 1);
        assert_eq!(stats.hit_rate, 75.0);
    }
}
