//! Two-tier image cache: a bounded LRU in memory in front of an unbounded
//! directory on disk, with the network behind both.
//!
//! Lookups go memory → disk → network. A disk hit is promoted to memory; a
//! network hit is written to both tiers. Concurrent lookups for the same URL
//! share one network fetch.

mod disk;
mod fetch;
mod memory;

pub use disk::{file_name, DiskTier};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use memory::{MemoryStats, MemoryTier};

use crate::config::{AppConfig, DISK_JPEG_QUALITY, MEMORY_CACHE_MAX_BYTES, MEMORY_CACHE_MAX_ENTRIES};
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub type ImageBytes = Arc<[u8]>;

type InFlight = Arc<OnceCell<Option<ImageBytes>>>;

pub struct ImageCache {
    memory: MemoryTier,
    disk: DiskTier,
    fetcher: Arc<dyn ImageFetcher>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl ImageCache {
    pub fn new(memory: MemoryTier, disk: DiskTier, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            memory,
            disk,
            fetcher,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let memory = MemoryTier::new(MEMORY_CACHE_MAX_ENTRIES, MEMORY_CACHE_MAX_BYTES);
        let disk = DiskTier::new(config.cache_dir.clone(), DISK_JPEG_QUALITY)?;
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpImageFetcher::new()?);
        Ok(Self::new(memory, disk, fetcher))
    }

    /// Image bytes for `url`, or `None` when every tier misses and the
    /// network fetch fails. Callers show a placeholder in that case.
    pub async fn resolve(&self, url: &str) -> Option<ImageBytes> {
        if let Some(hit) = self.memory.get(url) {
            debug!("Image memory hit: {}", url);
            return Some(hit);
        }
        if let Some(bytes) = self.disk.read(url).await {
            debug!("Image disk hit: {}", url);
            let bytes: ImageBytes = Arc::from(bytes);
            self.memory.insert(url, bytes.clone());
            return Some(bytes);
        }

        let cell = self
            .in_flight
            .lock()
            .entry(url.to_string())
            .or_default()
            .clone();
        let result = cell
            .get_or_init(|| self.fetch_and_store(url))
            .await
            .clone();
        {
            let mut in_flight = self.in_flight.lock();
            if in_flight.get(url).is_some_and(|c| Arc::ptr_eq(c, &cell)) {
                in_flight.remove(url);
            }
        }
        result
    }

    /// Caches `bytes` for `url` in both tiers.
    ///
    /// The disk copy is re-encoded as JPEG. Fails only when `bytes` is not an
    /// image; a failed disk write is logged and the memory copy kept.
    pub async fn store(&self, url: &str, bytes: Vec<u8>) -> Result<ImageBytes> {
        let encoded = self.disk.encode(bytes.clone()).await?;
        let bytes: ImageBytes = Arc::from(bytes);
        if !self.memory.insert(url, bytes.clone()) {
            debug!("Image too large for memory tier, disk only: {}", url);
        }
        if let Err(e) = self.disk.write(url, &encoded).await {
            warn!("Failed to persist image {}: {:#}", url, e);
        }
        Ok(bytes)
    }

    pub fn clear_memory(&self) {
        self.memory.clear();
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.memory.stats()
    }

    pub fn disk_path(&self, url: &str) -> PathBuf {
        self.disk.path_for(url)
    }

    async fn fetch_and_store(&self, url: &str) -> Option<ImageBytes> {
        debug!("Image miss, fetching: {}", url);
        let bytes = match self.fetcher.fetch_image(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Image fetch failed for {}: {:#}", url, e);
                return None;
            }
        };
        match self.store(url, bytes).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!("Discarding image from {}: {:#}", url, e);
                None
            }
        }
    }
}
