//! Memoized dataset loading
//!
//! Loads are pure, so a loaded table is kept for the lifetime of the cache and
//! handed out as a shared `Arc`. Entries are never invalidated. Failed loads are
//! not cached; the next call tries again.

use super::dataset::{Dataset, DatasetSource};
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Snapshot of cache counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from memory
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Process-lifetime cache of loaded datasets, keyed by source
#[derive(Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<DatasetSource, Arc<Dataset>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `source`, loading it on first use.
    pub fn load(&self, source: &DatasetSource) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.entries.read().get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(source = %source, "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        let mut entries = self.entries.write();
        // Another caller may have filled the slot between the two locks.
        if let Some(dataset) = entries.get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(dataset));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let dataset = Arc::new(source.load()?);
        debug!(
            source = %source,
            rows = dataset.n_rows(),
            features = dataset.n_features(),
            elapsed = ?start.elapsed(),
            "dataset loaded"
        );
        entries.insert(source.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Whether `source` is already in memory
    pub fn contains(&self, source: &DatasetSource) -> bool {
        self.entries.read().contains_key(source)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_is_memoized() {
        let cache = DatasetCache::new();
        let first = cache.load(&DatasetSource::Diabetes).unwrap();
        let second = cache.load(&DatasetSource::Diabetes).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = DatasetCache::new();
        let source = DatasetSource::Csv {
            path: PathBuf::from("/nonexistent/data.csv"),
            target: "y".to_string(),
        };

        assert!(cache.load(&source).is_err());
        assert!(!cache.contains(&source));
        assert!(cache.load(&source).is_err());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_empty_stats() {
        let stats = DatasetCache::new().stats();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }
}
