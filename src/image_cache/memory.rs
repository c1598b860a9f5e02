use super::ImageBytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
struct CacheEntry {
    bytes: ImageBytes,
    cost: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub entries: usize,
    pub cost: usize,
}

/// LRU map bounded by entry count and total byte cost.
#[derive(Debug)]
pub struct MemoryTier {
    max_entries: usize,
    max_cost: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    map: HashMap<String, CacheEntry>,
    // front = most-recent, back = least-recent
    lru: VecDeque<String>,
    cost: usize,
}

impl Inner {
    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.lru.iter().position(|u| u == url) {
            if let Some(key) = self.lru.remove(pos) {
                self.lru.push_front(key);
            }
        }
    }

    fn remove(&mut self, url: &str) -> Option<CacheEntry> {
        let entry = self.map.remove(url)?;
        if let Some(pos) = self.lru.iter().position(|u| u == url) {
            self.lru.remove(pos);
        }
        self.cost -= entry.cost;
        Some(entry)
    }
}

impl MemoryTier {
    pub fn new(max_entries: usize, max_cost: usize) -> Self {
        Self {
            max_entries,
            max_cost,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Get and bump LRU
    pub fn get(&self, url: &str) -> Option<ImageBytes> {
        let mut inner = self.inner.lock();
        let bytes = inner.map.get(url)?.bytes.clone();
        inner.touch(url);
        Some(bytes)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner.lock().map.contains_key(url)
    }

    /// Inserts `bytes`, evicting least-recently-used entries until it fits.
    ///
    /// Returns `false` when the entry alone is larger than the byte ceiling;
    /// such entries are not admitted.
    pub fn insert(&self, url: &str, bytes: ImageBytes) -> bool {
        let cost = bytes.len();
        let mut inner = self.inner.lock();
        inner.remove(url);
        if self.max_entries == 0 || cost > self.max_cost {
            return false;
        }

        while inner.map.len() >= self.max_entries || inner.cost + cost > self.max_cost {
            let Some(oldest) = inner.lru.back().cloned() else {
                break;
            };
            inner.remove(&oldest);
        }

        inner.map.insert(url.to_string(), CacheEntry { bytes, cost });
        inner.lru.push_front(url.to_string());
        inner.cost += cost;
        true
    }

    pub fn remove(&self, url: &str) -> bool {
        self.inner.lock().remove(url).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        inner.lru.clear();
        inner.cost = 0;
    }

    pub fn stats(&self) -> MemoryStats {
        let inner = self.inner.lock();
        MemoryStats {
            entries: inner.map.len(),
            cost: inner.cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn payload(len: usize) -> ImageBytes {
        Arc::from(vec![7u8; len])
    }

    #[test]
    fn evicts_least_recently_used_by_count() {
        let tier = MemoryTier::new(2, 1_000);
        tier.insert("a", payload(1));
        tier.insert("b", payload(1));
        assert!(tier.get("a").is_some());
        tier.insert("c", payload(1));

        assert!(tier.contains("a"));
        assert!(!tier.contains("b"));
        assert!(tier.contains("c"));
    }

    #[test]
    fn evicts_until_the_new_cost_fits() {
        let tier = MemoryTier::new(10, 100);
        tier.insert("a", payload(40));
        tier.insert("b", payload(40));
        tier.insert("c", payload(50));

        assert!(!tier.contains("a"));
        assert!(tier.contains("b"));
        assert_eq!(tier.stats(), MemoryStats { entries: 2, cost: 90 });
    }

    #[test]
    fn oversized_entries_are_not_admitted() {
        let tier = MemoryTier::new(10, 100);
        tier.insert("a", payload(10));
        assert!(!tier.insert("huge", payload(101)));
        assert!(!tier.contains("huge"));
        assert!(tier.contains("a"));
    }

    #[test]
    fn replacing_an_entry_updates_its_cost() {
        let tier = MemoryTier::new(10, 100);
        tier.insert("a", payload(30));
        tier.insert("a", payload(60));
        assert_eq!(tier.stats(), MemoryStats { entries: 1, cost: 60 });
        assert!(tier.remove("a"));
        assert_eq!(tier.stats(), MemoryStats { entries: 0, cost: 0 });
    }

    #[test]
    fn ceilings_hold_across_mixed_inserts() {
        let tier = MemoryTier::new(5, 1_000);
        for i in 0..200usize {
            let len = (i * 37) % 450 + 1;
            tier.insert(&format!("url-{}", i % 13), payload(len));
            if i % 3 == 0 {
                tier.get(&format!("url-{}", (i + 5) % 13));
            }
            let stats = tier.stats();
            assert!(stats.entries <= 5, "count ceiling broken at step {i}");
            assert!(stats.cost <= 1_000, "cost ceiling broken at step {i}");
        }
        tier.clear();
        assert_eq!(tier.stats(), MemoryStats { entries: 0, cost: 0 });
    }
}
