//! Durable, ordered set of favorited movies.

use crate::config::FAVORITES_KEY;
use crate::models::Movie;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};

/// Blob storage addressed by a fixed key.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn save(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Favorites, most recently added first, at most one entry per id.
///
/// Every successful mutation is written through to storage before it returns.
pub struct FavoritesStore {
    storage: Box<dyn KeyValueStore>,
    movies: Mutex<Vec<Movie>>,
    updates: watch::Sender<Vec<Movie>>,
}

impl FavoritesStore {
    /// Loads the saved list. Unreadable or undecodable data yields an empty set.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let movies = match storage.load(FAVORITES_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Movie>>(&bytes) {
                Ok(movies) => dedupe(movies),
                Err(e) => {
                    warn!("Failed to load favorites: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read favorites: {:#}", e);
                Vec::new()
            }
        };
        info!("Loaded {} favorites", movies.len());
        let (updates, _) = watch::channel(movies.clone());
        Self {
            storage,
            movies: Mutex::new(movies),
            updates,
        }
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.movies.lock().iter().any(|m| m.id == id)
    }

    pub fn favorites(&self) -> Vec<Movie> {
        self.movies.lock().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Movie>> {
        self.updates.subscribe()
    }

    pub fn add(&self, movie: Movie) {
        let mut movies = self.movies.lock();
        if movies.iter().any(|m| m.id == movie.id) {
            return;
        }
        movies.insert(0, movie);
        self.persist(&movies);
    }

    pub fn remove(&self, id: i64) {
        let mut movies = self.movies.lock();
        let before = movies.len();
        movies.retain(|m| m.id != id);
        if movies.len() != before {
            self.persist(&movies);
        }
    }

    /// Adds `movie` if absent, removes it otherwise. Returns whether it is now a favorite.
    pub fn toggle(&self, movie: Movie) -> bool {
        let mut movies = self.movies.lock();
        let now_favorite = match movies.iter().position(|m| m.id == movie.id) {
            Some(pos) => {
                movies.remove(pos);
                false
            }
            None => {
                movies.insert(0, movie);
                true
            }
        };
        self.persist(&movies);
        now_favorite
    }

    // Runs under the list lock so writes land in mutation order.
    fn persist(&self, movies: &[Movie]) {
        match serde_json::to_vec(movies) {
            Ok(bytes) => {
                if let Err(e) = self.storage.save(FAVORITES_KEY, &bytes) {
                    warn!("Failed to save favorites: {:#}", e);
                }
            }
            Err(e) => warn!("Failed to encode favorites: {}", e),
        }
        self.updates.send_replace(movies.to_vec());
    }
}

fn dedupe(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = std::collections::HashSet::new();
    movies.into_iter().filter(|m| seen.insert(m.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::movie;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Shares one backing map between store instances, like a reopened app.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryKeyValueStore>);

    impl KeyValueStore for SharedStore {
        fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.0.load(key)
        }
        fn save(&self, key: &str, value: &[u8]) -> Result<()> {
            self.0.save(key, value)
        }
    }

    /// Counts writes so no-op mutations can be told apart.
    #[derive(Clone, Default)]
    struct CountingStore {
        inner: SharedStore,
        saves: Arc<AtomicUsize>,
    }

    impl CountingStore {
        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for CountingStore {
        fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.load(key)
        }
        fn save(&self, key: &str, value: &[u8]) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(key, value)
        }
    }

    fn saved_ids(storage: &SharedStore) -> Vec<i64> {
        let bytes = storage.load(FAVORITES_KEY).unwrap().unwrap_or_default();
        let movies: Vec<Movie> = serde_json::from_slice(&bytes).unwrap_or_default();
        movies.iter().map(|m| m.id).collect()
    }

    #[test]
    fn add_then_remove() {
        let store = FavoritesStore::load(Box::new(MemoryKeyValueStore::new()));
        store.add(movie(1));
        assert!(store.is_favorite(1));
        store.remove(1);
        assert!(!store.is_favorite(1));
    }

    #[test]
    fn newest_first_without_duplicates() {
        let storage = SharedStore::default();
        let store = FavoritesStore::load(Box::new(storage.clone()));
        store.add(movie(1));
        store.add(movie(2));
        store.add(movie(1));
        let ids: Vec<i64> = store.favorites().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(saved_ids(&storage), vec![2, 1]);
    }

    #[test]
    fn repeated_add_and_absent_remove_do_not_persist() {
        let storage = CountingStore::default();
        let store = FavoritesStore::load(Box::new(storage.clone()));
        store.add(movie(1));
        assert_eq!(storage.saves(), 1);

        store.add(movie(1));
        assert_eq!(storage.saves(), 1);

        store.remove(42);
        assert_eq!(storage.saves(), 1);
        assert_eq!(saved_ids(&storage.inner), vec![1]);

        store.remove(1);
        assert_eq!(storage.saves(), 2);
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let store = FavoritesStore::load(Box::new(MemoryKeyValueStore::new()));
        store.add(movie(3));
        assert!(store.toggle(movie(7)));
        assert!(store.is_favorite(7));
        assert!(!store.toggle(movie(7)));
        assert!(!store.is_favorite(7));
        assert!(!store.toggle(movie(3)));
        assert!(store.toggle(movie(3)));
        assert!(store.is_favorite(3));
    }

    #[test]
    fn every_mutation_is_durable() {
        let storage = SharedStore::default();
        let store = FavoritesStore::load(Box::new(storage.clone()));
        store.add(movie(10));
        store.toggle(movie(11));
        store.remove(10);
        assert_eq!(saved_ids(&storage), vec![11]);

        let reopened = FavoritesStore::load(Box::new(storage.clone()));
        assert_eq!(reopened.favorites(), store.favorites());
    }

    #[test]
    fn corrupt_blob_loads_as_empty() {
        let storage = SharedStore::default();
        storage.save(FAVORITES_KEY, b"{not json").unwrap();
        let store = FavoritesStore::load(Box::new(storage.clone()));
        assert!(store.favorites().is_empty());

        store.add(movie(4));
        assert_eq!(saved_ids(&storage), vec![4]);
    }

    #[test]
    fn subscribers_see_each_change() {
        let store = FavoritesStore::load(Box::new(MemoryKeyValueStore::new()));
        let rx = store.subscribe();
        store.add(movie(5));
        assert_eq!(rx.borrow().iter().map(|m| m.id).collect::<Vec<_>>(), vec![5]);
        store.remove(5);
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn file_store_round_trips_and_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKeyValueStore::new(dir.path().join("data")).unwrap();
        assert!(kv.load(FAVORITES_KEY).unwrap().is_none());

        let store = FavoritesStore::load(Box::new(kv.clone()));
        store.add(movie(8));
        store.add(movie(9));

        let reopened = FavoritesStore::load(Box::new(kv));
        let ids: Vec<i64> = reopened.favorites().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![9, 8]);
        assert!(dir.path().join("data").join("favorite_movies.json").exists());
    }
}
