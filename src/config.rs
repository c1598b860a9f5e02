use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const MEMORY_CACHE_MAX_ENTRIES: usize = 100;
pub const MEMORY_CACHE_MAX_BYTES: usize = 50 * 1024 * 1024;
pub const DISK_JPEG_QUALITY: u8 = 80;
pub const FAVORITES_KEY: &str = "favorite_movies";

/// Runtime settings for the catalog client and its local stores.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base: String,
    pub image_base: String,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .context("TMDB_API_KEY not set")?;
        let api_base = env_or("TMDB_API_BASE", DEFAULT_API_BASE);
        let image_base = env_or("TMDB_IMAGE_BASE", DEFAULT_IMAGE_BASE);

        let cache_dir = match env::var("MOVIEDB_CACHE_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::cache_dir()
                .map(|d| d.join("moviedb").join("ImageCache"))
                .context("No platform cache directory; set MOVIEDB_CACHE_DIR")?,
        };
        let data_dir = match env::var("MOVIEDB_DATA_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .map(|d| d.join("moviedb"))
                .context("No platform data directory; set MOVIEDB_DATA_DIR")?,
        };

        Ok(Self {
            api_key,
            api_base,
            image_base,
            cache_dir,
            data_dir,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
