//! Terminal front-end for browsing the catalog.
//! Usage:
//!   moviedb popular [pages]
//!   moviedb search <query> [pages]
//!   moviedb detail <tmdb_id>
//!   moviedb favorites
//!   moviedb favorite <tmdb_id>
//!   moviedb image <poster_path | url>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use moviedb::config::AppConfig;
use moviedb::detail::MovieDetailController;
use moviedb::endpoint::{image_url_with_base, ImageSize};
use moviedb::favorites::{FavoritesStore, FileKeyValueStore};
use moviedb::image_cache::ImageCache;
use moviedb::list::{ListSnapshot, MovieListController};
use moviedb::models::Movie;
use moviedb::tmdb::{CatalogApi, TmdbClient};
use moviedb::trailer::{self, UrlOpener};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: moviedb <popular [pages] | search <query> [pages] | detail <id> | favorites | favorite <id> | image <path|url>>";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Terminals cannot launch apps; print the link instead.
struct PrintOpener;

impl UrlOpener for PrintOpener {
    fn can_open(&self, _url: &str) -> bool {
        false
    }

    fn open(&self, url: &str) {
        println!("Trailer: {url}");
    }
}

fn parse_pages(arg: Option<String>) -> Result<u32> {
    match arg {
        Some(v) => v
            .parse::<u32>()
            .map(|n| n.clamp(1, 50))
            .with_context(|| format!("invalid page count '{v}'")),
        None => Ok(1),
    }
}

fn parse_id(arg: Option<String>) -> Result<i64> {
    let raw = arg.context(USAGE)?;
    raw.trim()
        .parse()
        .with_context(|| format!("invalid TMDB id '{raw}'"))
}

fn print_movie(movie: &Movie, favorites: &FavoritesStore) {
    let heart = if favorites.is_favorite(movie.id) { "♥" } else { " " };
    println!(
        "{heart} {:>8}  {:<50} {:>4}  ★ {}",
        movie.id,
        movie.display_title(),
        movie.release_year().unwrap_or_else(|| "N/A".to_string()),
        movie.rating_label()
    );
}

async fn list_pages(controller: &MovieListController, pages: u32) -> ListSnapshot {
    let mut snapshot = controller.snapshot();
    while snapshot.page < pages && snapshot.has_more_pages() {
        let Some(last) = snapshot.movies.last().map(|m| m.id) else {
            break;
        };
        if !controller.load_more_if_needed(last).await {
            break;
        }
        let next = controller.snapshot();
        if next.error().is_some() {
            return next;
        }
        snapshot = next;
    }
    snapshot
}

fn print_list(snapshot: &ListSnapshot, favorites: &FavoritesStore) -> Result<()> {
    if snapshot.movies.is_empty() {
        if let Some(err) = snapshot.error() {
            bail!("{}", err);
        }
        println!("No movies found");
        return Ok(());
    }
    for movie in &snapshot.movies {
        print_movie(movie, favorites);
    }
    if let Some(err) = snapshot.error() {
        warn!("Stopped early: {}", err);
    }
    println!(
        "-- page {} of {} --",
        snapshot.page, snapshot.total_pages
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    let config = AppConfig::from_env()?;
    let api: Arc<dyn CatalogApi> = Arc::new(TmdbClient::from_config(&config)?);
    let favorites = FavoritesStore::load(Box::new(FileKeyValueStore::new(&config.data_dir)?));

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("popular") => {
            let pages = parse_pages(args.next())?;
            let controller = MovieListController::new(api);
            controller.browse().await;
            let snapshot = list_pages(&controller, pages).await;
            print_list(&snapshot, &favorites)?;
        }
        Some("search") => {
            let query = args.next().context(USAGE)?;
            let pages = parse_pages(args.next())?;
            let controller = MovieListController::new(api);
            controller.search(query).await;
            let snapshot = list_pages(&controller, pages).await;
            print_list(&snapshot, &favorites)?;
        }
        Some("detail") => {
            let id = parse_id(args.next())?;
            let controller = MovieDetailController::new(api);
            controller.load(id).await;
            let snapshot = controller.snapshot();
            let Some(detail) = snapshot.detail.as_ref() else {
                match &snapshot.error {
                    Some(err) => bail!("{}", err),
                    None => bail!("No detail returned for {}", id),
                }
            };
            println!("{} ({})", detail.title.as_deref().unwrap_or("Untitled"), id);
            if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
                println!("  \"{tagline}\"");
            }
            let year = detail.release_year().unwrap_or_else(|| "N/A".to_string());
            let runtime = detail.formatted_runtime().unwrap_or_default();
            println!("  {year}  {runtime}  {}", detail.genre_names().join(", "));
            if let Some(poster) = detail.poster_url(&config.image_base) {
                println!("  Poster: {poster}");
            }
            if let Some(overview) = detail.overview.as_deref() {
                println!("\n{overview}\n");
            }
            if let Some(director) = snapshot.director() {
                println!("Director: {}", director.name.as_deref().unwrap_or("?"));
            }
            for member in snapshot.top_cast() {
                let photo = member.profile_url(&config.image_base).unwrap_or_default();
                println!(
                    "  {} as {}  {}",
                    member.name.as_deref().unwrap_or("?"),
                    member.character.as_deref().unwrap_or("?"),
                    photo
                );
            }
            if let Some(key) = snapshot.trailer().and_then(|v| v.key.as_deref()) {
                trailer::open_trailer(&PrintOpener, key);
            }
            if favorites.is_favorite(id) {
                println!("♥ In favorites");
            }
        }
        Some("favorites") => {
            let movies = favorites.favorites();
            if movies.is_empty() {
                println!("No favorites yet");
            }
            for movie in &movies {
                print_movie(movie, &favorites);
            }
        }
        Some("favorite") => {
            let id = parse_id(args.next())?;
            let detail = api.movie_detail(id).await?;
            let title = detail.title.clone().unwrap_or_default();
            if favorites.toggle(detail.to_summary()) {
                println!("Added '{title}' to favorites");
            } else {
                println!("Removed '{title}' from favorites");
            }
        }
        Some("image") => {
            let target = args.next().context(USAGE)?;
            let url = if target.starts_with("http://") || target.starts_with("https://") {
                target
            } else {
                image_url_with_base(&config.image_base, ImageSize::Poster, &target)
            };
            let cache = ImageCache::from_config(&config)?;
            match cache.resolve(&url).await {
                Some(bytes) => println!(
                    "{} bytes, cached at {}",
                    bytes.len(),
                    cache.disk_path(&url).display()
                ),
                None => bail!("No image available for {}", url),
            }
        }
        _ => bail!(USAGE),
    }
    Ok(())
}
