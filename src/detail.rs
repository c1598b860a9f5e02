use crate::error::FetchError;
use crate::models::{CastMember, Credits, CrewMember, MovieDetail, Video, Videos};
use crate::tmdb::CatalogApi;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const TOP_CAST_LIMIT: usize = 10;
const UNRANKED_CAST_ORDER: u32 = 999;

#[derive(Debug, Clone, Default)]
pub struct DetailSnapshot {
    /// Title the rest of the snapshot belongs to.
    pub movie_id: Option<i64>,
    pub detail: Option<MovieDetail>,
    pub credits: Option<Credits>,
    pub videos: Option<Videos>,
    pub is_loading: bool,
    pub error: Option<FetchError>,
}

impl DetailSnapshot {
    /// First YouTube trailer, if any.
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .as_ref()?
            .results
            .as_deref()?
            .iter()
            .find(|v| v.is_youtube_trailer())
    }

    /// Most prominent cast first; members without a billing position sort last.
    pub fn top_cast(&self) -> Vec<CastMember> {
        let Some(cast) = self.credits.as_ref().and_then(|c| c.cast.as_ref()) else {
            return Vec::new();
        };
        let mut cast = cast.clone();
        cast.sort_by_key(|c| c.order.unwrap_or(UNRANKED_CAST_ORDER));
        cast.truncate(TOP_CAST_LIMIT);
        cast
    }

    pub fn director(&self) -> Option<&CrewMember> {
        self.credits
            .as_ref()?
            .crew
            .as_deref()?
            .iter()
            .find(|c| {
                c.job
                    .as_deref()
                    .is_some_and(|j| j.eq_ignore_ascii_case("director"))
            })
    }
}

/// Loads one title's detail payload together with its credits and videos.
#[derive(Clone)]
pub struct MovieDetailController {
    api: Arc<dyn CatalogApi>,
    state: Arc<watch::Sender<DetailSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl MovieDetailController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (state, _) = watch::channel(DetailSnapshot::default());
        Self {
            api,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.state.subscribe()
    }

    /// Fetches detail, credits and videos concurrently.
    ///
    /// Only a detail failure is surfaced; credits and videos are best effort.
    /// Starting a load drops everything shown for the previous title, and
    /// results of a load superseded by a later one are discarded.
    pub async fn load(&self, movie_id: i64) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(DetailSnapshot {
            movie_id: Some(movie_id),
            is_loading: true,
            ..Default::default()
        });

        let (detail, credits, videos) = tokio::join!(
            self.api.movie_detail(movie_id),
            self.api.movie_credits(movie_id),
            self.api.movie_videos(movie_id),
        );

        self.state.send_if_modified(|s| {
            // Only the latest load may write.
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("Discarding superseded results for movie {}", movie_id);
                return false;
            }
            match detail {
                Ok(detail) => {
                    info!("Loaded detail for movie {}", movie_id);
                    s.detail = Some(detail);
                }
                Err(err) => {
                    warn!("Detail for movie {} failed: {}", movie_id, err);
                    s.error = Some(err);
                }
            }
            match credits {
                Ok(credits) => s.credits = Some(credits),
                Err(err) => warn!("Credits for movie {} unavailable: {}", movie_id, err),
            }
            match videos {
                Ok(videos) => s.videos = Some(videos),
                Err(err) => warn!("Videos for movie {} unavailable: {}", movie_id, err),
            }
            s.is_loading = false;
            true
        });
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }
}
