//! Paginated, searchable movie list.
//!
//! [`MovieListController`] owns the visible collection and the page counter.
//! Every transition happens inside a single `watch` update, so the in-flight
//! guard is checked and claimed atomically while the fetch itself runs
//! outside any lock.

mod debounce;

pub use debounce::SearchInput;

use crate::config::SEARCH_DEBOUNCE;
use crate::error::FetchError;
use crate::models::{Movie, MoviePage};
use crate::tmdb::CatalogApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Which listing produced the current page sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Popular,
    Search(String),
}

impl ListSource {
    pub fn from_query(query: &str) -> Self {
        if query.is_empty() {
            ListSource::Popular
        } else {
            ListSource::Search(query.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListPhase {
    Idle,
    /// First-page fetch. `reset` means the items were cleared when it started.
    Loading { reset: bool },
    Loaded,
    LoadingMore,
    Failed(FetchError),
}

impl ListPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ListPhase::Loading { .. } | ListPhase::LoadingMore)
    }
}

/// What a list screen should draw for a given snapshot.
#[derive(Debug, Clone)]
pub enum ListPresentation {
    SearchSkeleton,
    Loading,
    Error(FetchError),
    Empty { searching: bool },
    Content,
}

#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub phase: ListPhase,
    pub movies: Vec<Movie>,
    /// Latest search term handed to the controller; empty means popular.
    pub query: String,
    pub source: ListSource,
    pub page: u32,
    pub total_pages: u32,
}

impl Default for ListSnapshot {
    fn default() -> Self {
        Self {
            phase: ListPhase::Idle,
            movies: Vec::new(),
            query: String::new(),
            source: ListSource::Popular,
            page: 1,
            total_pages: 1,
        }
    }
}

impl ListSnapshot {
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_in_flight()
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.phase {
            ListPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn presentation(&self) -> ListPresentation {
        if !self.movies.is_empty() {
            return ListPresentation::Content;
        }
        if self.is_loading() {
            if self.is_searching() {
                return ListPresentation::SearchSkeleton;
            }
            return ListPresentation::Loading;
        }
        if let Some(err) = self.error() {
            return ListPresentation::Error(err.clone());
        }
        ListPresentation::Empty {
            searching: self.is_searching(),
        }
    }
}

#[derive(Clone)]
pub struct MovieListController {
    api: Arc<dyn CatalogApi>,
    state: Arc<watch::Sender<ListSnapshot>>,
}

impl MovieListController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (state, _) = watch::channel(ListSnapshot::default());
        Self {
            api,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.state.subscribe()
    }

    /// Debounced search box bound to this controller.
    pub fn search_input(&self) -> SearchInput {
        self.search_input_with_window(SEARCH_DEBOUNCE)
    }

    pub fn search_input_with_window(&self, window: Duration) -> SearchInput {
        SearchInput::spawn(self.clone(), window)
    }

    /// Fresh browse of the current source: clears items and loads page 1.
    ///
    /// Returns `false` when another fetch is already in flight.
    pub async fn browse(&self) -> bool {
        self.load_first_page(None, true).await
    }

    /// Pull-to-refresh: reloads page 1 while keeping items visible until it resolves.
    pub async fn refresh(&self) -> bool {
        self.load_first_page(None, false).await
    }

    /// Switches to `query` (empty means popular) and loads its first page.
    pub async fn search(&self, query: impl Into<String>) -> bool {
        self.load_first_page(Some(query.into()), true).await
    }

    /// Loads the next page when `current_id` is the last visible item.
    pub async fn load_more_if_needed(&self, current_id: i64) -> bool {
        self.load_next_page(Some(current_id)).await
    }

    /// Re-issues whichever fetch produced the current failure.
    pub async fn retry(&self) -> bool {
        let next_page = {
            let state = self.state.borrow();
            match state.phase {
                ListPhase::Failed(_) => !state.movies.is_empty(),
                _ => return false,
            }
        };
        if next_page {
            self.load_next_page(None).await
        } else {
            self.load_first_page(None, true).await
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| {
            if !matches!(s.phase, ListPhase::Failed(_)) {
                return false;
            }
            s.phase = if s.movies.is_empty() {
                ListPhase::Idle
            } else {
                ListPhase::Loaded
            };
            true
        });
    }

    async fn load_first_page(&self, query: Option<String>, reset: bool) -> bool {
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.phase.is_in_flight() {
                return false;
            }
            if let Some(query) = query {
                s.query = query;
            }
            let source = ListSource::from_query(&s.query);
            s.phase = ListPhase::Loading { reset };
            s.page = 1;
            if reset {
                s.movies.clear();
            }
            s.source = source.clone();
            claimed = Some(source);
            true
        });
        let Some(source) = claimed else {
            debug!("Ignoring first-page request while a fetch is in flight");
            return false;
        };

        let result = self.fetch_page(&source, 1).await;
        self.state.send_modify(|s| match result {
            Ok(page) => {
                s.total_pages = page.total_pages_or_default();
                s.movies = page.into_movies();
                s.phase = ListPhase::Loaded;
                info!(
                    "Loaded page 1 of {} ({} movies) for {:?}",
                    s.total_pages,
                    s.movies.len(),
                    source
                );
            }
            Err(err) => {
                warn!("First page of {:?} failed: {}", source, err);
                s.movies.clear();
                s.phase = ListPhase::Failed(err);
            }
        });
        true
    }

    async fn load_next_page(&self, current_id: Option<i64>) -> bool {
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.phase.is_in_flight() || !s.has_more_pages() {
                return false;
            }
            let Some(last) = s.movies.last() else {
                return false;
            };
            if current_id.is_some_and(|id| id != last.id) {
                return false;
            }
            s.page += 1;
            s.phase = ListPhase::LoadingMore;
            claimed = Some((s.source.clone(), s.page));
            true
        });
        let Some((source, page)) = claimed else {
            return false;
        };

        let result = self.fetch_page(&source, page).await;
        self.state.send_modify(|s| match result {
            Ok(next) => {
                let movies = next.into_movies();
                info!("Appended page {} ({} movies) for {:?}", page, movies.len(), source);
                s.movies.extend(movies);
                s.phase = ListPhase::Loaded;
            }
            Err(err) => {
                warn!("Page {} of {:?} failed, keeping {} movies: {}", page, source, s.movies.len(), err);
                s.page = page - 1;
                s.phase = ListPhase::Failed(err);
            }
        });
        true
    }

    async fn fetch_page(&self, source: &ListSource, page: u32) -> Result<MoviePage, FetchError> {
        match source {
            ListSource::Popular => self.api.popular(page).await,
            ListSource::Search(query) => self.api.search(query, page).await,
        }
    }
}
