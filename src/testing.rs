//! In-process fakes shared by the unit tests.

use crate::error::FetchError;
use crate::list::ListSource;
use crate::models::{CastMember, Credits, CrewMember, Movie, MovieDetail, MoviePage, Video, Videos};
use crate::tmdb::CatalogApi;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Popular(u32),
    Search(String, u32),
    Detail(i64),
    Credits(i64),
    Videos(i64),
}

pub fn movie(id: i64) -> Movie {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Movie {id}"),
        "release_date": "2001-01-01",
    }))
    .expect("movie fixture")
}

pub fn transport_error() -> FetchError {
    FetchError::transport(io::Error::new(io::ErrorKind::NotConnected, "offline"))
}

/// Catalog that serves 20 generated movies per page.
pub struct FakeCatalog {
    total_pages: Option<u32>,
    calls: Mutex<Vec<Call>>,
    next_failures: Mutex<VecDeque<FetchError>>,
    endpoint_failures: Mutex<HashMap<&'static str, FetchError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeCatalog {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages: Some(total_pages),
            calls: Mutex::new(Vec::new()),
            next_failures: Mutex::new(VecDeque::new()),
            endpoint_failures: Mutex::new(HashMap::new()),
            gate: Mutex::new(None),
        }
    }

    pub fn without_total_pages(mut self) -> Self {
        self.total_pages = None;
        self
    }

    pub fn page_ids(source: &ListSource, page: u32) -> Vec<i64> {
        let base = match source {
            ListSource::Popular => 0,
            ListSource::Search(_) => 50_000,
        };
        (0..20).map(|i| base + i64::from(page) * 100 + i).collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn fail_next_transport(&self) {
        self.next_failures.lock().push_back(transport_error());
    }

    pub fn fail_next_status(&self, status: u16) {
        self.next_failures
            .lock()
            .push_back(FetchError::Protocol { status });
    }

    /// Makes every call to `endpoint` ("detail", "credits" or "videos") fail.
    pub fn fail_endpoint(&self, endpoint: &'static str, err: FetchError) {
        self.endpoint_failures.lock().insert(endpoint, err);
    }

    /// Blocks responses until the returned semaphore receives permits, one per response.
    pub fn hold_responses(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    async fn record(&self, call: Call) -> Result<(), FetchError> {
        self.calls.lock().push(call);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        match self.next_failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn endpoint_failure(&self, endpoint: &str) -> Result<(), FetchError> {
        match self.endpoint_failures.lock().get(endpoint) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn page(&self, source: &ListSource, page: u32) -> MoviePage {
        MoviePage {
            page: Some(page),
            movies: Some(Self::page_ids(source, page).into_iter().map(movie).collect()),
            total_pages: self.total_pages,
            total_results: self.total_pages.map(|t| u64::from(t) * 20),
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn popular(&self, page: u32) -> Result<MoviePage, FetchError> {
        self.record(Call::Popular(page)).await?;
        Ok(self.page(&ListSource::Popular, page))
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, FetchError> {
        self.record(Call::Search(query.to_string(), page)).await?;
        Ok(self.page(&ListSource::Search(query.to_string()), page))
    }

    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, FetchError> {
        self.record(Call::Detail(id)).await?;
        self.endpoint_failure("detail")?;
        Ok(serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Movie {id}"),
            "runtime": 125,
            "genres": [{ "id": 18, "name": "Drama" }],
        }))
        .expect("detail fixture"))
    }

    async fn movie_credits(&self, id: i64) -> Result<Credits, FetchError> {
        self.record(Call::Credits(id)).await?;
        self.endpoint_failure("credits")?;
        let cast = (0..12)
            .rev()
            .map(|i| CastMember {
                id: i,
                name: Some(format!("Actor {i}")),
                original_name: None,
                character: Some(format!("Role {i}")),
                known_for_department: Some("Acting".to_string()),
                profile_path: None,
                popularity: None,
                gender: None,
                adult: None,
                cast_id: None,
                credit_id: None,
                // The first-listed actor has no billing position.
                order: if i == 11 { None } else { Some(i as u32) },
            })
            .collect();
        let crew = ["Producer", "Director", "Director"]
            .iter()
            .enumerate()
            .map(|(i, job)| CrewMember {
                id: 100 + i as i64,
                name: Some(format!("Crew {i}")),
                original_name: None,
                job: Some(job.to_string()),
                department: Some("Production".to_string()),
                known_for_department: None,
                profile_path: None,
                popularity: None,
                gender: None,
                adult: None,
                credit_id: None,
            })
            .collect();
        Ok(Credits {
            id: Some(id),
            cast: Some(cast),
            crew: Some(crew),
        })
    }

    async fn movie_videos(&self, id: i64) -> Result<Videos, FetchError> {
        self.record(Call::Videos(id)).await?;
        self.endpoint_failure("videos")?;
        let videos: Vec<Video> = serde_json::from_value(serde_json::json!([
            { "id": "a", "key": "teaser", "site": "YouTube", "type": "Teaser" },
            { "id": "b", "key": "vimeo", "site": "Vimeo", "type": "Trailer" },
            { "id": "c", "key": "main", "site": "youtube", "type": "trailer" },
            { "id": "d", "key": "second", "site": "YouTube", "type": "Trailer" }
        ]))
        .expect("videos fixture");
        Ok(Videos {
            id: Some(id),
            results: Some(videos),
        })
    }
}
