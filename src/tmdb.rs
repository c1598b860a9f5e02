use crate::config::{AppConfig, DEFAULT_API_BASE};
use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::models::{Credits, MovieDetail, MoviePage, Videos};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::env;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_base: String,
    api_key: String,
}

/// Typed access to the five catalog endpoints.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn popular(&self, page: u32) -> Result<MoviePage, FetchError>;
    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, FetchError>;
    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, FetchError>;
    async fn movie_credits(&self, id: i64) -> Result<Credits, FetchError>;
    async fn movie_videos(&self, id: i64) -> Result<Videos, FetchError>;
}

impl TmdbClient {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("moviedb/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.api_base.clone(), config.api_key.clone())
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        let api_base = env::var("TMDB_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(api_base, api_key)
    }

    /// Issues a GET for `endpoint` and decodes the body as `T`.
    ///
    /// No retries and no caching happen here.
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, FetchError> {
        let url = endpoint.url(&self.api_base, &self.api_key)?;
        debug!("GET {}", endpoint.path());
        let res = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Protocol {
                status: status.as_u16(),
            });
        }
        let bytes = res.bytes().await.map_err(FetchError::transport)?;
        serde_json::from_slice(&bytes).map_err(FetchError::decode)
    }

    /// Raw JSON for an intent, for inspection tooling.
    pub async fn fetch_value(&self, endpoint: &Endpoint) -> Result<serde_json::Value, FetchError> {
        self.fetch(endpoint).await
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn popular(&self, page: u32) -> Result<MoviePage, FetchError> {
        self.fetch(&Endpoint::Popular { page }).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, FetchError> {
        self.fetch(&Endpoint::Search {
            query: query.to_string(),
            page,
        })
        .await
    }

    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, FetchError> {
        self.fetch(&Endpoint::MovieDetail { id }).await
    }

    async fn movie_credits(&self, id: i64) -> Result<Credits, FetchError> {
        self.fetch(&Endpoint::MovieCredits { id }).await
    }

    async fn movie_videos(&self, id: i64) -> Result<Videos, FetchError> {
        self.fetch(&Endpoint::MovieVideos { id }).await
    }
}
