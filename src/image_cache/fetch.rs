use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Source of raw image bytes for cache misses.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self> {
        let user_agent = format!("moviedb/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build image HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("image request failed")?;
        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("{} -> status {}", url, status));
        }
        let bytes = res.bytes().await.context("reading image body failed")?;
        Ok(bytes.to_vec())
    }
}
