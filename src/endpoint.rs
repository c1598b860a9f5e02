use crate::error::FetchError;
use reqwest::Url;

/// A request intent against the fixed catalog API surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Popular { page: u32 },
    MovieDetail { id: i64 },
    MovieCredits { id: i64 },
    MovieVideos { id: i64 },
    Search { query: String, page: u32 },
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Popular { .. } => "/movie/popular".to_string(),
            Endpoint::MovieDetail { id } => format!("/movie/{id}"),
            Endpoint::MovieCredits { id } => format!("/movie/{id}/credits"),
            Endpoint::MovieVideos { id } => format!("/movie/{id}/videos"),
            Endpoint::Search { .. } => "/search/movie".to_string(),
        }
    }

    /// Intent parameters in a fixed order. The credential is not included.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Popular { page } => vec![("page", page.to_string())],
            Endpoint::MovieDetail { .. }
            | Endpoint::MovieCredits { .. }
            | Endpoint::MovieVideos { .. } => Vec::new(),
            Endpoint::Search { query, page } => {
                vec![("query", query.clone()), ("page", page.to_string())]
            }
        }
    }

    /// Full request target with `api_key` as the first query parameter.
    pub fn url(&self, api_base: &str, api_key: &str) -> Result<Url, FetchError> {
        let mut query = format!("api_key={}", urlencoding::encode(api_key));
        for (name, value) in self.query() {
            query.push('&');
            query.push_str(name);
            query.push('=');
            query.push_str(&urlencoding::encode(&value));
        }
        let raw = format!("{}{}?{}", api_base.trim_end_matches('/'), self.path(), query);
        let url = Url::parse(&raw).map_err(|e| FetchError::MalformedRequest(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::MalformedRequest(format!(
                "unsupported scheme '{}' in {raw}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

/// Size tier segment of an image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Poster,
    Backdrop,
    Profile,
}

impl ImageSize {
    pub fn segment(&self) -> &'static str {
        match self {
            ImageSize::Poster => "w500",
            ImageSize::Backdrop => "w780",
            ImageSize::Profile => "w185",
        }
    }
}

pub fn image_url_with_base(base: &str, size: ImageSize, path: &str) -> String {
    format!("{}/{}{}", base.trim_end_matches('/'), size.segment(), path)
}
