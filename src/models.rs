use crate::endpoint::{image_url_with_base, ImageSize};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Catalog entry as it appears in list and search pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub genre_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub adult: Option<bool>,
    #[serde(default)]
    pub video: Option<bool>,
}

impl Movie {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn release_year(&self) -> Option<String> {
        release_year(self.release_date.as_deref())
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average.unwrap_or(0.0))
    }

    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|p| image_url_with_base(image_base, ImageSize::Poster, p))
    }

    pub fn backdrop_url(&self, image_base: &str) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|p| image_url_with_base(image_base, ImageSize::Backdrop, p))
    }
}

/// One page of a list or search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(rename = "results", default)]
    pub movies: Option<Vec<Movie>>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

impl MoviePage {
    pub fn total_pages_or_default(&self) -> u32 {
        self.total_pages.unwrap_or(1)
    }

    pub fn into_movies(self) -> Vec<Movie> {
        self.movies.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub revenue: Option<i64>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub adult: Option<bool>,
    #[serde(default)]
    pub video: Option<bool>,
}

impl MovieDetail {
    /// Runtime as `"2h 5m"` or `"45m"`; none when unknown or zero.
    pub fn formatted_runtime(&self) -> Option<String> {
        let runtime = self.runtime.filter(|r| *r > 0)?;
        let hours = runtime / 60;
        let minutes = runtime % 60;
        if hours > 0 {
            Some(format!("{hours}h {minutes}m"))
        } else {
            Some(format!("{minutes}m"))
        }
    }

    pub fn release_year(&self) -> Option<String> {
        release_year(self.release_date.as_deref())
    }

    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|p| image_url_with_base(image_base, ImageSize::Poster, p))
    }

    pub fn backdrop_url(&self, image_base: &str) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|p| image_url_with_base(image_base, ImageSize::Backdrop, p))
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|g| g.name.as_str())
            .collect()
    }

    /// The list-shaped record for this title, e.g. to favorite it from a detail screen.
    pub fn to_summary(&self) -> Movie {
        Movie {
            id: self.id,
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            original_language: self.original_language.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date.clone(),
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            genre_ids: self
                .genres
                .as_ref()
                .map(|g| g.iter().map(|genre| genre.id).collect()),
            adult: self.adult,
            video: self.video,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub cast: Option<Vec<CastMember>>,
    #[serde(default)]
    pub crew: Option<Vec<CrewMember>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub adult: Option<bool>,
    #[serde(default)]
    pub cast_id: Option<i64>,
    #[serde(default)]
    pub credit_id: Option<String>,
    /// Billing position; lower is more prominent.
    #[serde(default)]
    pub order: Option<u32>,
}

impl CastMember {
    pub fn profile_url(&self, image_base: &str) -> Option<String> {
        self.profile_path
            .as_deref()
            .map(|p| image_url_with_base(image_base, ImageSize::Profile, p))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub adult: Option<bool>,
    #[serde(default)]
    pub credit_id: Option<String>,
}

impl CrewMember {
    pub fn profile_url(&self, image_base: &str) -> Option<String> {
        self.profile_path
            .as_deref()
            .map(|p| image_url_with_base(image_base, ImageSize::Profile, p))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub results: Option<Vec<Video>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub official: Option<bool>,
    #[serde(rename = "iso_639_1", default)]
    pub language: Option<String>,
    #[serde(rename = "iso_3166_1", default)]
    pub region: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Video {
    fn youtube_key(&self) -> Option<&str> {
        let on_youtube = self
            .site
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("youtube"));
        if on_youtube {
            self.key.as_deref()
        } else {
            None
        }
    }

    pub fn is_youtube_trailer(&self) -> bool {
        self.site
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("youtube"))
            && self
                .kind
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("trailer"))
    }

    pub fn youtube_url(&self) -> Option<String> {
        self.youtube_key()
            .map(|k| format!("https://www.youtube.com/watch?v={k}"))
    }

    pub fn youtube_embed_url(&self) -> Option<String> {
        self.youtube_key()
            .map(|k| format!("https://www.youtube.com/embed/{k}?playsinline=1"))
    }

    pub fn youtube_thumbnail_url(&self) -> Option<String> {
        self.youtube_key()
            .map(|k| format!("https://img.youtube.com/vi/{k}/hqdefault.jpg"))
    }
}

fn release_year(date: Option<&str>) -> Option<String> {
    let date = date?.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(format!("{:04}", parsed.year()));
    }
    if date.chars().count() >= 4 {
        return Some(date.chars().take(4).collect());
    }
    None
}
