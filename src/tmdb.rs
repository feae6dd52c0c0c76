use crate::card::{MovieCard, MovieId, VoteAverage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const CARD_POSTER_SIZE: &str = "w500";
const DETAIL_IMAGE_SIZE: &str = "original";
const TOP_CAST: usize = 10;
pub const MAX_PAGE: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDB answered {status} for {path}: {body}")]
    Status {
        status: StatusCode,
        path: String,
        body: String,
    },
}

impl TmdbError {
    pub fn is_not_found(&self) -> bool {
        match self {
            TmdbError::Status { status, .. } => *status == StatusCode::NOT_FOUND,
        }
    }
}

/// True when TMDB itself said the resource does not exist.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<TmdbError>()
        .is_some_and(TmdbError::is_not_found)
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn popular_movies(&self, page: u32) -> Result<MoviePage>;
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage>;
    async fn fetch_movie(&self, id: i32) -> Result<MovieDetails>;
}

/// One page of a TMDB movie listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
}

/// A movie as it appears in listings.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

impl MovieSummary {
    /// Card for this listing entry. A missing poster or release date
    /// becomes empty text rather than a placeholder.
    pub fn to_card(&self) -> MovieCard {
        MovieCard {
            id: MovieId::from(self.id),
            title: self.title.clone(),
            image_url: image_url(CARD_POSTER_SIZE, self.poster_path.as_deref())
                .unwrap_or_default(),
            release_date: self.release_date.clone().unwrap_or_default(),
            vote_average: VoteAverage::Number(self.vote_average),
        }
    }
}

impl MoviePage {
    pub fn cards(&self) -> Vec<MovieCard> {
        self.results.iter().map(MovieSummary::to_card).collect()
    }
}

/// What the detail page shows for one movie.
#[derive(Debug, Clone, Default)]
pub struct MovieDetails {
    pub id: i32,
    pub title: String,
    pub overview: Option<String>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub directors: Vec<String>,
    pub certification: Option<String>,
    pub countries: Vec<String>,
    pub language: Option<String>,
    pub release_date: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub vote_average: Option<f64>,
    pub trailer: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub imdb_page: Option<String>,
}

impl MovieDetails {
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
    }
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: TMDB_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        // The key travels as a query pair; reqwest errors would echo it back
        // through the URL, so they are stripped of it.
        let res = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("TMDB request to {path} failed"))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("reading TMDB body failed")?;
        if !status.is_success() {
            return Err(TmdbError::Status {
                status,
                path: path.to_string(),
                body: text,
            }
            .into());
        }
        serde_json::from_str(&text).with_context(|| format!("TMDB {path} JSON parse failed"))
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn popular_movies(&self, page: u32) -> Result<MoviePage> {
        let query = [
            ("language", "en-US".to_string()),
            ("page", clamp_page(page).to_string()),
        ];
        self.get_json("/movie/popular", &query).await
    }

    async fn search_movies(&self, text: &str, page: u32) -> Result<MoviePage> {
        let query = [
            ("query", text.to_string()),
            ("language", "en-US".to_string()),
            ("page", clamp_page(page).to_string()),
        ];
        self.get_json("/search/movie", &query).await
    }

    async fn fetch_movie(&self, id: i32) -> Result<MovieDetails> {
        let query = [
            ("language", "en-US".to_string()),
            (
                "append_to_response",
                "credits,release_dates,videos".to_string(),
            ),
        ];
        let detail: DetailResponse = self.get_json(&format!("/movie/{id}"), &query).await?;
        Ok(detail.into())
    }
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpokenLanguage {
    iso_639_1: String,
    english_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<Named>,
    #[serde(default)]
    crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    job: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReleaseCountry {
    iso_3166_1: String,
    #[serde(default)]
    release_dates: Vec<Certification>,
}

#[derive(Debug, Deserialize)]
struct Certification {
    #[serde(default)]
    certification: String,
}

#[derive(Debug, Deserialize)]
struct Video {
    site: String,
    #[serde(rename = "type")]
    kind: String,
    key: String,
}

/// `/movie/{id}` with credits, release dates and videos appended.
#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: i32,
    title: String,
    #[serde(default)]
    overview: String,
    release_date: Option<String>,
    runtime: Option<u32>,
    vote_average: Option<f64>,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    spoken_languages: Vec<SpokenLanguage>,
    #[serde(default)]
    production_countries: Vec<Named>,
    #[serde(default)]
    genres: Vec<Named>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    imdb_id: Option<String>,
    #[serde(default)]
    credits: Credits,
    #[serde(default)]
    release_dates: Listing<ReleaseCountry>,
    #[serde(default)]
    videos: Listing<Video>,
}

impl DetailResponse {
    fn us_certification(&self) -> Option<String> {
        self.release_dates
            .results
            .iter()
            .filter(|c| c.iso_3166_1 == "US")
            .flat_map(|c| c.release_dates.iter())
            .map(|r| r.certification.trim())
            .find(|c| !c.is_empty())
            .map(str::to_string)
    }

    /// YouTube trailer, or a teaser when no trailer exists.
    fn trailer(&self) -> Option<String> {
        self.videos
            .results
            .iter()
            .filter(|v| v.site.eq_ignore_ascii_case("YouTube"))
            .filter_map(|v| match v.kind.as_str() {
                "Trailer" => Some((0, v)),
                "Teaser" => Some((1, v)),
                _ => None,
            })
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, v)| format!("https://www.youtube.com/watch?v={}", v.key))
    }

    fn language(&self) -> Option<String> {
        if self.original_language.is_empty() {
            return None;
        }
        let english_name = self
            .spoken_languages
            .iter()
            .find(|l| l.iso_639_1 == self.original_language)
            .map(|l| l.english_name.clone())
            .filter(|n| !n.is_empty());
        Some(english_name.unwrap_or_else(|| self.original_language.clone()))
    }
}

impl From<DetailResponse> for MovieDetails {
    fn from(detail: DetailResponse) -> Self {
        let certification = detail.us_certification();
        let trailer = detail.trailer();
        let language = detail.language();
        MovieDetails {
            id: detail.id,
            title: detail.title,
            overview: Some(detail.overview).filter(|s| !s.trim().is_empty()),
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            cast: detail
                .credits
                .cast
                .into_iter()
                .take(TOP_CAST)
                .map(|c| c.name)
                .collect(),
            directors: detail
                .credits
                .crew
                .into_iter()
                .filter(|c| c.job.as_deref() == Some("Director"))
                .map(|c| c.name)
                .collect(),
            certification,
            countries: detail
                .production_countries
                .into_iter()
                .map(|c| c.name)
                .collect(),
            language,
            release_date: detail.release_date.filter(|d| !d.is_empty()),
            runtime_minutes: detail.runtime.filter(|r| *r > 0),
            vote_average: detail.vote_average,
            trailer,
            poster: image_url(DETAIL_IMAGE_SIZE, detail.poster_path.as_deref()),
            backdrop: image_url(DETAIL_IMAGE_SIZE, detail.backdrop_path.as_deref()),
            imdb_page: detail
                .imdb_id
                .filter(|id| !id.is_empty())
                .map(|id| format!("https://www.imdb.com/title/{id}")),
        }
    }
}

fn image_url(size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}/{size}{p}"))
}

/// Clamps a requested listing page to what TMDB will serve.
pub fn clamp_page(page: u32) -> u32 {
    page.clamp(1, MAX_PAGE)
}

/// Parses a detail-page identifier into a TMDB movie id.
pub fn parse_tmdb_id(input: &str) -> Option<i32> {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return input.parse().ok();
    }
    None
}
