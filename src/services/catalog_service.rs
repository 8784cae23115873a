use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::MediaType;

/// Errors from catalog gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog API key is not configured")]
    MissingApiKey,

    #[error("{0} not found")]
    NotFound(String),

    #[error("catalog request failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

/// One search hit, enriched with the director when the credits lookup
/// succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: i32,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
    pub director: Option<String>,
}

/// One row of a popular listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub id: i32,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season_number: i32,
    pub name: Option<String>,
    pub episode_count: Option<i32>,
    pub air_date: Option<String>,
}

/// Everything the add/edit page needs to render one title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetail {
    pub id: i32,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
    /// Minutes: feature length for movies, episode length for series.
    pub runtime: Option<i32>,
    pub origin_country: Vec<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<CastMember>,
    pub vote_average: Option<f64>,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub seasons: Vec<SeasonSummary>,
    pub watch_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCredit {
    pub id: i32,
    pub title: String,
    pub character: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
    pub imdb_id: Option<String>,
    pub credits: Vec<PersonCredit>,
}

/// Read-side gateway to the movie/series catalog.
///
/// Every read is cached in the store under its upstream request descriptor;
/// within the TTL a repeated read never leaves the process.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Title search, capped to a short page. A blank query returns an empty
    /// list without calling upstream.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingApiKey`] when no API key is configured,
    /// or [`CatalogError::Upstream`] when the catalog call fails.
    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
    ) -> Result<Vec<SearchResult>, CatalogError>;

    /// Popular titles, optionally biased to a region's curated feed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingApiKey`] or [`CatalogError::Upstream`].
    async fn popular(
        &self,
        media_type: MediaType,
        region: Option<&str>,
    ) -> Result<Vec<PopularItem>, CatalogError>;

    /// Full detail for one title.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the title does not exist
    /// upstream.
    async fn detail(
        &self,
        media_type: MediaType,
        tmdb_id: i32,
    ) -> Result<ContentDetail, CatalogError>;

    /// A person with their combined screen credits.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the person does not exist
    /// upstream.
    async fn person(&self, person_id: i32) -> Result<Person, CatalogError>;
}
