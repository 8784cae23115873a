use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::TmdbConfig;
use crate::domain::MediaType;

#[derive(Debug, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbListEntry>,
}

/// One row of a search, popular or discover listing. Movies carry `title` and
/// `release_date`, series carry `name` and `first_air_date`.
#[derive(Debug, Deserialize)]
pub struct TmdbListEntry {
    pub id: i32,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

impl TmdbListEntry {
    #[must_use]
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }

    /// First four characters of whichever date field is populated.
    #[must_use]
    pub fn release_year(&self) -> Option<String> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .filter(|date| date.len() >= 4)
            .map(|date| date[..4].to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

impl TmdbCredits {
    /// Name of the first crew member whose job is "Director", if any.
    #[must_use]
    pub fn director(&self) -> Option<String> {
        self.crew
            .iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    pub job: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TmdbProductionCountry {
    pub iso_3166_1: String,
}

#[derive(Debug, Deserialize)]
pub struct TmdbSeason {
    pub season_number: i32,
    pub name: Option<String>,
    pub episode_count: Option<i32>,
    pub air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbWatchProviders {
    #[serde(default)]
    pub results: HashMap<String, TmdbCountryProviders>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCountryProviders {
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbDetail {
    pub id: i32,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub runtime: Option<i32>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub vote_average: Option<f64>,
    pub origin_country: Option<Vec<String>>,
    #[serde(default)]
    pub production_countries: Vec<TmdbProductionCountry>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub seasons: Vec<TmdbSeason>,
    pub credits: Option<TmdbCredits>,
    #[serde(rename = "watch/providers")]
    pub watch_providers: Option<TmdbWatchProviders>,
}

impl TmdbDetail {
    #[must_use]
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn release_year(&self) -> Option<String> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .filter(|date| date.len() >= 4)
            .map(|date| date[..4].to_string())
    }

    /// Origin countries, falling back to production countries when TMDB
    /// leaves `origin_country` unset.
    #[must_use]
    pub fn origin_countries(&self) -> Vec<String> {
        match &self.origin_country {
            Some(countries) if !countries.is_empty() => countries.clone(),
            _ => self
                .production_countries
                .iter()
                .map(|country| country.iso_3166_1.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TmdbPerson {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
    pub imdb_id: Option<String>,
    pub combined_credits: Option<TmdbCombinedCredits>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCombinedCredits {
    #[serde(default)]
    pub cast: Vec<TmdbPersonCredit>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbPersonCredit {
    pub id: i32,
    pub title: Option<String>,
    pub name: Option<String>,
    pub character: Option<String>,
    pub media_type: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
}

/// Thin client for The Movie Database REST API.
///
/// Request descriptors (path plus query, credentials elided) double as cache
/// keys upstream, so every fetch method has a matching `*_path` builder.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    image_base_url: String,
    api_key: String,
    language: String,
    include_adult: bool,
}

impl TmdbClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            include_adult: config.include_adult,
        }
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Full poster / profile image URL for a TMDB image path.
    #[must_use]
    pub fn image_url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}{}", self.image_base_url, p))
    }

    // =========================================================================
    // Request descriptors
    // =========================================================================

    #[must_use]
    pub fn search_path(&self, media_type: MediaType, query: &str) -> String {
        format!(
            "/search/{}?language={}&include_adult={}&query={}",
            media_type.as_str(),
            self.language,
            self.include_adult,
            urlencoding::encode(query)
        )
    }

    #[must_use]
    pub fn popular_path(&self, media_type: MediaType) -> String {
        format!(
            "/{}/popular?language={}&page=1",
            media_type.as_str(),
            self.language
        )
    }

    #[must_use]
    pub fn discover_movies_path(&self, region: &str) -> String {
        format!(
            "/discover/movie?language={}&region={}&sort_by=popularity.desc&include_adult={}&page=1",
            self.language, region, self.include_adult
        )
    }

    #[must_use]
    pub fn detail_path(&self, media_type: MediaType, tmdb_id: i32) -> String {
        format!(
            "/{}/{}?language={}&append_to_response=credits,watch/providers",
            media_type.as_str(),
            tmdb_id,
            self.language
        )
    }

    #[must_use]
    pub fn person_path(&self, person_id: i32) -> String {
        format!(
            "/person/{}?language={}&append_to_response=combined_credits",
            person_id, self.language
        )
    }

    // =========================================================================
    // Fetches
    // =========================================================================

    pub async fn search(&self, media_type: MediaType, query: &str) -> Result<TmdbPage> {
        self.get_json(&self.search_path(media_type, query)).await
    }

    pub async fn popular(&self, media_type: MediaType) -> Result<TmdbPage> {
        self.get_json(&self.popular_path(media_type)).await
    }

    pub async fn discover_movies(&self, region: &str) -> Result<TmdbPage> {
        self.get_json(&self.discover_movies_path(region)).await
    }

    /// Crew and cast for one title. Missing credits are not an error.
    pub async fn credits(&self, media_type: MediaType, tmdb_id: i32) -> Result<Option<TmdbCredits>> {
        let path = format!("/{}/{}/credits", media_type.as_str(), tmdb_id);
        self.get_json_optional(&path).await
    }

    /// Title detail with credits and watch providers appended.
    pub async fn detail(&self, media_type: MediaType, tmdb_id: i32) -> Result<Option<TmdbDetail>> {
        self.get_json_optional(&self.detail_path(media_type, tmdb_id))
            .await
    }

    /// Bare title detail without appended sub-resources. Used where only the
    /// country fields matter.
    pub async fn detail_plain(
        &self,
        media_type: MediaType,
        tmdb_id: i32,
    ) -> Result<Option<TmdbDetail>> {
        let path = format!(
            "/{}/{}?language={}",
            media_type.as_str(),
            tmdb_id,
            self.language
        );
        self.get_json_optional(&path).await
    }

    pub async fn person(&self, person_id: i32) -> Result<Option<TmdbPerson>> {
        self.get_json_optional(&self.person_path(person_id)).await
    }

    fn request_url(&self, path_query: &str) -> String {
        let separator = if path_query.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}api_key={}",
            self.base_url, path_query, separator, self.api_key
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path_query: &str) -> Result<T> {
        let response = self.client.get(self.request_url(path_query)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        Ok(response.json().await?)
    }

    async fn get_json_optional<T: serde::de::DeserializeOwned>(
        &self,
        path_query: &str,
    ) -> Result<Option<T>> {
        let response = self.client.get(self.request_url(path_query)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        Ok(Some(response.json().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::with_shared_client(Client::new(), &TmdbConfig::default())
    }

    #[test]
    fn list_entry_prefers_title_over_name() {
        let entry = TmdbListEntry {
            id: 1,
            title: Some("Dune".to_string()),
            name: Some("ignored".to_string()),
            poster_path: None,
            release_date: Some("2021-10-22".to_string()),
            first_air_date: None,
        };
        assert_eq!(entry.display_title(), "Dune");
        assert_eq!(entry.release_year().as_deref(), Some("2021"));
    }

    #[test]
    fn release_year_ignores_short_dates() {
        let entry = TmdbListEntry {
            id: 1,
            title: None,
            name: Some("Show".to_string()),
            poster_path: None,
            release_date: None,
            first_air_date: Some("20".to_string()),
        };
        assert_eq!(entry.release_year(), None);
    }

    #[test]
    fn director_takes_first_matching_crew_member() {
        let credits = TmdbCredits {
            cast: vec![],
            crew: vec![
                TmdbCrewMember {
                    name: "Writer".to_string(),
                    job: Some("Writer".to_string()),
                },
                TmdbCrewMember {
                    name: "Denis Villeneuve".to_string(),
                    job: Some("Director".to_string()),
                },
                TmdbCrewMember {
                    name: "Second Unit".to_string(),
                    job: Some("Director".to_string()),
                },
            ],
        };
        assert_eq!(credits.director().as_deref(), Some("Denis Villeneuve"));
    }

    #[test]
    fn origin_countries_fall_back_to_production_countries() {
        let detail = TmdbDetail {
            id: 1,
            title: Some("Film".to_string()),
            name: None,
            overview: None,
            poster_path: None,
            release_date: None,
            first_air_date: None,
            runtime: None,
            episode_run_time: vec![],
            number_of_seasons: None,
            number_of_episodes: None,
            vote_average: None,
            origin_country: None,
            production_countries: vec![TmdbProductionCountry {
                iso_3166_1: "TR".to_string(),
            }],
            genres: vec![],
            seasons: vec![],
            credits: None,
            watch_providers: None,
        };
        assert_eq!(detail.origin_countries(), vec!["TR".to_string()]);
    }

    #[test]
    fn request_descriptors_carry_no_credentials() {
        let client = client();
        let path = client.search_path(MediaType::Movie, "dune part two");
        assert!(path.starts_with("/search/movie?"));
        assert!(path.contains("query=dune%20part%20two"));
        assert!(!path.contains("api_key"));
    }

    #[test]
    fn image_url_joins_base_and_path() {
        let client = client();
        assert_eq!(
            client.image_url(Some("/abc.jpg")),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg".to_string())
        );
        assert_eq!(client.image_url(None), None);
    }
}
