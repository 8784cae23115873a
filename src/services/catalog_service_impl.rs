//! TMDB-backed implementation of [`CatalogService`].
//!
//! Responses are cached in the store under the upstream request descriptor,
//! so identical reads within the TTL never leave the process. Cache failures
//! are logged and ignored; the catalog stays available without it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::clients::tmdb::{TmdbClient, TmdbDetail, TmdbPerson};
use crate::config::CacheConfig;
use crate::constants::{catalog, limits};
use crate::db::Store;
use crate::domain::MediaType;
use crate::services::catalog_service::{
    CastMember, CatalogError, CatalogService, ContentDetail, Person, PersonCredit, PopularItem,
    SearchResult, SeasonSummary,
};

pub struct TmdbCatalogService {
    client: Arc<TmdbClient>,
    store: Arc<Store>,
    cache: CacheConfig,
}

impl TmdbCatalogService {
    #[must_use]
    pub const fn new(client: Arc<TmdbClient>, store: Arc<Store>, cache: CacheConfig) -> Self {
        Self {
            client,
            store,
            cache,
        }
    }

    fn ensure_api_key(&self) -> Result<(), CatalogError> {
        if self.client.has_api_key() {
            Ok(())
        } else {
            Err(CatalogError::MissingApiKey)
        }
    }

    async fn cache_get<T: DeserializeOwned>(&self, cache_key: &str) -> Option<T> {
        match self.store.get_cached_response(cache_key).await {
            Ok(Some(body)) => match serde_json::from_value(body) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::debug!("Ignoring stale cache shape for {cache_key}: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::debug!("Cache read failed for {cache_key}: {err}");
                None
            }
        }
    }

    async fn cache_put<T: Serialize>(&self, cache_key: &str, value: &T, ttl_seconds: u64) {
        match serde_json::to_value(value) {
            Ok(body) => {
                if let Err(err) = self
                    .store
                    .cache_response(cache_key, &body, ttl_seconds)
                    .await
                {
                    tracing::debug!("Cache write failed for {cache_key}: {err}");
                }
            }
            Err(err) => tracing::debug!("Cache write skipped for {cache_key}: {err}"),
        }
    }

    fn map_detail(&self, media_type: MediaType, fetched: &TmdbDetail) -> ContentDetail {
        let runtime = if media_type.is_tv() {
            fetched.episode_run_time.first().copied()
        } else {
            fetched.runtime
        };
        let director = fetched
            .credits
            .as_ref()
            .and_then(|credits| credits.director());
        let cast = fetched.credits.as_ref().map_or_else(Vec::new, |credits| {
            credits
                .cast
                .iter()
                .take(limits::MAX_CAST_MEMBERS)
                .map(|member| CastMember {
                    name: member.name.clone(),
                    character: member.character.clone(),
                    profile_path: self.client.image_url(member.profile_path.as_deref()),
                })
                .collect()
        });
        let watch_link = fetched
            .watch_providers
            .as_ref()
            .and_then(|providers| providers.results.get(catalog::CURATED_REGION))
            .and_then(|country| country.link.clone());
        let seasons = fetched
            .seasons
            .iter()
            .map(|season| SeasonSummary {
                season_number: season.season_number,
                name: season.name.clone(),
                episode_count: season.episode_count,
                air_date: season.air_date.clone(),
            })
            .collect();

        ContentDetail {
            id: fetched.id,
            media_type,
            title: fetched.display_title(),
            overview: fetched.overview.clone(),
            poster_path: self.client.image_url(fetched.poster_path.as_deref()),
            release_year: fetched.release_year(),
            runtime,
            origin_country: fetched.origin_countries(),
            genres: fetched.genres.iter().map(|genre| genre.name.clone()).collect(),
            director,
            cast,
            vote_average: fetched.vote_average,
            number_of_seasons: fetched.number_of_seasons,
            number_of_episodes: fetched.number_of_episodes,
            seasons,
            watch_link,
        }
    }

    fn map_person(&self, fetched: &TmdbPerson) -> Person {
        let credits = fetched
            .combined_credits
            .as_ref()
            .map_or_else(Vec::new, |combined| {
                combined
                    .cast
                    .iter()
                    .filter_map(|credit| {
                        // Combined credits mix in appearances that are neither
                        // movies nor series; those are skipped.
                        let media_type = MediaType::parse(credit.media_type.as_deref()?)?;
                        Some(PersonCredit {
                            id: credit.id,
                            title: credit
                                .title
                                .clone()
                                .or_else(|| credit.name.clone())
                                .unwrap_or_default(),
                            character: credit.character.clone(),
                            media_type,
                            poster_path: self.client.image_url(credit.poster_path.as_deref()),
                            release_date: credit
                                .release_date
                                .clone()
                                .or_else(|| credit.first_air_date.clone()),
                            vote_average: credit.vote_average,
                            popularity: credit.popularity,
                        })
                    })
                    .collect()
            });

        Person {
            id: fetched.id,
            name: fetched.name.clone(),
            biography: fetched.biography.clone(),
            birthday: fetched.birthday.clone(),
            deathday: fetched.deathday.clone(),
            place_of_birth: fetched.place_of_birth.clone(),
            profile_path: self.client.image_url(fetched.profile_path.as_deref()),
            known_for_department: fetched.known_for_department.clone(),
            imdb_id: fetched.imdb_id.clone(),
            credits,
        }
    }
}

fn uses_curated_feed(media_type: MediaType, region: Option<&str>) -> bool {
    region == Some(catalog::CURATED_REGION) && !media_type.is_tv()
}

#[async_trait]
impl CatalogService for TmdbCatalogService {
    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
    ) -> Result<Vec<SearchResult>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_api_key()?;

        let cache_key = self.client.search_path(media_type, query);
        if let Some(cached) = self.cache_get(&cache_key).await {
            return Ok(cached);
        }

        let page = self.client.search(media_type, query).await?;
        let entries: Vec<_> = page
            .results
            .into_iter()
            .take(limits::MAX_LIST_RESULTS)
            .collect();

        // Director lookups run in parallel and fail silently per entry; a
        // missing credits response never sinks the whole search.
        let credit_lookups = entries
            .iter()
            .map(|entry| self.client.credits(media_type, entry.id));
        let credits = futures::future::join_all(credit_lookups).await;

        let results: Vec<SearchResult> = entries
            .iter()
            .zip(credits)
            .map(|(entry, credits)| {
                let director = match credits {
                    Ok(Some(credits)) => credits.director(),
                    Ok(None) => None,
                    Err(err) => {
                        tracing::debug!(
                            "Skipping director for {media_type} {}: {err}",
                            entry.id
                        );
                        None
                    }
                };
                SearchResult {
                    id: entry.id,
                    title: entry.display_title(),
                    media_type,
                    poster_path: self.client.image_url(entry.poster_path.as_deref()),
                    release_year: entry.release_year(),
                    director,
                }
            })
            .collect();

        self.cache_put(&cache_key, &results, self.cache.search_ttl_seconds)
            .await;
        Ok(results)
    }

    async fn popular(
        &self,
        media_type: MediaType,
        region: Option<&str>,
    ) -> Result<Vec<PopularItem>, CatalogError> {
        self.ensure_api_key()?;

        let curated = uses_curated_feed(media_type, region);
        let cache_key = if curated {
            self.client.discover_movies_path(catalog::CURATED_REGION)
        } else {
            self.client.popular_path(media_type)
        };
        if let Some(cached) = self.cache_get(&cache_key).await {
            return Ok(cached);
        }

        let page = if curated {
            self.client.discover_movies(catalog::CURATED_REGION).await?
        } else {
            self.client.popular(media_type).await?
        };

        let items: Vec<PopularItem> = page
            .results
            .into_iter()
            .take(limits::MAX_LIST_RESULTS)
            .map(|entry| PopularItem {
                id: entry.id,
                title: entry.display_title(),
                media_type,
                poster_path: self.client.image_url(entry.poster_path.as_deref()),
                release_year: entry.release_year(),
            })
            .collect();

        self.cache_put(&cache_key, &items, self.cache.detail_ttl_seconds)
            .await;
        Ok(items)
    }

    async fn detail(
        &self,
        media_type: MediaType,
        tmdb_id: i32,
    ) -> Result<ContentDetail, CatalogError> {
        self.ensure_api_key()?;

        let cache_key = self.client.detail_path(media_type, tmdb_id);
        if let Some(cached) = self.cache_get(&cache_key).await {
            return Ok(cached);
        }

        let fetched = self
            .client
            .detail(media_type, tmdb_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("{media_type} {tmdb_id}")))?;
        let detail = self.map_detail(media_type, &fetched);

        self.cache_put(&cache_key, &detail, self.cache.detail_ttl_seconds)
            .await;
        Ok(detail)
    }

    async fn person(&self, person_id: i32) -> Result<Person, CatalogError> {
        self.ensure_api_key()?;

        let cache_key = self.client.person_path(person_id);
        if let Some(cached) = self.cache_get(&cache_key).await {
            return Ok(cached);
        }

        let fetched = self
            .client
            .person(person_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("person {person_id}")))?;
        let person = self.map_person(&fetched);

        self.cache_put(&cache_key, &person, self.cache.detail_ttl_seconds)
            .await;
        Ok(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_curated_region_movies_use_the_discover_feed() {
        assert!(uses_curated_feed(MediaType::Movie, Some("TR")));
        assert!(!uses_curated_feed(MediaType::Tv, Some("TR")));
        assert!(!uses_curated_feed(MediaType::Movie, Some("US")));
        assert!(!uses_curated_feed(MediaType::Movie, None));
    }
}
