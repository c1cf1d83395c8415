/// TMDB catalog client
///
/// Talks to The Movie Database v3 REST API. Every call goes through the
/// injected [`FetchCache`]: listings, searches and lookups use the catalog
/// TTL, genre reference lists use the longer reference TTL.
///
/// Movie results carry `title`/`release_date`, TV results carry
/// `name`/`first_air_date`; both collapse into [`CatalogItem`]. Mixed
/// results (trending "all", multi search) tag each entry with `media_type`,
/// and entries that are neither movie nor TV (people) are dropped.
use crate::{
    cache::{CacheKey, FetchCache, CATALOG_TTL, REFERENCE_TTL},
    cached,
    config::Config,
    error::{AppError, AppResult},
    models::{
        CatalogItem, Credits, Genre, ListCategory, MediaDetails, MediaType, Paged, Review,
        SearchScope, TimeWindow, TrendingScope, Video,
    },
    services::catalog::CatalogClient,
};
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    cache: FetchCache,
    catalog_ttl: Duration,
    reference_ttl: Duration,
}

/// Raw TMDB list entry shared by movie, TV and multi endpoints
#[derive(Debug, Clone, Deserialize)]
struct TmdbResult {
    id: u64,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genre_ids: Vec<u64>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
}

impl TmdbResult {
    /// `context` is the media type implied by the endpoint, if any
    fn into_item(self, context: Option<MediaType>) -> Option<CatalogItem> {
        let media_type = match self.media_type.as_deref() {
            Some(tag) => MediaType::parse(tag)?,
            None => context?,
        };
        let title = self.title.or(self.name)?;

        Some(CatalogItem {
            id: self.id,
            media_type,
            title,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            overview: self.overview.unwrap_or_default(),
            vote_average: self.vote_average,
            genre_ids: self.genre_ids,
            release_date: non_empty(self.release_date.or(self.first_air_date)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    results: Vec<TmdbResult>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

impl TmdbPage {
    fn into_paged(self, context: Option<MediaType>) -> Paged<CatalogItem> {
        Paged {
            page: self.page,
            results: self
                .results
                .into_iter()
                .filter_map(|r| r.into_item(context))
                .collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbDetails {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    episode_run_time: Vec<u32>,
    #[serde(default)]
    number_of_seasons: Option<u32>,
    #[serde(default)]
    tagline: Option<String>,
}

impl TmdbDetails {
    fn into_details(self, media_type: MediaType) -> MediaDetails {
        MediaDetails {
            id: self.id,
            media_type,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average,
            genres: self.genres,
            release_date: non_empty(self.release_date.or(self.first_air_date)),
            runtime: self
                .runtime
                .or_else(|| self.episode_run_time.first().copied()),
            number_of_seasons: self.number_of_seasons,
            tagline: non_empty(self.tagline),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    results: Vec<Video>,
}

fn first_page() -> u32 {
    1
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TmdbCatalog {
    pub fn new(cache: FetchCache, api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            cache,
            catalog_ttl: CATALOG_TTL,
            reference_ttl: REFERENCE_TTL,
        }
    }

    pub fn from_config(config: &Config, cache: FetchCache) -> Self {
        Self::new(
            cache,
            config.catalog_api_key.clone(),
            config.catalog_api_url.clone(),
            config.catalog_language.clone(),
        )
        .with_ttls(config.catalog_cache_ttl(), config.reference_cache_ttl())
    }

    pub fn with_ttls(mut self, catalog_ttl: Duration, reference_ttl: Duration) -> Self {
        self.catalog_ttl = catalog_ttl;
        self.reference_ttl = reference_ttl;
        self
    }

    /// Cache key for a request. The API key is deliberately left out.
    fn cache_key(&self, endpoint: &str, params: &[(&str, String)]) -> CacheKey {
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        pairs.push(("language", self.language.as_str()));
        CacheKey::from_pairs(endpoint, &pairs)
    }

    /// Issues a GET against the catalog and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, endpoint);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = %endpoint,
                status = %status,
                "Catalog request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let decoded = response.json::<T>().await?;
        tracing::debug!(endpoint = %endpoint, provider = "tmdb", "Catalog request completed");
        Ok(decoded)
    }

    async fn fetch_page(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
        context: Option<MediaType>,
    ) -> AppResult<Paged<CatalogItem>> {
        cached!(
            self.cache,
            self.cache_key(endpoint, &params),
            self.catalog_ttl,
            async {
                let raw: TmdbPage = self.get_json(endpoint, &params).await?;
                Ok::<_, AppError>(raw.into_paged(context))
            }
        )
    }

    async fn fetch_cached<T>(&self, endpoint: &str, params: Vec<(&str, String)>) -> AppResult<T>
    where
        T: serde::Serialize + DeserializeOwned,
    {
        cached!(
            self.cache,
            self.cache_key(endpoint, &params),
            self.catalog_ttl,
            self.get_json::<T>(endpoint, &params)
        )
    }
}

fn page_param(page: u32) -> (&'static str, String) {
    ("page", page.max(1).to_string())
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalog {
    async fn list(
        &self,
        media_type: MediaType,
        category: ListCategory,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        if !category.supports(media_type) {
            return Err(AppError::InvalidInput(format!(
                "Category {} is not available for {}",
                category.as_str(),
                media_type
            )));
        }

        let endpoint = format!("/{}/{}", media_type, category.as_str());
        self.fetch_page(&endpoint, vec![page_param(page)], Some(media_type))
            .await
    }

    async fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        let endpoint = format!("/trending/{}/{}", scope.as_str(), window.as_str());
        let context = match scope {
            TrendingScope::All => None,
            TrendingScope::Only(media_type) => Some(media_type),
        };
        self.fetch_page(&endpoint, vec![page_param(page)], context)
            .await
    }

    async fn discover_by_genre(
        &self,
        media_type: MediaType,
        genre_id: u64,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        let endpoint = format!("/discover/{}", media_type);
        let params = vec![
            ("with_genres", genre_id.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            page_param(page),
        ];
        self.fetch_page(&endpoint, params, Some(media_type)).await
    }

    async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let endpoint = format!("/search/{}", scope.as_str());
        let context = match scope {
            SearchScope::Movie => Some(MediaType::Movie),
            SearchScope::Tv => Some(MediaType::Tv),
            SearchScope::Multi => None,
        };
        let params = vec![("query", query.to_string()), page_param(page)];

        let results = self.fetch_page(&endpoint, params, context).await?;
        tracing::info!(
            query = %query,
            results = results.results.len(),
            provider = "tmdb",
            "Title search completed"
        );
        Ok(results)
    }

    async fn similar(
        &self,
        media_type: MediaType,
        id: u64,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        let endpoint = format!("/{}/{}/similar", media_type, id);
        self.fetch_page(&endpoint, vec![page_param(page)], Some(media_type))
            .await
    }

    async fn details(&self, media_type: MediaType, id: u64) -> AppResult<MediaDetails> {
        let endpoint = format!("/{}/{}", media_type, id);
        cached!(
            self.cache,
            self.cache_key(&endpoint, &[]),
            self.catalog_ttl,
            async {
                let raw: TmdbDetails = self.get_json(&endpoint, &[]).await?;
                Ok::<_, AppError>(raw.into_details(media_type))
            }
        )
    }

    async fn credits(&self, media_type: MediaType, id: u64) -> AppResult<Credits> {
        self.fetch_cached(&format!("/{}/{}/credits", media_type, id), vec![])
            .await
    }

    async fn videos(&self, media_type: MediaType, id: u64) -> AppResult<Vec<Video>> {
        let endpoint = format!("/{}/{}/videos", media_type, id);
        cached!(
            self.cache,
            self.cache_key(&endpoint, &[]),
            self.catalog_ttl,
            async {
                let raw: VideosResponse = self.get_json(&endpoint, &[]).await?;
                Ok::<_, AppError>(raw.results)
            }
        )
    }

    async fn reviews(&self, media_type: MediaType, id: u64, page: u32) -> AppResult<Paged<Review>> {
        self.fetch_cached(
            &format!("/{}/{}/reviews", media_type, id),
            vec![page_param(page)],
        )
        .await
    }

    async fn genres(&self, media_type: MediaType) -> AppResult<Vec<Genre>> {
        let endpoint = format!("/genre/{}/list", media_type);
        cached!(
            self.cache,
            self.cache_key(&endpoint, &[]),
            self.reference_ttl,
            async {
                let raw: GenreListResponse = self.get_json(&endpoint, &[]).await?;
                Ok::<_, AppError>(raw.genres)
            }
        )
    }

    async fn raw(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> AppResult<serde_json::Value> {
        if !endpoint.starts_with('/') || endpoint.contains("..") {
            return Err(AppError::InvalidInput(format!(
                "Invalid catalog endpoint: {}",
                endpoint
            )));
        }

        let params: Vec<(&str, String)> = params
            .iter()
            .filter(|(k, _)| k != "api_key")
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        self.fetch_cached(endpoint, params).await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_result_uses_endpoint_context() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/matrix.jpg",
            "overview": "A hacker learns the truth.",
            "vote_average": 8.2,
            "genre_ids": [28, 878],
            "release_date": "1999-03-30"
        }"#;

        let raw: TmdbResult = serde_json::from_str(json).unwrap();
        let item = raw.into_item(Some(MediaType::Movie)).unwrap();
        assert_eq!(item.media_type, MediaType::Movie);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.genre_ids, vec![28, 878]);
        assert_eq!(item.release_date.as_deref(), Some("1999-03-30"));
    }

    #[test]
    fn test_tv_result_collapses_name_and_air_date() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "vote_average": 8.9
        }"#;

        let raw: TmdbResult = serde_json::from_str(json).unwrap();
        let item = raw.into_item(Some(MediaType::Tv)).unwrap();
        assert_eq!(item.title, "Breaking Bad");
        assert_eq!(item.release_date.as_deref(), Some("2008-01-20"));
        assert!(item.genre_ids.is_empty());
    }

    #[test]
    fn test_tagged_result_overrides_context_and_people_are_dropped() {
        let page: TmdbPage = serde_json::from_str(
            r#"{
                "page": 1,
                "total_pages": 4,
                "total_results": 70,
                "results": [
                    {"id": 1, "media_type": "tv", "name": "Dark"},
                    {"id": 2, "media_type": "person", "name": "Keanu Reeves"},
                    {"id": 3, "media_type": "movie", "title": "Heat", "release_date": ""}
                ]
            }"#,
        )
        .unwrap();

        let paged = page.into_paged(None);
        assert_eq!(paged.total_pages, 4);
        assert_eq!(paged.results.len(), 2);
        assert_eq!(paged.results[0].media_type, MediaType::Tv);
        assert_eq!(paged.results[1].media_type, MediaType::Movie);
        assert_eq!(paged.results[1].release_date, None);
    }

    #[test]
    fn test_untagged_result_without_context_is_dropped() {
        let raw: TmdbResult = serde_json::from_str(r#"{"id": 1, "title": "X"}"#).unwrap();
        assert!(raw.into_item(None).is_none());
    }

    #[test]
    fn test_tv_details_fall_back_to_episode_runtime() {
        let raw: TmdbDetails = serde_json::from_str(
            r#"{
                "id": 1396,
                "name": "Breaking Bad",
                "episode_run_time": [47, 45],
                "number_of_seasons": 5,
                "genres": [{"id": 18, "name": "Drama"}],
                "tagline": ""
            }"#,
        )
        .unwrap();

        let details = raw.into_details(MediaType::Tv);
        assert_eq!(details.title, "Breaking Bad");
        assert_eq!(details.runtime, Some(47));
        assert_eq!(details.number_of_seasons, Some(5));
        assert_eq!(details.tagline, None);
        assert_eq!(details.genres[0].name, "Drama");
    }

    #[test]
    fn test_cache_key_excludes_api_key() {
        let catalog = TmdbCatalog::new(
            FetchCache::new(),
            "super-secret".to_string(),
            "http://test.local/".to_string(),
            "en-US".to_string(),
        );

        let key = catalog.cache_key("/movie/popular", &[page_param(2)]);
        assert!(!key.as_str().contains("super-secret"));
        assert!(key.as_str().contains("en-US"));
        assert_eq!(catalog.api_url, "http://test.local");
    }

    #[test]
    fn test_page_param_is_at_least_one() {
        assert_eq!(page_param(0), ("page", "1".to_string()));
        assert_eq!(page_param(3), ("page", "3".to_string()));
    }
}
