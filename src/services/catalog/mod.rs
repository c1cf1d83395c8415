/// Media catalog abstraction
///
/// Every call is a read-only, idempotent lookup against the external movie/TV
/// catalog. Implementations are expected to cache by normalized request
/// signature; callers never need to.
use crate::{
    error::AppResult,
    models::{
        CatalogItem, Credits, Genre, ListCategory, MediaDetails, MediaType, Paged, Review,
        SearchScope, TimeWindow, TrendingScope, Video,
    },
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Trait for media catalog clients
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Curated listing (popular, top rated, upcoming, ...) for one media type
    async fn list(
        &self,
        media_type: MediaType,
        category: ListCategory,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>>;

    async fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>>;

    async fn discover_by_genre(
        &self,
        media_type: MediaType,
        genre_id: u64,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>>;

    /// Free-text search. An empty query is rejected before any I/O.
    async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>>;

    /// Titles the catalog considers similar to `id`, of the same media type
    async fn similar(
        &self,
        media_type: MediaType,
        id: u64,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>>;

    async fn details(&self, media_type: MediaType, id: u64) -> AppResult<MediaDetails>;

    async fn credits(&self, media_type: MediaType, id: u64) -> AppResult<Credits>;

    async fn videos(&self, media_type: MediaType, id: u64) -> AppResult<Vec<Video>>;

    async fn reviews(&self, media_type: MediaType, id: u64, page: u32) -> AppResult<Paged<Review>>;

    /// Genre reference list for one media type
    async fn genres(&self, media_type: MediaType) -> AppResult<Vec<Genre>>;

    /// Generic passthrough: `endpoint` relative to the catalog root, extra query params
    async fn raw(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> AppResult<serde_json::Value>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
