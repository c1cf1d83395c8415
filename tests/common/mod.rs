#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use reelpick::error::{AppError, AppResult};
use reelpick::models::{
    CatalogItem, Credits, Genre, ListCategory, MediaDetails, MediaType, Paged, Review,
    SearchScope, TimeWindow, TrendingScope, Video,
};
use reelpick::services::CatalogClient;

/// Canned catalog for integration tests. Unconfigured lookups return empty pages.
#[derive(Default)]
pub struct FakeCatalog {
    genres: HashMap<MediaType, Vec<Genre>>,
    discover: HashMap<(MediaType, u64), Vec<CatalogItem>>,
    similar: HashMap<(MediaType, u64), Vec<CatalogItem>>,
    trending: HashMap<MediaType, Vec<CatalogItem>>,
    popular: Vec<CatalogItem>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genres(mut self, media_type: MediaType, genres: &[(u64, &str)]) -> Self {
        let genres = genres
            .iter()
            .map(|(id, name)| Genre {
                id: *id,
                name: name.to_string(),
            })
            .collect();
        self.genres.insert(media_type, genres);
        self
    }

    pub fn with_discover(
        mut self,
        media_type: MediaType,
        genre_id: u64,
        items: Vec<CatalogItem>,
    ) -> Self {
        self.discover.insert((media_type, genre_id), items);
        self
    }

    pub fn with_similar(mut self, media_type: MediaType, id: u64, items: Vec<CatalogItem>) -> Self {
        self.similar.insert((media_type, id), items);
        self
    }

    pub fn with_trending(mut self, media_type: MediaType, items: Vec<CatalogItem>) -> Self {
        self.trending.insert(media_type, items);
        self
    }

    pub fn with_popular(mut self, items: Vec<CatalogItem>) -> Self {
        self.popular = items;
        self
    }

    /// Makes every call to `operation` ("list", "trending", ...) fail
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &'static str, detail: String) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", operation, detail));
        if self.failing.contains(operation) {
            return Err(AppError::ExternalApi(format!("{} unavailable", operation)));
        }
        Ok(())
    }
}

pub fn item(id: u64, media_type: MediaType, vote_average: f64) -> CatalogItem {
    CatalogItem {
        id,
        media_type,
        title: format!("Title {}", id),
        poster_path: Some(format!("/poster{}.jpg", id)),
        backdrop_path: None,
        overview: String::new(),
        vote_average,
        genre_ids: vec![],
        release_date: None,
    }
}

pub fn item_with_genres(id: u64, media_type: MediaType, genre_ids: &[u64]) -> CatalogItem {
    CatalogItem {
        genre_ids: genre_ids.to_vec(),
        ..item(id, media_type, 7.0)
    }
}

#[async_trait::async_trait]
impl CatalogClient for FakeCatalog {
    async fn list(
        &self,
        media_type: MediaType,
        category: ListCategory,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        self.record("list", format!("{}/{}/{}", media_type, category.as_str(), page))?;
        match (media_type, category) {
            (MediaType::Movie, ListCategory::Popular) => Ok(Paged::single(self.popular.clone())),
            _ => Ok(Paged::single(Vec::new())),
        }
    }

    async fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        self.record(
            "trending",
            format!("{}/{}/{}", scope.as_str(), window.as_str(), page),
        )?;
        let items = match scope {
            TrendingScope::Only(media_type) => {
                self.trending.get(&media_type).cloned().unwrap_or_default()
            }
            TrendingScope::All => MediaType::ALL
                .iter()
                .flat_map(|t| self.trending.get(t).cloned().unwrap_or_default())
                .collect(),
        };
        Ok(Paged::single(items))
    }

    async fn discover_by_genre(
        &self,
        media_type: MediaType,
        genre_id: u64,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        self.record("discover", format!("{}/{}/{}", media_type, genre_id, page))?;
        let items = self
            .discover
            .get(&(media_type, genre_id))
            .cloned()
            .unwrap_or_default();
        Ok(Paged::single(items))
    }

    async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        self.record("search", format!("{}/{}/{}", scope.as_str(), query, page))?;
        Ok(Paged::single(Vec::new()))
    }

    async fn similar(
        &self,
        media_type: MediaType,
        id: u64,
        page: u32,
    ) -> AppResult<Paged<CatalogItem>> {
        self.record("similar", format!("{}/{}/{}", media_type, id, page))?;
        let items = self
            .similar
            .get(&(media_type, id))
            .cloned()
            .unwrap_or_default();
        Ok(Paged::single(items))
    }

    async fn details(&self, media_type: MediaType, id: u64) -> AppResult<MediaDetails> {
        self.record("details", format!("{}/{}", media_type, id))?;
        Err(AppError::NotFound(format!("{} {}", media_type, id)))
    }

    async fn credits(&self, media_type: MediaType, id: u64) -> AppResult<Credits> {
        self.record("credits", format!("{}/{}", media_type, id))?;
        Err(AppError::NotFound(format!("{} {}", media_type, id)))
    }

    async fn videos(&self, media_type: MediaType, id: u64) -> AppResult<Vec<Video>> {
        self.record("videos", format!("{}/{}", media_type, id))?;
        Ok(Vec::new())
    }

    async fn reviews(&self, media_type: MediaType, id: u64, page: u32) -> AppResult<Paged<Review>> {
        self.record("reviews", format!("{}/{}/{}", media_type, id, page))?;
        Ok(Paged::single(Vec::new()))
    }

    async fn genres(&self, media_type: MediaType) -> AppResult<Vec<Genre>> {
        self.record("genres", media_type.to_string())?;
        Ok(self.genres.get(&media_type).cloned().unwrap_or_default())
    }

    async fn raw(
        &self,
        endpoint: &str,
        _params: Vec<(String, String)>,
    ) -> AppResult<serde_json::Value> {
        self.record("raw", endpoint.to_string())?;
        Ok(serde_json::Value::Null)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
