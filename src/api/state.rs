use std::sync::Arc;

use crate::cache::FetchCache;
use crate::config::Config;
use crate::services::{
    CatalogClient, InMemoryTrackedLists, ProfileStoreGateway, RecommendationEngine, TmdbCatalog,
    TrackedListsGateway,
};

/// Default number of recommendations when the request doesn't say
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 20;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tracked: Arc<dyn TrackedListsGateway>,
    pub engine: Arc<RecommendationEngine>,
    pub cache: FetchCache,
    pub recommendation_limit: usize,
}

impl AppState {
    /// Wires the engine to `catalog`. `cache` should be the one `catalog` writes to.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        tracked: Arc<dyn TrackedListsGateway>,
        cache: FetchCache,
    ) -> Self {
        Self {
            engine: Arc::new(RecommendationEngine::new(catalog)),
            tracked,
            cache,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }

    pub fn with_recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = limit;
        self
    }

    /// Builds the TMDB catalog and picks the tracked-lists backend from configuration
    pub fn from_config(config: &Config) -> Self {
        let cache = FetchCache::new();
        let catalog: Arc<dyn CatalogClient> =
            Arc::new(TmdbCatalog::from_config(config, cache.clone()));

        let tracked: Arc<dyn TrackedListsGateway> = match &config.profile_store_url {
            Some(url) => Arc::new(ProfileStoreGateway::new(
                url.clone(),
                config.profile_store_token.clone(),
            )),
            None => Arc::new(InMemoryTrackedLists::new()),
        };

        tracing::info!(
            catalog = catalog.name(),
            tracked_lists = tracked.name(),
            "Application state initialized"
        );

        Self::new(catalog, tracked, cache).with_recommendation_limit(config.recommendation_limit)
    }
}
