pub mod catalog;
pub mod fetch_state;
pub mod recommendations;
pub mod tracked_lists;

pub use catalog::{CatalogClient, TmdbCatalog};
pub use fetch_state::{FetchController, FetchOutcome, QueryState};
pub use recommendations::{recommend_with_fallback, RecommendationEngine};
pub use tracked_lists::{InMemoryTrackedLists, ProfileStoreGateway, TrackedListsGateway};
