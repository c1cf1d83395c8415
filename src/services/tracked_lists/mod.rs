/// Tracked-lists gateway
///
/// CRUD access to the user's favorites, watchlist and recent watches. The
/// lists themselves live in an external user-profile store; this module only
/// defines the contract plus two implementations (in-memory and HTTP).
///
/// Nothing here is cached: deduplication against tracked items is only
/// correct if list reads are always current.
use crate::{
    error::AppResult,
    models::{GatewayResponse, MediaType, TrackedItem, TrackedListKind, TrackedPage, UserSignal},
};

pub mod memory;
pub mod profile_store;

pub use memory::InMemoryTrackedLists;
pub use profile_store::ProfileStoreGateway;

/// Largest page size a list read may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Trait for tracked-list backends
///
/// Transport failures are `Err`; validation and conflicts (already present,
/// not found, unsupported) come back as `success: false` responses.
#[async_trait::async_trait]
pub trait TrackedListsGateway: Send + Sync {
    /// Adds an item; answers `already_present` if `(media_id, media_type)` is in the list
    async fn add(
        &self,
        list: TrackedListKind,
        item: TrackedItem,
    ) -> AppResult<GatewayResponse<TrackedItem>>;

    async fn remove(
        &self,
        list: TrackedListKind,
        media_id: u64,
        media_type: MediaType,
    ) -> AppResult<GatewayResponse<()>>;

    /// One page of a list, newest first. `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    async fn list(
        &self,
        list: TrackedListKind,
        page: u32,
        limit: u32,
    ) -> AppResult<GatewayResponse<TrackedPage>>;

    /// Empties a list. Only recent watches may be cleared.
    async fn clear(&self, list: TrackedListKind) -> AppResult<GatewayResponse<()>>;

    /// Upserts a recent-watch entry and moves it to the front
    async fn record_watch(&self, item: TrackedItem) -> AppResult<GatewayResponse<TrackedItem>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Clamps a `(page, limit)` request to valid bounds
pub fn normalize_paging(page: u32, limit: u32) -> (u32, u32) {
    (page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
}

/// Assembles a [`UserSignal`] from the first `per_list` entries of each list
pub async fn load_signal(
    gateway: &dyn TrackedListsGateway,
    explicit_genres: Vec<String>,
    per_list: u32,
) -> AppResult<UserSignal> {
    let (favorites, watchlist, recent_watches) = tokio::try_join!(
        read_list(gateway, TrackedListKind::Favorites, per_list),
        read_list(gateway, TrackedListKind::Watchlist, per_list),
        read_list(gateway, TrackedListKind::RecentWatches, per_list),
    )?;

    Ok(UserSignal {
        favorites,
        watchlist,
        recent_watches,
        explicit_genres,
    })
}

async fn read_list(
    gateway: &dyn TrackedListsGateway,
    list: TrackedListKind,
    limit: u32,
) -> AppResult<Vec<TrackedItem>> {
    let response = gateway.list(list, 1, limit).await?;
    if !response.success {
        tracing::warn!(
            list = %list,
            gateway = gateway.name(),
            message = %response.message,
            "Tracked list read rejected"
        );
        return Ok(Vec::new());
    }
    Ok(response.data.map(|page| page.items).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_paging() {
        assert_eq!(normalize_paging(0, 0), (1, 1));
        assert_eq!(normalize_paging(3, 20), (3, 20));
        assert_eq!(normalize_paging(1, 500), (1, MAX_PAGE_SIZE));
    }

    #[tokio::test]
    async fn test_load_signal_reads_every_list() {
        let gateway = InMemoryTrackedLists::new();
        gateway
            .add(
                TrackedListKind::Favorites,
                TrackedItem::new(1, MediaType::Movie, "Alien").with_genres(["Horror"]),
            )
            .await
            .unwrap();
        gateway
            .add(
                TrackedListKind::Watchlist,
                TrackedItem::new(2, MediaType::Tv, "Dark"),
            )
            .await
            .unwrap();

        let signal = load_signal(&gateway, vec!["Drama".to_string()], 50)
            .await
            .unwrap();

        assert_eq!(signal.favorites.len(), 1);
        assert_eq!(signal.favorites[0].genres, vec!["Horror".to_string()]);
        assert_eq!(signal.watchlist.len(), 1);
        assert!(signal.recent_watches.is_empty());
        assert_eq!(signal.explicit_genres, vec!["Drama".to_string()]);
    }
}
