use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{normalize_paging, TrackedListsGateway};
use crate::{
    error::AppResult,
    models::{
        GatewayResponse, MediaType, ResponseCode, TrackedItem, TrackedListKind, TrackedPage,
    },
};

/// Process-local tracked lists, newest entry first.
///
/// Used when no profile store is configured, and in tests.
#[derive(Default)]
pub struct InMemoryTrackedLists {
    lists: RwLock<HashMap<TrackedListKind, Vec<TrackedItem>>>,
}

impl InMemoryTrackedLists {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TrackedListsGateway for InMemoryTrackedLists {
    async fn add(
        &self,
        list: TrackedListKind,
        item: TrackedItem,
    ) -> AppResult<GatewayResponse<TrackedItem>> {
        if let Err(message) = item.validate() {
            return Ok(GatewayResponse::rejected(ResponseCode::Invalid, message));
        }

        let mut lists = self.lists.write().await;
        let entries = lists.entry(list).or_default();

        if entries
            .iter()
            .any(|existing| existing.matches(item.media_id, item.media_type))
        {
            return Ok(GatewayResponse::rejected(
                ResponseCode::AlreadyPresent,
                format!("\"{}\" is already in {}", item.title, list.label()),
            ));
        }

        entries.insert(0, item.clone());
        tracing::debug!(list = %list, media_id = item.media_id, "Tracked item added");

        Ok(GatewayResponse::ok(
            format!("Added \"{}\" to {}", item.title, list.label()),
            item,
        ))
    }

    async fn remove(
        &self,
        list: TrackedListKind,
        media_id: u64,
        media_type: MediaType,
    ) -> AppResult<GatewayResponse<()>> {
        let mut lists = self.lists.write().await;
        let entries = lists.entry(list).or_default();
        let before = entries.len();
        entries.retain(|existing| !existing.matches(media_id, media_type));

        if entries.len() == before {
            return Ok(GatewayResponse::rejected(
                ResponseCode::NotFound,
                format!("{} {} is not in {}", media_type, media_id, list.label()),
            ));
        }

        Ok(GatewayResponse::ok(
            format!("Removed from {}", list.label()),
            (),
        ))
    }

    async fn list(
        &self,
        list: TrackedListKind,
        page: u32,
        limit: u32,
    ) -> AppResult<GatewayResponse<TrackedPage>> {
        let (page, limit) = normalize_paging(page, limit);
        let lists = self.lists.read().await;
        let entries = lists.get(&list).map(Vec::as_slice).unwrap_or_default();

        let total = entries.len() as u32;
        let offset = (page as usize - 1).saturating_mul(limit as usize);
        let items = entries
            .iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(GatewayResponse::ok(
            format!("Fetched {}", list.label()),
            TrackedPage {
                items,
                page,
                total_pages: total.div_ceil(limit),
                total,
            },
        ))
    }

    async fn clear(&self, list: TrackedListKind) -> AppResult<GatewayResponse<()>> {
        if list != TrackedListKind::RecentWatches {
            return Ok(GatewayResponse::rejected(
                ResponseCode::Unsupported,
                format!("{} cannot be cleared", list.label()),
            ));
        }

        self.lists.write().await.remove(&list);
        Ok(GatewayResponse::ok(
            format!("Cleared {}", list.label()),
            (),
        ))
    }

    async fn record_watch(&self, mut item: TrackedItem) -> AppResult<GatewayResponse<TrackedItem>> {
        if let Err(message) = item.validate() {
            return Ok(GatewayResponse::rejected(ResponseCode::Invalid, message));
        }
        let now = Utc::now();
        item.watched_at = Some(item.watched_at.unwrap_or(now));

        let mut lists = self.lists.write().await;
        let entries = lists.entry(TrackedListKind::RecentWatches).or_default();

        if let Some(index) = entries
            .iter()
            .position(|existing| existing.matches(item.media_id, item.media_type))
        {
            // Keep the original add time; everything else reflects the latest watch.
            item.added_at = entries.remove(index).added_at;
        }

        entries.insert(0, item.clone());
        Ok(GatewayResponse::ok(
            format!("Recorded watch of \"{}\"", item.title),
            item,
        ))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
