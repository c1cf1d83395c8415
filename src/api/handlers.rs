use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{
    GatewayResponse, MediaType, RecommendationSet, ResponseCode, TrackedItem, TrackedListKind,
    TrackedPage,
};
use crate::services::recommend_with_fallback;
use crate::services::tracked_lists::{load_signal, MAX_PAGE_SIZE};

use super::AppState;

/// Largest `limit` a recommendation request may ask for
pub const MAX_RECOMMENDATIONS: usize = 100;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Comma-separated explicit genre preferences
    pub genres: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

fn parse_list(list: &str) -> AppResult<TrackedListKind> {
    TrackedListKind::parse(list)
        .ok_or_else(|| AppError::NotFound(format!("Unknown list: {}", list)))
}

fn parse_media_type(media_type: &str) -> AppResult<MediaType> {
    MediaType::parse(media_type)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown media type: {}", media_type)))
}

fn parse_genres(genres: Option<&str>) -> Vec<String> {
    genres
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps an unsuccessful gateway response onto an HTTP status
fn status_for<T>(response: &GatewayResponse<T>, success: StatusCode) -> StatusCode {
    if response.success {
        return success;
    }
    match response.code {
        Some(ResponseCode::AlreadyPresent) => StatusCode::CONFLICT,
        Some(ResponseCode::NotFound) => StatusCode::NOT_FOUND,
        Some(ResponseCode::Unsupported | ResponseCode::Invalid) | None => StatusCode::BAD_REQUEST,
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Personalized recommendations, backed by generic content when the pass comes back empty
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationSet>> {
    let limit = query
        .limit
        .unwrap_or(state.recommendation_limit)
        .min(MAX_RECOMMENDATIONS);
    let explicit_genres = parse_genres(query.genres.as_deref());

    tracing::info!(
        request_id = %request_id,
        limit,
        explicit_genres = explicit_genres.len(),
        "Processing recommendation request"
    );

    let signal = load_signal(state.tracked.as_ref(), explicit_genres, MAX_PAGE_SIZE).await?;
    let recommendations = recommend_with_fallback(&state.engine, &signal, limit).await;

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.candidates.len(),
        source = ?recommendations.source,
        "Recommendations completed"
    );

    Ok(Json(recommendations))
}

/// Get one page of a tracked list
pub async fn list_items(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<GatewayResponse<TrackedPage>>> {
    let list = parse_list(&list)?;
    let response = state
        .tracked
        .list(list, query.page.unwrap_or(1), query.limit.unwrap_or(20))
        .await?;
    Ok(Json(response))
}

/// Add an item to a tracked list
pub async fn add_item(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Json(item): Json<TrackedItem>,
) -> AppResult<(StatusCode, Json<GatewayResponse<TrackedItem>>)> {
    let list = parse_list(&list)?;
    let response = state.tracked.add(list, item).await?;
    Ok((status_for(&response, StatusCode::CREATED), Json(response)))
}

/// Remove an item from a tracked list
pub async fn remove_item(
    State(state): State<AppState>,
    Path((list, media_type, media_id)): Path<(String, String, u64)>,
) -> AppResult<(StatusCode, Json<GatewayResponse<()>>)> {
    let list = parse_list(&list)?;
    let media_type = parse_media_type(&media_type)?;
    let response = state.tracked.remove(list, media_id, media_type).await?;
    Ok((status_for(&response, StatusCode::OK), Json(response)))
}

/// Clear a tracked list (recent watches only)
pub async fn clear_list(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> AppResult<(StatusCode, Json<GatewayResponse<()>>)> {
    let list = parse_list(&list)?;
    let response = state.tracked.clear(list).await?;
    Ok((status_for(&response, StatusCode::OK), Json(response)))
}

/// Record (or update) a recent watch. Only `recent-watches` accepts upserts.
pub async fn record_watch(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Json(item): Json<TrackedItem>,
) -> AppResult<(StatusCode, Json<GatewayResponse<TrackedItem>>)> {
    let list = parse_list(&list)?;
    if list != TrackedListKind::RecentWatches {
        let response = GatewayResponse::rejected(
            ResponseCode::Unsupported,
            format!("{} does not record watches", list.label()),
        );
        return Ok((StatusCode::BAD_REQUEST, Json(response)));
    }
    let response = state.tracked.record_watch(item).await?;
    Ok((status_for(&response, StatusCode::OK), Json(response)))
}

/// Drop cached catalog responses whose key contains `pattern` (or all of them)
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.invalidate(query.pattern.as_deref());
    tracing::info!(pattern = ?query.pattern, removed, "Cache invalidated on request");
    Json(InvalidateResponse { removed })
}
