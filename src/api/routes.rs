use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Wraps the trace layer, so the trace span can see the request ID
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(handlers::get_recommendations))
        // Tracked lists
        .route(
            "/lists/:list",
            get(handlers::list_items)
                .post(handlers::add_item)
                .put(handlers::record_watch)
                .delete(handlers::clear_list),
        )
        .route(
            "/lists/:list/:media_type/:media_id",
            delete(handlers::remove_item),
        )
        // Cache
        .route("/cache/invalidate", post(handlers::invalidate_cache))
}
