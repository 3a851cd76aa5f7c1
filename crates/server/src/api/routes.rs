use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{batches, handlers, middleware::metrics_middleware, progress, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Single tickets
        .route("/tickets/render", post(tickets::render_ticket))
        .route("/tickets/position-test", put(tickets::position_test))
        // Batches
        .route("/batches", post(batches::create_batch))
        // Progress
        .route(
            "/progress",
            get(progress::get_progress)
                .post(progress::upsert_progress)
                .delete(progress::delete_progress),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
