use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::handlers::{self, AppState};

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Search
        .route("/search-names/", post(handlers::search_names))
        // Documents
        .route("/get-document/", post(handlers::get_document))
        // Health
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state)
        .layer(
            // CORS - allow all origins for browser callers
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            // Tracing
            TraceLayer::new_for_http(),
        )
}
