use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use crate::{api::models::*, embedding::Embedder, store::DocumentStore, Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub embedder: Arc<dyn Embedder>,
    pub store: DocumentStore,
}

/// POST /search-names/ - Search document names by meaning
pub async fn search_names(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<SearchResponse>> {
    debug!("Search request: {:?}", payload.query);

    let vector = state.embedder.embed(&payload.query)?;
    let names = state.store.search_names(&vector).await?;

    debug!("Search returned {} names", names.len());

    Ok(Json(SearchResponse { names }))
}

/// POST /get-document/ - Fetch a stored document by exact name
pub async fn get_document(
    State(state): State<AppState>,
    Json(payload): Json<NameRequest>,
) -> Result<Json<DocumentResponse>> {
    debug!("Get document request: {:?}", payload.name);

    let document = state
        .store
        .find_by_name(&payload.name)
        .await?
        .ok_or_else(|| Error::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse { document }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    // Check document store connectivity
    let store_healthy = state.store.ping().await;

    Ok(Json(ReadinessResponse {
        ready: store_healthy,
        store: if store_healthy { "ok" } else { "error" }.to_string(),
    }))
}
