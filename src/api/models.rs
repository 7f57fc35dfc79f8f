use crate::normalize::NormalizedRecipe;
use serde::{Deserialize, Serialize};

/// Body of a semantic name search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Names matched by a search, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub names: Vec<String>,
}

/// Body of a document fetch by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// A stored document's flattened fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub document: NormalizedRecipe,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub store: String,
}
