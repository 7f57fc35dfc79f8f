use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::normalize::NormalizedRecipe;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

/// Nearest neighbours returned per name search.
pub const KNN_K: usize = 10;
/// Candidate pool examined by the store's approximate k-NN stage.
pub const KNN_NUM_CANDIDATES: usize = 30;

/// Wire form of an indexed recipe: the flattened fields plus the embedding.
/// This is the only persisted representation.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDocument {
    #[serde(flatten)]
    pub fields: NormalizedRecipe,
    pub embedding: Vec<f32>,
}

/// Store acknowledgement for a single document write.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexOutcome {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Write result as reported by the store, normally `created`.
    pub result: String,
}

/// Cluster description returned by the store's root endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub cluster_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope<T> {
    hits: HitsEnvelope<T>,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Debug, Deserialize)]
struct NameSource {
    name: String,
}

/// HTTP client for the external document store (Elasticsearch wire format).
///
/// No request timeout is configured; calls rely on the client library's
/// defaults. Failures are not retried.
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    base_url: String,
    index: String,
}

impl DocumentStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        }
    }

    /// Cluster info from the root endpoint. The indexing job gates on this
    /// before attempting any writes.
    pub async fn info(&self) -> Result<ClusterInfo> {
        let url = format!("{}/", self.base_url);
        debug!("Document store request: GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        read_json(response).await
    }

    /// Liveness probe: true when the store answers its root endpoint.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.client.head(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Insert one document. The store assigns the identifier, so repeated
    /// submissions of the same recipe create duplicate entries.
    pub async fn index_document(&self, document: &RecipeDocument) -> Result<IndexOutcome> {
        let path = format!("/{}/_doc", self.index);
        self.post(&path, document).await
    }

    /// k-NN search over the embedding field, returning matched names in
    /// store order (descending similarity). Only the name field is
    /// retrieved per match.
    pub async fn search_names(&self, embedding: &[f32]) -> Result<Vec<String>> {
        let body = json!({
            "knn": {
                "field": "embedding",
                "query_vector": embedding,
                "k": KNN_K,
                "num_candidates": KNN_NUM_CANDIDATES,
            },
            "_source": ["name"],
        });

        let path = format!("/{}/_search", self.index);
        let envelope: SearchEnvelope<NameSource> = self.post(&path, &body).await?;

        Ok(envelope
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.source.name)
            .collect())
    }

    /// First document whose name matches, or None when there is no hit.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<NormalizedRecipe>> {
        let body = json!({
            "query": { "match": { "name": name } },
        });

        let path = format!("/{}/_search", self.index);
        let envelope: SearchEnvelope<NormalizedRecipe> = self.post(&path, &body).await?;

        Ok(envelope.hits.hits.into_iter().next().map(|hit| hit.source))
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Document store request: POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        read_json(response).await
    }
}

async fn read_json<T>(response: reqwest::Response) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();

    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());
        error!("Document store error: {} - {}", status, error_body);
        return Err(Error::Store(format!("HTTP {status}: {error_body}")));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| Error::Store(format!("failed to parse store response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn store_for(server: &mockito::Server) -> DocumentStore {
        DocumentStore::new(&StoreConfig {
            url: server.url(),
            index: "recipes".to_string(),
        })
    }

    #[tokio::test]
    async fn test_search_names_sends_knn_parameters_and_parses_hits() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/recipes/_search")
            .match_body(Matcher::PartialJson(json!({
                "knn": {
                    "field": "embedding",
                    "k": 10,
                    "num_candidates": 30,
                },
                "_source": ["name"],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"hits": {"hits": [
                    {"_source": {"name": "Berry Smoothie"}},
                    {"_source": {"name": "Green Smoothie"}}
                ]}}"#,
            )
            .create_async()
            .await;

        let store = store_for(&server);
        let names = store
            .search_names(&[0.1, 0.2, 0.3])
            .await
            .expect("search should succeed");

        assert_eq!(names, vec!["Berry Smoothie", "Green Smoothie"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_names_surfaces_store_errors() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/recipes/_search")
            .with_status(500)
            .with_body("store exploded")
            .create_async()
            .await;

        let store = store_for(&server);
        let err = store
            .search_names(&[0.0; 4])
            .await
            .expect_err("search should fail");

        match err {
            Error::Store(msg) => {
                assert!(msg.contains("500"), "diagnostic should carry the status");
                assert!(msg.contains("store exploded"));
            }
            other => panic!("expected store error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_names_fails_on_unreachable_store() {
        // Nothing listens on this port; the connection is refused.
        let store = DocumentStore::new(&StoreConfig {
            url: "http://127.0.0.1:1".to_string(),
            index: "recipes".to_string(),
        });

        let err = store
            .search_names(&[0.0; 4])
            .await
            .expect_err("search should fail");
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_index_document_reports_store_result() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/recipes/_doc")
            .match_body(Matcher::PartialJson(json!({
                "name": "Pancakes",
                "recipeIngredient": "flour, eggs",
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id": "x1", "result": "created"}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let document = RecipeDocument {
            fields: NormalizedRecipe {
                name: "Pancakes".to_string(),
                recipe_ingredient: "flour, eggs".to_string(),
                ..NormalizedRecipe::default()
            },
            embedding: vec![0.5, 0.5],
        };

        let outcome = store
            .index_document(&document)
            .await
            .expect("write should succeed");

        assert_eq!(outcome.result, "created");
        assert_eq!(outcome.id, "x1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_info_parses_cluster_name() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"cluster_name": "recipes-cluster", "tagline": "You Know, for Search"}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let info = store.info().await.expect("info should succeed");
        assert_eq!(info.cluster_name, "recipes-cluster");
    }

    #[tokio::test]
    async fn test_ping_reflects_store_reachability() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("HEAD", "/")
            .with_status(200)
            .create_async()
            .await;

        let store = store_for(&server);
        assert!(store.ping().await);

        let dead_store = DocumentStore::new(&StoreConfig {
            url: "http://127.0.0.1:1".to_string(),
            index: "recipes".to_string(),
        });
        assert!(!dead_store.ping().await);
    }

    #[tokio::test]
    async fn test_find_by_name_returns_first_hit_fields() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/recipes/_search")
            .match_body(Matcher::PartialJson(json!({
                "query": { "match": { "name": "Pancakes" } },
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"hits": {"hits": [{"_source": {
                    "name": "Pancakes",
                    "description": "Fluffy",
                    "recipeIngredient": "flour, eggs",
                    "embedding": [0.1, 0.2]
                }}]}}"#,
            )
            .create_async()
            .await;

        let store = store_for(&server);
        let document = store
            .find_by_name("Pancakes")
            .await
            .expect("lookup should succeed")
            .expect("document should exist");

        assert_eq!(document.name, "Pancakes");
        assert_eq!(document.description, "Fluffy");
        assert_eq!(document.recipe_ingredient, "flour, eggs");
    }

    #[tokio::test]
    async fn test_find_by_name_returns_none_without_hits() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/recipes/_search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"hits": {"hits": []}}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let result = store
            .find_by_name("Unknown")
            .await
            .expect("lookup should succeed");
        assert!(result.is_none());
    }
}
