use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::normalize::{normalize, RecipeRecord};
use crate::store::{DocumentStore, IndexOutcome, RecipeDocument};
use std::path::Path;
use tracing::{error, info};

/// Summary of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub total: usize,
    pub indexed: usize,
    pub failed: usize,
}

/// Run the batch job: check the store, load the collection, then normalize,
/// embed and index one record at a time, in order, with no concurrency.
///
/// A failing record is logged with its index and skipped; the job only
/// aborts when the store is unavailable up front or the input file cannot be
/// read. Writes are store-assigned-ID inserts, so re-running against an
/// unchanged store duplicates every document.
pub async fn run(
    store: &DocumentStore,
    embedder: &dyn Embedder,
    path: &Path,
) -> Result<IndexReport> {
    let cluster = match store.info().await {
        Ok(cluster) => cluster,
        Err(e) => {
            error!("Document store unavailable, aborting: {}", e);
            return Err(e);
        }
    };
    info!("Connected to document store cluster {}", cluster.cluster_name);

    let documents = load_collection(path)?;
    info!(
        "{} documents loaded from {}",
        documents.len(),
        path.display()
    );

    let mut report = IndexReport {
        total: documents.len(),
        ..Default::default()
    };

    for (i, value) in documents.into_iter().enumerate() {
        match index_record(store, embedder, value).await {
            Ok(outcome) => {
                info!("Document {} indexed: {}", i, outcome.result);
                report.indexed += 1;
            }
            Err(e) => {
                error!("Failed to index document {}: {}", i, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Read the input file as a JSON array of loose records. Records are kept as
/// raw values here so one malformed record fails on its own later instead of
/// sinking the whole batch.
fn load_collection(path: &Path) -> Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path)?;
    let documents = serde_json::from_str(&content)?;
    Ok(documents)
}

async fn index_record(
    store: &DocumentStore,
    embedder: &dyn Embedder,
    value: serde_json::Value,
) -> Result<IndexOutcome> {
    let record: RecipeRecord =
        serde_json::from_value(value).map_err(|e| Error::Internal(format!("malformed record: {e}")))?;

    let fields = normalize(&record);
    let embedding = embedder.embed(&fields.embedding_text())?;

    store
        .index_document(&RecipeDocument { fields, embedding })
        .await
}
