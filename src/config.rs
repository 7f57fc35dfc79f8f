use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub model: ModelConfig,
    pub indexer: IndexerConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
}

/// Connection details for the external document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    pub recipes_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub file_path: PathBuf,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let external_url = std::env::var("EXTERNAL_URL").ok();

        let store_url =
            std::env::var("STORE_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());

        let store_index = std::env::var("STORE_INDEX")
            .unwrap_or_else(|_| "index_with_schema_combined".to_string());

        let model_name =
            std::env::var("MODEL_NAME").unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string());

        let model_cache_dir = std::env::var("MODEL_CACHE_DIR")
            .unwrap_or_else(|_| "./data/models".to_string())
            .into();

        let recipes_path = std::env::var("RECIPES_PATH")
            .unwrap_or_else(|_| "recipes.json".to_string())
            .into();

        let log_file_path = std::env::var("LOG_PATH")
            .unwrap_or_else(|_| "recipe-search.log".to_string())
            .into();

        Ok(Settings {
            server: ServerConfig {
                host,
                port,
                external_url,
            },
            store: StoreConfig {
                url: store_url,
                index: store_index,
            },
            model: ModelConfig {
                name: model_name,
                cache_dir: model_cache_dir,
            },
            indexer: IndexerConfig { recipes_path },
            log: LogConfig {
                file_path: log_file_path,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        url::Url::parse(&self.store.url)
            .map_err(|e| Error::Config(format!("Invalid STORE_URL: {e}")))?;

        if self.store.index.is_empty() {
            return Err(Error::Config("Store index name must not be empty".to_string()));
        }

        Ok(())
    }
}
