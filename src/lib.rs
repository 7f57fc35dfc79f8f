pub mod api;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod normalize;
pub mod store;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
