use clap::Parser;
use recipe_search::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::{LogConfig, Settings},
    embedding::{Embedder, SentenceEmbedder},
    indexer,
    store::DocumentStore,
    Error, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on drop
    let _guard = init_logging(&settings.log);

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Index { file } => {
            index_collection(settings, file).await?;
        }
        Commands::Search { query } => {
            search_names(settings, query).await?;
        }
    }

    Ok(())
}

/// Log to the console and to a local file, teeing every line to both.
fn init_logging(config: &LogConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let directory = config
        .file_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = config
        .file_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(|| "recipe-search.log".into());

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_search=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    guard
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting recipe search server");
    info!("Document store: {}", settings.store.url);
    info!("Index: {}", settings.store.index);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Load the embedding model once; requests share it behind the trait
    let embedder = SentenceEmbedder::new(&settings.model)?;
    info!(
        "Embedding model loaded: {} ({} dimensions)",
        embedder.model_name(),
        embedder.dimension()
    );

    let store = DocumentStore::new(&settings.store);

    // Create application state
    let state = AppState {
        embedder: Arc::new(embedder),
        store,
    };

    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Recipe Search Server");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Store: {}", settings.store.url);
    println!("Model: {}", settings.model.name);
    println!("\nEndpoints:");
    println!("  POST /search-names/");
    println!("  POST /get-document/");
    println!("  GET  /health");
    println!("  GET  /ready");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn index_collection(settings: Settings, file: Option<PathBuf>) -> Result<()> {
    let path = file.unwrap_or_else(|| settings.indexer.recipes_path.clone());

    info!("Indexing collection: {}", path.display());

    let embedder = SentenceEmbedder::new(&settings.model)?;
    info!(
        "Embedding model loaded: {} ({} dimensions)",
        embedder.model_name(),
        embedder.dimension()
    );

    let store = DocumentStore::new(&settings.store);
    let report = indexer::run(&store, &embedder, &path).await?;

    println!(
        "\x1b[32m\u{2713}\x1b[0m Indexing complete: {} indexed, {} failed (of {})",
        report.indexed, report.failed, report.total
    );

    Ok(())
}

async fn search_names(settings: Settings, query: String) -> Result<()> {
    let server_url = settings
        .server
        .external_url
        .unwrap_or_else(|| format!("http://{}:{}", settings.server.host, settings.server.port));

    recipe_search::cli::commands::search(&server_url, &query).await
}
