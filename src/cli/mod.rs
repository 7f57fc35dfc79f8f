pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recipe-search")]
#[command(about = "Semantic recipe search backed by a shared document store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the search server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Embed and index a JSON recipe collection
    Index {
        /// Path to the collection file (defaults to RECIPES_PATH)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Search recipe names on a running server
    Search {
        /// Search query
        query: String,
    },
}
