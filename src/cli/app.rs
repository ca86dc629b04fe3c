use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inventory-sync")]
#[command(about = "Bulk inventory import against a REST store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP import endpoint
    Serve {
        /// Path to a config file (default: ./inventory-sync.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Import rows from a JSON file and print the report
    Ingest {
        /// JSON file: `{"rows": [...]}` or a bare array of rows
        #[arg(help = "Path to a JSON file of rows")]
        file: PathBuf,
        /// Path to a config file (default: ./inventory-sync.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
