use anyhow::Result;
use clap::Parser;
use inventory_sync::cli::{Cli, Commands};
use inventory_sync::commands::{ingest_command, serve_command};
use log::info;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting inventory-sync");

    match cli.command {
        Commands::Serve { config } => serve_command(config.as_deref()).await,
        Commands::Ingest { file, config } => ingest_command(&file, config.as_deref()).await,
    }
}
