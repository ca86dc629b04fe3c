use crate::config::Config;
use crate::server::{ApiServer, AppState};
use anyhow::Result;
use log::info;
use std::path::Path;

/// Load config and run the HTTP server until it stops
pub async fn serve_command(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    info!(
        "Pipeline: lookup chunks of {}, insert chunks of {}",
        config.pipeline.lookup_chunk_size, config.pipeline.insert_chunk_size
    );

    let server = ApiServer::from_config(&config.server);
    let state = AppState::from_config(config)?;
    server.run(state).await
}
