// API server implementation using actix-web

use crate::config::ServerConfig;
use crate::server::models::AppState;
use crate::server::{middleware, routes};
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use log::info;

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl ApiServer {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Start the HTTP server
    pub async fn run(self, state: AppState) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);
        info!("Starting inventory-sync API server on {}", bind_addr);

        let state = web::Data::new(state);
        let max_body_bytes = self.max_body_bytes;

        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .app_data(web::PayloadConfig::new(max_body_bytes))
                .wrap(middleware::cors_headers())
                .wrap(middleware::setup_logger())
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
