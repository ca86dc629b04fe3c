// Request/response models and shared handler state

use crate::api::{Store, StoreClient};
use crate::config::Config;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Shared by every worker; the store is absent when credentials are missing
pub struct AppState {
    pub config: Config,
    pub store: Option<Arc<dyn Store>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            store: Some(store),
        }
    }

    /// Build the REST store from config. Missing credentials are not fatal
    /// here; imports answer with a config error until they are provided.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let store: Option<Arc<dyn Store>> = match config.store.credentials() {
            Ok(_) => {
                let client: Arc<dyn Store> = Arc::new(StoreClient::new(&config.store)?);
                Some(client)
            }
            Err(err) => {
                warn!("Store not configured ({}); imports will fail", err);
                None
            }
        };
        Ok(Self { config, store })
    }
}

/// Import request body. `rows` stays untyped until the handler checks it.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub rows: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
