use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "inventory-sync.toml";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing store credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Explicit configuration handed to the server and pipeline at startup
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub pipeline: PipelineSettings,
    pub tables: TableNames,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: String,
    pub timeout_secs: u64,
    /// Non-default schema, sent as Accept-Profile / Content-Profile
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Keys per lookup request; bounded by URL length on the gateway
    pub lookup_chunk_size: usize,
    /// Rows per inventory insert request
    pub insert_chunk_size: usize,
    /// Maximum skipped rows echoed in a response
    pub skipped_rows_cap: usize,
    pub date_order: DateOrder,
    pub duplicate_accounting: DuplicateAccounting,
    /// Skip reasons longer than this are truncated
    pub reason_max_len: usize,
}

/// How `NN/NN/YYYY` dates are read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

/// How duplicate barcodes are attributed after an ignore-duplicates insert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAccounting {
    /// Store echoes inserted rows; every missing barcode is a per-row skip
    #[default]
    PerRow,
    /// Store only reports a count; duplicates are counted, not attributed
    CountOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableNames {
    pub brands: String,
    pub skus: String,
    pub batches: String,
    pub inventory: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            timeout_secs: 30,
            schema: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            lookup_chunk_size: 60,
            insert_chunk_size: 350,
            skipped_rows_cap: 200,
            date_order: DateOrder::default(),
            duplicate_accounting: DuplicateAccounting::default(),
            reason_max_len: 300,
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            brands: "brands".to_string(),
            skus: "skus".to_string(),
            batches: "batches".to_string(),
            inventory: "inventory".to_string(),
        }
    }
}

impl StoreConfig {
    /// Base URL and service key, or the first one that is missing
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingCredential("STORE_URL"));
        }
        if self.service_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("STORE_SERVICE_KEY"));
        }
        Ok((self.url.trim(), self.service_key.trim()))
    }
}

impl Config {
    /// Candidate config file locations, most specific first
    pub fn get_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("inventory-sync").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load defaults, then the toml file, then `.env` / environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::get_config_path(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => {
                info!("No config file found, using defaults and environment");
                Self::default()
            }
        };

        dotenvy::dotenv().ok();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup (injected for tests)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("STORE_URL") {
            self.store.url = v;
        }
        if let Some(v) = get("STORE_SERVICE_KEY") {
            self.store.service_key = v;
        }
        if let Some(v) = get("STORE_SCHEMA") {
            self.store.schema = Some(v);
        }
        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("SERVER_PORT") {
            self.server.port = v.trim().parse().with_context(|| format!("Invalid SERVER_PORT: {}", v))?;
        }
        if let Some(v) = get("LOOKUP_CHUNK_SIZE") {
            self.pipeline.lookup_chunk_size =
                v.trim().parse().with_context(|| format!("Invalid LOOKUP_CHUNK_SIZE: {}", v))?;
        }
        if let Some(v) = get("INSERT_CHUNK_SIZE") {
            self.pipeline.insert_chunk_size =
                v.trim().parse().with_context(|| format!("Invalid INSERT_CHUNK_SIZE: {}", v))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.lookup_chunk_size == 0 {
            return Err(ConfigError::Invalid("lookup_chunk_size must be at least 1".to_string()));
        }
        if self.pipeline.insert_chunk_size == 0 {
            return Err(ConfigError::Invalid("insert_chunk_size must be at least 1".to_string()));
        }
        if self.pipeline.reason_max_len == 0 {
            return Err(ConfigError::Invalid("reason_max_len must be at least 1".to_string()));
        }
        Ok(())
    }
}
