use super::constants::{self, headers};
use super::operations::{Write, WriteResult};
use super::query::result::parse_content_range_len;
use super::query::{Query, QueryResult};
use super::store::Store;
use crate::config::StoreConfig;
use anyhow::Context;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

/// REST client for the PostgREST-style store gateway, with connection pooling
#[derive(Clone)]
pub struct StoreClient {
    base_url: String,
    service_key: String,
    schema: Option<String>,
    http_client: reqwest::Client,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let (base_url, service_key) = config.credentials()?;

        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)                      // Max idle connections per host
            .pool_idle_timeout(Duration::from_secs(90))      // Keep connections alive for 90s
            .timeout(Duration::from_secs(config.timeout_secs)) // Request timeout
            .connect_timeout(Duration::from_secs(10))        // Connection timeout
            .user_agent(concat!("inventory-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(config, base_url, service_key, http_client))
    }

    /// Create a new client with custom HTTP client configuration
    pub fn with_custom_client(
        config: &StoreConfig,
        base_url: &str,
        service_key: &str,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            schema: config.schema.clone(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: reqwest::RequestBuilder, correlation_id: &str) -> reqwest::RequestBuilder {
        request
            .header(headers::API_KEY, &self.service_key)
            .bearer_auth(&self.service_key)
            .header(headers::X_CORRELATION_ID, correlation_id)
    }

    /// Parse HTTP response into QueryResult
    async fn parse_query_response(&self, response: reqwest::Response) -> anyhow::Result<QueryResult> {
        let status_code = response.status().as_u16();

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Ok(QueryResult::error(error_text, Some(status_code)));
        }

        let text = response.text().await.context("Failed to read store response body")?;
        match parse_rows(&text) {
            Ok(rows) => Ok(QueryResult::success(rows, status_code)),
            Err(e) => Ok(QueryResult::error(format!("Invalid JSON response: {}", e), Some(status_code))),
        }
    }

    /// Parse HTTP response into WriteResult
    async fn parse_write_response(&self, response: reqwest::Response) -> anyhow::Result<WriteResult> {
        let status_code = response.status().as_u16();
        let affected = content_range(&response).as_deref().and_then(parse_content_range_len);

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Ok(WriteResult::error(error_text, Some(status_code)));
        }

        let text = response.text().await.context("Failed to read store response body")?;
        Ok(write_result_from_body(status_code, &text, affected))
    }
}

#[async_trait]
impl Store for StoreClient {
    /// Execute a filtered read
    async fn select(&self, query: &Query) -> anyhow::Result<QueryResult> {
        let url = constants::table_endpoint(&self.base_url, &query.table);
        let params = query.to_query_params();
        let correlation_id = uuid::Uuid::new_v4().to_string();

        let mut request = self
            .authorized(self.http_client.get(&url), &correlation_id)
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .query(&params);
        if let Some(schema) = &self.schema {
            request = request.header(headers::ACCEPT_PROFILE, schema);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .with_context(|| format!("GET {} failed", query.table))?;
        debug!(
            "GET {} [{}] -> {} in {}ms",
            query.to_url(&self.base_url),
            correlation_id,
            response.status().as_u16(),
            started.elapsed().as_millis()
        );

        self.parse_query_response(response).await
    }

    /// Execute a bulk insert/upsert
    async fn write(&self, write: &Write) -> anyhow::Result<WriteResult> {
        let url = constants::table_endpoint(&self.base_url, &write.table);
        let params = write.to_query_params();
        let correlation_id = uuid::Uuid::new_v4().to_string();

        let mut request = self
            .authorized(self.http_client.post(&url), &correlation_id)
            .header("Content-Type", headers::CONTENT_TYPE_JSON)
            .header(headers::PREFER, write.prefer_header())
            .query(&params)
            .json(&write.rows);
        if let Some(schema) = &self.schema {
            request = request.header(headers::CONTENT_PROFILE, schema);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .with_context(|| format!("POST {} failed", write.table))?;
        debug!(
            "POST {} ({} rows) [{}] -> {} in {}ms",
            write.table,
            write.len(),
            correlation_id,
            response.status().as_u16(),
            started.elapsed().as_millis()
        );

        self.parse_write_response(response).await
    }
}

fn content_range(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(headers::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// A 2xx write with an empty body echoed nothing. A body that is not JSON
/// cannot be trusted for per-row accounting, so the chunk is treated as failed.
fn write_result_from_body(status_code: u16, text: &str, affected: Option<u64>) -> WriteResult {
    if text.trim().is_empty() {
        return WriteResult::success(status_code, Vec::new(), affected);
    }
    match parse_rows(text) {
        Ok(rows) => WriteResult::success(status_code, rows, affected),
        Err(e) => {
            warn!("Store accepted write but echoed unparseable body: {}", e);
            WriteResult::error(format!("Invalid JSON response: {}", e), Some(status_code))
        }
    }
}

/// The store answers with a JSON array; a lone object is treated as one row
fn parse_rows(text: &str) -> anyhow::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rows_shapes() {
        assert_eq!(parse_rows(r#"[{"id":1},{"id":2}]"#).unwrap().len(), 2);
        assert_eq!(parse_rows(r#"{"id":1}"#).unwrap(), vec![json!({"id": 1})]);
        assert!(parse_rows("null").unwrap().is_empty());
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn test_unparseable_write_echo_is_an_error() {
        let result = write_result_from_body(201, "<html>gateway</html>", None);
        assert!(!result.is_success());
        assert_eq!(result.status_code, Some(201));
        assert!(result.error.as_deref().unwrap_or_default().starts_with("Invalid JSON response"));

        let result = write_result_from_body(201, "  ", Some(3));
        assert!(result.is_success());
        assert_eq!(result.affected, Some(3));

        let result = write_result_from_body(201, r#"[{"barcode":"BC1"}]"#, None);
        assert_eq!(result.echoed_strings("barcode"), vec!["BC1".to_string()]);
    }

    #[test]
    fn test_client_requires_credentials() {
        let config = StoreConfig::default();
        assert!(StoreClient::new(&config).is_err());

        let config = StoreConfig {
            url: "https://db.example.com/".to_string(),
            service_key: "secret".to_string(),
            ..StoreConfig::default()
        };
        let client = StoreClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://db.example.com");
    }
}
