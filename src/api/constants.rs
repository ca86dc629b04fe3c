//! API constants for the PostgREST-style store endpoint

/// Base REST path exposed by the store gateway
pub const REST_BASE_PATH: &str = "/rest/v1";

/// Standard headers for store requests
pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Gateway API key header
    pub const API_KEY: &str = "apikey";

    /// Schema selection for reads
    pub const ACCEPT_PROFILE: &str = "Accept-Profile";

    /// Schema selection for writes
    pub const CONTENT_PROFILE: &str = "Content-Profile";

    /// Prefer header name
    pub const PREFER: &str = "Prefer";

    /// Response header carrying `first-last/total`
    pub const CONTENT_RANGE: &str = "Content-Range";

    /// Correlation header attached to every outbound request
    pub const X_CORRELATION_ID: &str = "X-Correlation-Id";

    /// Prefer values
    pub const PREFER_RETURN_REPRESENTATION: &str = "return=representation";
    pub const PREFER_RETURN_MINIMAL: &str = "return=minimal";
    pub const PREFER_MERGE_DUPLICATES: &str = "resolution=merge-duplicates";
    pub const PREFER_IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates";
    pub const PREFER_COUNT_EXACT: &str = "count=exact";
}

/// PostgreSQL SQLSTATE for unique_violation, surfaced in store error bodies
pub const UNIQUE_VIOLATION: &str = "23505";

/// Build full table endpoint URL
pub fn table_endpoint(base_url: &str, table: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), REST_BASE_PATH, table)
}
