// Logging and CORS for every response

use actix_web::middleware::{DefaultHeaders, Logger};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub fn setup_logger() -> Logger {
    Logger::default()
}

/// Permissive allow-origin on every response. Preflights are answered by
/// `handlers::preflight`.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add(("Access-Control-Allow-Origin", ALLOW_ORIGIN))
}
