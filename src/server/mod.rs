//! HTTP front end for the import pipeline (actix-web)

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use models::AppState;
pub use server::ApiServer;
