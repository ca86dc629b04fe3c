// API route configuration

use crate::server::handlers;
use actix_web::{guard, web};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Preflight for any path; registered first so it wins over POST routes
        .service(
            web::resource("/{tail:.*}")
                .guard(guard::Options())
                .to(handlers::preflight),
        )
        .route("/health", web::get().to(handlers::health_check))
        .route("/inventory/import", web::post().to(handlers::import_inventory))
        .route("/", web::post().to(handlers::import_inventory));
}
