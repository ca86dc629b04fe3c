// HTTP request handlers

use crate::reconcile::{ImportReport, Phase, Reconciler};
use crate::server::middleware::{ALLOW_HEADERS, ALLOW_METHODS};
use crate::server::models::{AppState, HealthResponse, ImportRequest};
use actix_web::{HttpResponse, web};
use log::{info, warn};

pub const EMPTY_ROWS: &str = "Request body must include a non-empty \"rows\" array";

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// CORS preflight for any path
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header(("Access-Control-Allow-Methods", ALLOW_METHODS))
        .insert_header(("Access-Control-Allow-Headers", ALLOW_HEADERS))
        .finish()
}

/// Run one bulk import. The body is parsed here rather than by an extractor
/// so malformed input gets the same report shape as every other response.
pub async fn import_inventory(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let request: ImportRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected import: invalid JSON body: {}", e);
            return HttpResponse::BadRequest()
                .json(ImportReport::rejected(Phase::Validate, format!("Invalid JSON body: {}", e)));
        }
    };

    let rows = match request.rows {
        Some(serde_json::Value::Array(rows)) if !rows.is_empty() => rows,
        _ => {
            warn!("Rejected import: no rows");
            return HttpResponse::BadRequest().json(ImportReport::rejected(Phase::Validate, EMPTY_ROWS));
        }
    };

    if let Err(e) = state.config.store.credentials() {
        return HttpResponse::InternalServerError().json(ImportReport::rejected(Phase::Config, e.to_string()));
    }
    let Some(store) = state.store.as_ref() else {
        return HttpResponse::InternalServerError()
            .json(ImportReport::rejected(Phase::Config, "store client is not configured"));
    };

    info!("Import request with {} rows", rows.len());
    let report = Reconciler::new(store.as_ref(), &state.config.pipeline, &state.config.tables)
        .run(&rows)
        .await;

    if report.is_failure() {
        HttpResponse::InternalServerError().json(report)
    } else {
        HttpResponse::Ok().json(report)
    }
}
