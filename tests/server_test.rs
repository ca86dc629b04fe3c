//! HTTP endpoint behaviour

mod common;

use actix_web::{App, http::StatusCode, test, web};
use common::{MemoryStore, raw_row, test_config};
use inventory_sync::config::Config;
use inventory_sync::server::{AppState, middleware, routes};
use serde_json::{Value, json};
use std::sync::Arc;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(middleware::cors_headers())
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let brand = store.seed_brand("Acme");
    store.seed_sku(brand, "S1");
    store
}

#[actix_web::test]
async fn test_preflight_returns_no_content() {
    let app = app!(AppState::new(test_config(), seeded_store()));

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/inventory/import")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let header = |name: &str| resp.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    assert_eq!(header("access-control-allow-origin").as_deref(), Some("*"));
    assert_eq!(header("access-control-allow-methods").as_deref(), Some("POST, OPTIONS"));
    assert_eq!(
        header("access-control-allow-headers").as_deref(),
        Some("authorization, x-client-info, apikey, content-type")
    );
}

#[actix_web::test]
async fn test_import_success() {
    let store = seeded_store();
    let app = app!(AppState::new(test_config(), store.clone()));

    let req = test::TestRequest::post()
        .uri("/inventory/import")
        .set_json(json!({ "rows": [raw_row("S1", "Acme", "B1", "BC-1", "2024-01-05")] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["added"], 1);
    assert_eq!(body["addedCount"], 1);
    assert_eq!(body["skipped"], 0);
    assert_eq!(body["duplicates_skipped"], 0);
    assert_eq!(body["skippedRows"], json!([]));
    assert!(body.get("phase").is_none());
    assert_eq!(store.rows("inventory").len(), 1);
}

#[actix_web::test]
async fn test_root_path_accepts_imports() {
    let app = app!(AppState::new(test_config(), seeded_store()));

    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({ "rows": [raw_row("S1", "Acme", "B1", "BC-1", "2024-01-05")] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_malformed_bodies_are_rejected() {
    let app = app!(AppState::new(test_config(), seeded_store()));

    for body in [r#"{"rows": [ "#, r#"{"rows": []}"#, r#"{"data": [{}]}"#, r#"{"rows": {"sku": "S1"}}"#] {
        let req = test::TestRequest::post()
            .uri("/inventory/import")
            .insert_header(("content-type", "application/json"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let report: Value = test::read_body_json(resp).await;
        assert_eq!(report["phase"], "validate");
        assert_eq!(report["added"], 0);
        assert_eq!(report["skipped"], 0);
        assert!(report["error"].is_string());
    }
}

#[actix_web::test]
async fn test_missing_credentials() {
    let app = app!(AppState::new(Config::default(), seeded_store()));

    let req = test::TestRequest::post()
        .uri("/inventory/import")
        .set_json(json!({ "rows": [raw_row("S1", "Acme", "B1", "BC-1", "2024-01-05")] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["phase"], "config");
    assert!(body["error"].as_str().unwrap_or_default().contains("STORE_URL"));
}

#[actix_web::test]
async fn test_unconfigured_store_from_config() {
    let state = AppState::from_config(Config::default()).unwrap();
    assert!(state.store.is_none());
}

#[actix_web::test]
async fn test_phase_failure_keeps_counters() {
    let store = seeded_store();
    store.fail_selects_on("brands");
    let app = app!(AppState::new(test_config(), store));

    let req = test::TestRequest::post()
        .uri("/inventory/import")
        .set_json(json!({ "rows": [
            raw_row("S1", "Acme", "B1", "BC-1", "2024-01-05"),
            { "sku": "S1" }
        ] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["phase"], "resolve_brands");
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["added"], 0);
}

#[actix_web::test]
async fn test_health() {
    let app = app!(AppState::new(test_config(), seeded_store()));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "ok" }));
}
