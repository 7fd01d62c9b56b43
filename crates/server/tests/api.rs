//! API tests against an in-process router: no sockets, no spawned
//! binary, each test builds the full service wiring over an in-memory
//! store and journal.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tierflow_core::config::load_config_from_str;
use tierflow_core::extractor::MetadataExtractor;
use tierflow_core::journal::{create_journal_system, JournalStore, SqliteJournal};
use tierflow_core::router::Router;
use tierflow_core::service::IngestService;
use tierflow_core::store::{MemoryObjectStore, ObjectStore};
use tierflow_core::unit::UnitCatalog;

use tierflow_server::api::create_router;
use tierflow_server::state::AppState;

const CONFIG: &str = r#"
[tiers]
stage = "corp-stage-data"
curated = "corp-curated-data"
application = "corp-application-data"

[units.warehouse]
account_url = "https://example.invalid"
auth_token = "super-secret-token"
pipes = { "claims/" = "claims_pipe" }
"#;

struct TestApp {
    app: axum::Router,
    store: Arc<MemoryObjectStore>,
}

fn test_app() -> TestApp {
    let config = load_config_from_str(CONFIG).unwrap();

    let store = Arc::new(MemoryObjectStore::new());
    let journal_store: Arc<dyn JournalStore> = Arc::new(SqliteJournal::in_memory().unwrap());
    let (journal, writer) = create_journal_system(journal_store.clone(), 64);
    tokio::spawn(writer.run());

    let catalog = Arc::new(
        UnitCatalog::from_config(&config, store.clone() as Arc<dyn ObjectStore>).unwrap(),
    );
    let router =
        Arc::new(Router::new(catalog, config.router.clone()).with_journal(journal.clone()));
    let extractor = Arc::new(MetadataExtractor::new(
        store.clone() as Arc<dyn ObjectStore>,
        config.tiers.clone(),
    ));
    let service = Arc::new(IngestService::new(extractor, router, journal));

    let state = Arc::new(AppState::new(config, service, journal_store));
    TestApp {
        app: create_router(state),
        store,
    }
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn wait_for_finish(app: &axum::Router, run_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, body) = get(app, &format!("/api/v1/runs/{}", run_id)).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] == "finished" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run {} did not finish", run_id);
}

#[tokio::test]
async fn health_reports_ok() {
    let t = test_app();
    let (status, body) = get(&t.app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn config_endpoint_redacts_the_warehouse_token() {
    let t = test_app();
    let (status, body) = get(&t.app, "/api/v1/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tiers"]["stage"], "corp-stage-data");

    let warehouse = &body["units"]["warehouse"];
    assert_eq!(warehouse["auth_token_configured"], true);
    assert!(!body.to_string().contains("super-secret-token"));
}

#[tokio::test]
async fn notification_opens_a_run_that_finishes() {
    let t = test_app();
    t.store
        .put(
            "corp-stage-data",
            "claims/type=structured/2024/f.csv",
            b"id\n1\n".to_vec(),
            "text/csv",
        )
        .await
        .unwrap();

    let (status, body) = post_json(
        &t.app,
        "/api/v1/notifications",
        serde_json::json!({
            "container": "corp-stage-data",
            "objectKeyEncoded": "claims/type%3Dstructured/2024/f.csv",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let run_id = body["runId"].as_str().unwrap().to_string();

    let summary = wait_for_finish(&t.app, &run_id).await;
    assert_eq!(summary["outcome"]["status"], "succeeded");

    let (status, runs) = get(&t.app, "/api/v1/runs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(runs.as_array().unwrap().len(), 1);

    let (status, overview) = get(&t.app, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["total_runs"], 1);
    assert_eq!(overview["active_runs"], 0);
}

#[tokio::test]
async fn notification_for_unknown_container_is_rejected() {
    let t = test_app();
    let (status, body) = post_json(
        &t.app,
        "/api/v1/notifications",
        serde_json::json!({
            "container": "some-other-bucket",
            "objectKeyEncoded": "claims/type%3Dstructured/f.csv",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("does not match any tier"));
}

#[tokio::test]
async fn notification_for_missing_object_is_not_found() {
    let t = test_app();
    let (status, _) = post_json(
        &t.app,
        "/api/v1/notifications",
        serde_json::json!({
            "container": "corp-stage-data",
            "objectKeyEncoded": "claims/type%3Dstructured/missing.csv",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_run_is_not_found() {
    let t = test_app();
    let (status, body) = get(&t.app, "/api/v1/runs/no-such-run").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn journal_returns_the_run_lifecycle() {
    let t = test_app();
    t.store
        .put(
            "corp-stage-data",
            "claims/type=structured/f.csv",
            b"id\n".to_vec(),
            "text/csv",
        )
        .await
        .unwrap();

    let (_, body) = post_json(
        &t.app,
        "/api/v1/notifications",
        serde_json::json!({
            "container": "corp-stage-data",
            "objectKeyEncoded": "claims/type%3Dstructured/f.csv",
        }),
    )
    .await;
    let run_id = body["runId"].as_str().unwrap().to_string();
    wait_for_finish(&t.app, &run_id).await;

    // The journal writer runs on its own task; give it a beat to drain.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (status, records) = get(&t.app, &format!("/api/v1/journal?run_id={}", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec!["run_started", "decision_made", "unit_invoked", "run_completed"]
    );
}

#[tokio::test]
async fn metrics_exposition_includes_run_counters() {
    let t = test_app();
    tierflow_core::metrics::RUNS_STARTED.inc();
    // A first request seeds the HTTP counters before the exposition.
    let _ = get(&t.app, "/api/v1/health").await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("tierflow_runs_started_total"));
    assert!(text.contains("tierflow_http_requests_total"));
}

#[tokio::test]
async fn cancel_finished_run_conflicts() {
    let t = test_app();
    t.store
        .put(
            "corp-stage-data",
            "claims/type=structured/f.csv",
            b"id\n".to_vec(),
            "text/csv",
        )
        .await
        .unwrap();

    let (_, body) = post_json(
        &t.app,
        "/api/v1/notifications",
        serde_json::json!({
            "container": "corp-stage-data",
            "objectKeyEncoded": "claims/type%3Dstructured/f.csv",
        }),
    )
    .await;
    let run_id = body["runId"].as_str().unwrap().to_string();
    wait_for_finish(&t.app, &run_id).await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/runs/{}", run_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
