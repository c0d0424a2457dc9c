//! HTTP tests for the entity routes, driven through the router with
//! in-memory backends.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use entity_sync::server::{create_app, entity_routes};
use entity_sync::{Dependencies, EntitySyncService};
use entity_sync_repository::{InMemoryRecordStore, InMemorySearchIndex};
use entity_sync_shared::Sample;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    create_app(
        &Dependencies::in_memory(),
        &["http://localhost:3000".to_string()],
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = send(&app(), Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "UP");
}

#[tokio::test]
async fn test_create_returns_created_with_location_and_alert() {
    let app = app();

    let response = send(
        &app,
        Method::POST,
        "/api/samples",
        Some(json!({ "name": "A", "batch": "B-01" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[header::LOCATION], "/api/samples/1");
    assert_eq!(
        response.headers()["x-entitysyncapp-alert"],
        "entitySyncApp.sample.created"
    );
    assert_eq!(response.headers()["x-entitysyncapp-params"], "1");

    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "A");
    assert_eq!(body["batch"], "B-01");
}

#[tokio::test]
async fn test_create_with_id_is_bad_request() {
    let app = app();

    let response = send(
        &app,
        Method::POST,
        "/api/samples",
        Some(json!({ "id": 4, "name": "A" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-entitysyncapp-error"], "error.idexists");

    let body = body_json(response).await;
    assert_eq!(body["entityName"], "sample");
    assert_eq!(body["errorKey"], "idexists");
    assert_eq!(body["status"], 400);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("A new sample cannot already have an ID"));

    let list = send(&app, Method::GET, "/api/samples", None).await;
    assert_eq!(body_json(list).await, json!([]));
}

#[tokio::test]
async fn test_update_existing_record() {
    let app = app();
    send(&app, Method::POST, "/api/samples", Some(json!({ "name": "A" }))).await;

    let response = send(
        &app,
        Method::PUT,
        "/api/samples",
        Some(json!({ "id": 1, "name": "B" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["x-entitysyncapp-alert"],
        "entitySyncApp.sample.updated"
    );
    assert_eq!(body_json(response).await["name"], "B");
}

#[tokio::test]
async fn test_update_without_id_creates() {
    let app = app();

    let response = send(
        &app,
        Method::PUT,
        "/api/payment-methods",
        Some(json!({ "name": "Card" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()["x-entitysyncapp-alert"],
        "entitySyncApp.paymentMethod.created"
    );
    assert_eq!(body_json(response).await["id"], 1);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = app();

    let response = send(
        &app,
        Method::PUT,
        "/api/samples",
        Some(json!({ "id": 9, "name": "B" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["errorKey"], "notfound");
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let response = send(&app(), Method::GET, "/api/samples/42", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["errorKey"], "notfound");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_invalid_path_id_is_rejected() {
    let response = send(&app(), Method::GET, "/api/samples/abc", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filter_without_parent() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/api/payment-methods",
        Some(json!({ "name": "Card" })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/api/payment-methods",
        Some(json!({ "name": "Cash", "salesOrderId": 7 })),
    )
    .await;

    let all = send(&app, Method::GET, "/api/payment-methods", None).await;
    assert_eq!(body_json(all).await.as_array().unwrap().len(), 2);

    let orphans = send(
        &app,
        Method::GET,
        "/api/payment-methods?filter=salesorder-is-null",
        None,
    )
    .await;
    let orphans = body_json(orphans).await;
    assert_eq!(orphans.as_array().unwrap().len(), 1);
    assert_eq!(orphans[0]["name"], "Card");

    let unknown = send(&app, Method::GET, "/api/payment-methods?filter=bogus", None).await;
    assert_eq!(body_json(unknown).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_update_search_delete_scenario() {
    let app = app();

    let created = send(&app, Method::POST, "/api/samples", Some(json!({ "name": "A" }))).await;
    assert_eq!(body_json(created).await["id"], 1);

    send(
        &app,
        Method::PUT,
        "/api/samples",
        Some(json!({ "id": 1, "name": "B" })),
    )
    .await;

    let fetched = body_json(send(&app, Method::GET, "/api/samples/1", None).await).await;
    assert_eq!(fetched["id"], 1);
    assert_eq!(fetched["name"], "B");

    let found = body_json(send(&app, Method::GET, "/api/_search/samples?query=B", None).await).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["id"], 1);
    assert_eq!(found[0]["name"], "B");

    let deleted = send(&app, Method::DELETE, "/api/samples/1", None).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        deleted.headers()["x-entitysyncapp-alert"],
        "entitySyncApp.sample.deleted"
    );
    assert_eq!(deleted.headers()["x-entitysyncapp-params"], "1");

    let missing = send(&app, Method::GET, "/api/samples/1", None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let found = body_json(send(&app, Method::GET, "/api/_search/samples?query=B", None).await).await;
    assert_eq!(found, json!([]));
}

#[tokio::test]
async fn test_index_failure_is_reported_but_record_is_kept() {
    let store = Arc::new(InMemoryRecordStore::<Sample>::new());
    let index = Arc::new(InMemorySearchIndex::<Sample>::new());
    index.set_available(false);
    let app = entity_routes(Arc::new(EntitySyncService::new(store.clone(), index)));

    let response = send(&app, Method::POST, "/api/samples", Some(json!({ "name": "A" }))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["errorKey"], "indexstale");
    assert_eq!(store.len().await, 1);

    let fetched = send(&app, Method::GET, "/api/samples/1", None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let store = Arc::new(InMemoryRecordStore::<Sample>::new());
    let index = Arc::new(InMemorySearchIndex::<Sample>::new());
    store.set_available(false);
    let app = entity_routes(Arc::new(EntitySyncService::new(store, index.clone())));

    let response = send(&app, Method::POST, "/api/samples", Some(json!({ "name": "A" }))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["errorKey"], "storefailure");
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/samples")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
