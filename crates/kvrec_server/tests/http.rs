//! End-to-end tests for the query endpoint.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use kvrec_core::{AdapterConfig, Config, Database, NotFoundPolicy, RequestAdapter};
use kvrec_server::{QueryServer, ServerConfig};
use kvrec_storage::InMemoryKv;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(adapter_config: AdapterConfig) -> Router {
    let db = Database::open(Arc::new(InMemoryKv::new()), &Config::default()).unwrap();
    let adapter = RequestAdapter::new(Arc::new(db), adapter_config);
    QueryServer::router(&ServerConfig::default(), adapter)
}

fn app() -> Router {
    app_with(AdapterConfig::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn query(app: &Router, operation: &str, args: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "operation": operation, "args": args }).to_string(),
        ))
        .unwrap();
    send(app, req).await
}

#[tokio::test]
async fn todo_lifecycle_over_http() {
    let app = app();

    let (status, body) = query(&app, "createTodo", json!({"title": "write"})).await;
    assert_eq!(status, StatusCode::OK);
    let todo = body["data"].clone();
    assert_eq!(todo["title"], "write");
    assert_eq!(todo["completed"], false);
    let id = todo["id"].as_str().unwrap().to_owned();

    let (status, body) = query(&app, "todos", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([todo]));

    let (_, body) = query(&app, "updateTodo", json!({"id": id, "completed": true})).await;
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["title"], "write");

    let (_, body) = query(&app, "todo", json!({"id": id})).await;
    assert_eq!(body["data"]["completed"], true);

    let (_, body) = query(&app, "deleteTodo", json!({"id": id})).await;
    assert_eq!(body["data"], true);

    let (_, body) = query(&app, "deleteTodo", json!({"id": id})).await;
    assert_eq!(body["data"], false);

    let (status, body) = query(&app, "todo", json!({"id": id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn users_use_input_argument() {
    let app = app();
    let (status, body) = query(
        &app,
        "createUser",
        json!({"input": {"name": "Ada", "email": "ada@example.com"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");

    let (_, body) = query(&app, "users", json!({})).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn validation_errors_are_bad_request() {
    let app = app();

    let (status, body) = query(&app, "createItem", json!({"text": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
    assert!(body["error"]["message"].as_str().unwrap().contains("text"));

    let (status, body) = query(&app, "dropEverything", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");

    let (status, _) = query(&app, "item", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn not_found_policy_maps_to_404() {
    let app = app_with(AdapterConfig {
        get_not_found: NotFoundPolicy::Error,
        update_not_found: NotFoundPolicy::Error,
    });

    let (status, body) = query(&app, "item", json!({"id": "missing"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");

    let (status, _) = query(&app, "updateItem", json!({"id": "missing", "text": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_stats() {
    let app = app();

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    query(&app, "createItem", json!({"text": "x"})).await;
    query(&app, "items", Value::Null).await;

    let req = Request::builder().uri("/stats").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["stats"]["writes"].as_u64().unwrap() >= 1);
    assert!(body["stats"]["reads"].as_u64().unwrap() >= 1);
    let collections = body["collections"].as_array().unwrap();
    assert_eq!(collections.len(), 3);
    assert!(collections.contains(&json!({"name": "users", "layout": "per_record"})));
}

#[tokio::test]
async fn serves_over_tcp_until_shutdown() {
    let config = ServerConfig::new("127.0.0.1:0".parse().unwrap());
    let adapter = RequestAdapter::new(Arc::new(Database::open_in_memory()), Default::default());
    let server = QueryServer::bind(config, adapter).await.unwrap();
    let addr = server.local_addr().unwrap();
    assert_ne!(addr.port(), 0);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(async move {
        let _ = rx.await;
    }));

    let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    drop(stream);

    tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
