//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use utility_server::routes::build_app;
use utility_server::{Config, DbService, ServerState};

/// Fully wired app over a private in-memory database
pub async fn app() -> Router {
    let db = DbService::in_memory().await.unwrap();
    let state = ServerState::new(Config::default(), db);
    build_app().with_state(state)
}

/// Send one request, return status and JSON body (`Value::Null` when empty)
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn set_rate(app: &Router, key: &str, value: f64) {
    let (status, _) = send(
        app,
        Method::PATCH,
        "/api/settings",
        Some(json!({ "key": key, "value": value })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// Consumer plus one connection, returns the connection id
pub async fn seed_connection(app: &Router, email: &str, meter: &str) -> i64 {
    let (status, consumer) = send(
        app,
        Method::POST,
        "/api/consumers",
        Some(json!({ "name": "Maria Silva", "email": email, "phone": "+55 21 5555-0199" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{consumer}");

    let (status, connection) = send(
        app,
        Method::POST,
        "/api/connections",
        Some(json!({
            "consumer_id": consumer["id"],
            "meter_number": meter,
            "address": "Av. Atlântica 1702",
            "connection_date": "2024-06-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{connection}");
    connection["id"].as_i64().unwrap()
}
