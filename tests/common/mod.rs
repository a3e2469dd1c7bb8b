//! Shared helpers for the HTTP integration tests.
//!
//! Each test builds the full router over a fresh in-memory store and drives
//! it in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use hptu_portafolio::api::{self, AppState};
use hptu_portafolio::store::memory::InMemoryPortfolioStore;

pub fn create_test_app() -> Router {
    api::router(AppState::new(Arc::new(InMemoryPortfolioStore::new())))
}

/// Sends one request and returns status plus the raw JSON body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn parse<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

/// Creates an entry through the API, asserting it was accepted
pub async fn create_entry(app: &Router, body: Value) -> Value {
    let (status, created) = send(app, Method::POST, "/portafolio", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created
}
