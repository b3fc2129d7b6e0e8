//! Shared helpers for HTTP tests against the in-memory store

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use storyshelf_server::{api, repository::MemoryStore, AppConfig, AppState};

pub fn app() -> Router {
    let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()))
        .expect("Failed to build application state");
    api::router(state)
}

/// Percent-encode every byte so emoji identifiers survive the request URI
pub fn encode_path(segment: &str) -> String {
    segment.bytes().map(|b| format!("%{:02X}", b)).collect()
}

/// One organization talking to one router
#[derive(Clone)]
pub struct Client {
    pub app: Router,
    pub org: Uuid,
}

impl Client {
    pub fn new(app: Router) -> Self {
        Self { app, org: Uuid::new_v4() }
    }

    /// Same router, different organization
    pub fn other_org(&self) -> Self {
        Self::new(self.app.clone())
    }

    pub async fn send(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/api/v1{}", path))
            .header("x-organization-id", self.org.to_string());

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("Failed to build request"))
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send("DELETE", path, None).await
    }

    /// Create a book with one copy, returning the copy id
    pub async fn seed_copy(&self, title: &str) -> String {
        let (status, book) = self
            .post("/books", serde_json::json!({ "title": title, "authors": ["Test Author"] }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{book}");

        let (status, copy) = self.post("/copies", serde_json::json!({ "book_id": book["id"] })).await;
        assert_eq!(status, StatusCode::CREATED, "{copy}");
        copy["id"].as_str().expect("copy id").to_string()
    }

    pub async fn register_child(&self) -> Value {
        let (status, child) = self.post("/children", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::CREATED, "{child}");
        child
    }
}

/// Field names listed in an error body
pub fn error_fields(body: &Value) -> Vec<String> {
    body["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["field"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
