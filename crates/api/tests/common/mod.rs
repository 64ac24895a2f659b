//! Common test utilities for integration tests.
//!
//! Tests run the full router against an in-memory document store, so no
//! database is needed.

// Helpers are shared across test binaries; not every binary uses all of them.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use campus_admin_api::{
    app::create_app,
    config::{
        Config, DatabaseConfig, I18nConfig, LoggingConfig, SecurityConfig, ServerConfig,
        StorageBackend, StorageConfig,
    },
};
use fake::{faker::name::en::Name, Fake};
use persistence::store::MemoryDocumentStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ACTOR: &str = "admin-1";

/// Test configuration backed by the memory store.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
        },
        i18n: I18nConfig {
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "te".to_string(), "hi".to_string()],
        },
    }
}

/// Application router plus a handle on its store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDocumentStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let router = create_app(config, store.clone());
        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> (axum::http::StatusCode, axum::http::HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        (status, headers, parse_response_body(response).await)
    }

    pub async fn get(&self, uri: &str) -> (axum::http::StatusCode, axum::http::HeaderMap, Value) {
        self.send(get_request(uri)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (axum::http::StatusCode, axum::http::HeaderMap, Value) {
        self.send(json_request(Method::POST, uri, body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (axum::http::StatusCode, axum::http::HeaderMap, Value) {
        self.send(json_request(Method::PATCH, uri, body)).await
    }

    pub async fn delete(&self, uri: &str) -> (axum::http::StatusCode, axum::http::HeaderMap, Value) {
        self.send(delete_request(uri)).await
    }

    /// Create a course and return its id.
    pub async fn create_course(&self, code: &str) -> String {
        let (status, _, body) = self.post("/api/v1/courses", course_payload(code)).await;
        assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a topic in a course and return its id.
    pub async fn create_topic(&self, course_id: &str, position: u32) -> String {
        let (status, _, body) = self
            .post(
                "/api/v1/topics",
                json!({
                    "courseId": course_id,
                    "title": {"en": format!("Topic {position}")},
                    "position": position
                }),
            )
            .await;
        assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn course_payload(code: &str) -> Value {
    json!({
        "title": {"en": "Linear Algebra", "te": "రేఖీయ బీజగణితం"},
        "code": code,
        "description": {"en": "Vectors and matrices"},
        "level": "intermediate"
    })
}

pub fn program_payload(code: &str) -> Value {
    let name: String = Name().fake();
    json!({
        "name": {"en": format!("Program of {name}")},
        "code": code,
        "durationYears": 3
    })
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Actor-Id", ACTOR)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("X-Actor-Id", ACTOR)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
