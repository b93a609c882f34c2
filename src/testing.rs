//! Helpers for driving the full router in tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::bookmarks::{BookmarkRepository, InMemoryBookmarks};
use crate::config::{Cors, Environment};
use crate::handler::{AppState, Settings};
use crate::server::build_router;

pub const API_KEY: &str = "test-api-key";

pub fn router(repo: Arc<dyn BookmarkRepository>, environment: Environment) -> Router {
    let settings = Settings {
        api_key: API_KEY.to_string(),
        environment,
    };
    build_router(AppState::new(repo, settings), &Cors::default())
}

pub fn request(method: Method, uri: &str, body: Option<Value>, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    match builder.body(body) {
        Ok(r) => r,
        Err(e) => panic!("failed to build request: {e}"),
    }
}

pub struct TestApp {
    pub repo: Arc<InMemoryBookmarks>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryBookmarks::new());
        let router = router(repo.clone(), Environment::Development);
        TestApp { repo, router }
    }

    pub fn service(&self) -> Router {
        self.router.clone()
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>, key: Option<&str>) -> Response {
        match self.router.clone().oneshot(request(method, uri, body, key)).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        }
    }

    pub async fn send_raw(&self, method: Method, uri: &str, raw: &'static str) -> Response {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Authorized request, decoded JSON response.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let resp = self.send(method, uri, body, Some(API_KEY)).await;
        let status = resp.status();
        (status, Self::body(resp).await)
    }

    pub async fn body(resp: Response) -> Value {
        let bytes = match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        if bytes.is_empty() {
            return Value::Null;
        }
        match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }
}
