//! Router-level test harness: an in-memory app and a cookie-carrying client.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::{app::build_app, state::AppState};

pub fn test_app(state: AppState) -> Router {
    build_app(state, MemoryStore::default())
}

pub fn register_body(email: &str, user_type: &str) -> Value {
    json!({
        "email": email,
        "password": "password123",
        "user_type": user_type,
        "contact_number": "+254700000000",
        "location": "Nakuru",
        "name": "Test User",
    })
}

/// One browser: remembers the session cookie between calls.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(app: &Router) -> Self {
        Self {
            app: app.clone(),
            cookie: None,
        }
    }

    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = self.app.clone().oneshot(req).await.unwrap();
        if let Some(set) = resp.headers().get(header::SET_COOKIE) {
            let set = set.to_str().unwrap();
            if set.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                self.cookie = set.split(';').next().map(str::to_string);
            }
        }

        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn post_empty(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, None).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Registers (and thereby logs in) a user, returning its id.
    pub async fn register(&mut self, email: &str, user_type: &str) -> String {
        let (status, body) = self
            .post("/api/auth/register", register_body(email, user_type))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
        body["user_id"].as_str().unwrap().to_string()
    }
}
