#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use configs::AppConfig;
use serde_json::Value;
use tower::ServiceExt;

/// Cheap argon2 cost so the debug-build tests stay fast; lookups point at a closed port.
pub const TEST_CONFIG: &str = r#"
[auth]
jwt_secret = "test-secret"
hash_memory_kib = 1024
hash_iterations = 1

[[auth.users]]
username = "admin"
role = "admin"
password = "puffdaddy"

[[auth.users]]
username = "customer"
role = "customer"
password = "Lakers"

[lookup]
customer_base_url = "http://127.0.0.1:1"
product_base_url = "http://127.0.0.1:1"
timeout_ms = 500
max_attempts = 1
"#;

pub fn config() -> AppConfig {
    configs::load_from_str(TEST_CONFIG).expect("test config")
}

pub async fn app_with(cfg: AppConfig) -> Router {
    let state = server::startup::build_state(&cfg).await.expect("state");
    server::startup::app(state)
}

pub async fn app() -> Router {
    app_with(config()).await
}

pub async fn raw(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("router is infallible")
}

/// Send a request and decode the body as JSON (`Null` when empty or not JSON).
pub async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = raw(app, req).await;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .expect("request")
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub async fn token(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = call(app, login_request(username, password)).await;
    assert_eq!(status, StatusCode::OK, "login {username}: {body}");
    body["access_token"].as_str().expect("access_token").to_string()
}
