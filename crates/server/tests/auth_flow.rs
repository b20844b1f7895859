mod support;

use axum::body::to_bytes;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use support::{app, app_with, call, config, login_request, raw, request, token};

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let app = app().await;
    let (status, body) = call(&app, login_request("admin", "puffdaddy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);

    let token = body["access_token"].as_str().unwrap();
    let (status, me) = call(&app, request(Method::GET, "/me", Some(token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me, json!({"username": "admin", "role": "admin"}));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app().await;
    for (user, pass) in [("admin", "wrong"), ("nobody", "puffdaddy")] {
        let resp = raw(&app, login_request(user, pass)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["detail"], "incorrect username or password");
    }
}

#[tokio::test]
async fn test_missing_or_garbage_token_is_401() {
    let app = app().await;
    let resp = raw(&app, request(Method::GET, "/me", None, None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let (status, _) = call(&app, request(Method::GET, "/orders/1", Some("not.a.jwt"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = app().await;
    let admin = token(&app, "admin", "puffdaddy").await;
    let widget = json!({"name": "Widget", "price": 9.5, "description": "A widget"});

    let (status, body) = call(&app, request(Method::POST, "/products", Some(&admin), Some(widget.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"product_id": 1}));

    // reads are open
    let (status, body) = call(&app, request(Method::GET, "/products/1", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, widget);

    let cheaper = json!({"name": "Widget", "price": 7.0, "description": "A widget"});
    for _ in 0..2 {
        let (status, body) = call(&app, request(Method::PUT, "/products/1", Some(&admin), Some(cheaper.clone()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Product updated"}));
    }
    let (_, body) = call(&app, request(Method::GET, "/products/1", None, None)).await;
    assert_eq!(body, cheaper);

    let (status, _) = call(&app, request(Method::DELETE, "/products/1", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&app, request(Method::GET, "/products/1", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn test_customer_role_is_forbidden_from_admin_routes() {
    let app = app().await;
    let customer = token(&app, "customer", "Lakers").await;
    let widget = json!({"name": "Widget", "price": 9.5, "description": "A widget"});

    let (status, _) = call(&app, request(Method::POST, "/products", Some(&customer), Some(widget.clone()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, request(Method::POST, "/products", None, Some(widget.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // role is checked before existence on admin-only routes
    let (status, _) = call(&app, request(Method::PUT, "/products/999", Some(&customer), Some(widget.clone()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let admin = token(&app, "admin", "puffdaddy").await;
    let (status, _) = call(&app, request(Method::PUT, "/products/999", Some(&admin), Some(widget))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, request(Method::DELETE, "/orders/999", Some(&customer), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_fields_are_400() {
    let app = app().await;
    let admin = token(&app, "admin", "puffdaddy").await;
    let cases = [
        ("/products", json!({"name": "Widget", "price": -1.0, "description": "x"})),
        ("/products", json!({"name": "Widget"})),
        ("/customers", json!({"name": "Lamar", "email": "not-an-email"})),
    ];
    for (uri, body) in cases {
        let (status, resp) = call(&app, request(Method::POST, uri, Some(&admin), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {resp}");
        assert_eq!(resp["error"], "Bad Request");
    }
}

#[tokio::test]
async fn test_non_numeric_id_is_json_400() {
    let app = app().await;
    let admin = token(&app, "admin", "puffdaddy").await;
    let cases = [
        (Method::GET, "/products/abc", None),
        (Method::GET, "/customers/-1", Some(admin.as_str())),
        (Method::DELETE, "/orders/99999999999999999999", Some(admin.as_str())),
    ];
    for (method, uri, token) in cases {
        let resp = raw(&app, request(method, uri, token, None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/json", "{uri}");
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Bad Request");
        assert!(body["detail"].as_str().unwrap().contains("Cannot parse"), "{uri}: {body}");
    }
}

#[tokio::test]
async fn test_customer_may_edit_only_own_record() {
    let app = app().await;
    let admin = token(&app, "admin", "puffdaddy").await;
    let customer = token(&app, "customer", "Lakers").await;

    let own = json!({"name": "Lamar Odom", "email": "lamar@lakers.com", "username": "customer"});
    let other = json!({"name": "Kobe Bryant", "email": "kobe@lakers.com", "username": "kobe"});
    let (_, body) = call(&app, request(Method::POST, "/customers", Some(&admin), Some(own))).await;
    assert_eq!(body, json!({"customer_id": 1}));
    let (_, body) = call(&app, request(Method::POST, "/customers", Some(&admin), Some(other.clone()))).await;
    assert_eq!(body, json!({"customer_id": 2}));

    let renamed = json!({"name": "Lamar J. Odom", "email": "lamar@lakers.com", "username": "customer"});
    let (status, body) = call(&app, request(Method::PUT, "/customers/1", Some(&customer), Some(renamed.clone()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "Customer updated"}));
    let (_, body) = call(&app, request(Method::GET, "/customers/1", Some(&customer), None)).await;
    assert_eq!(body, renamed);

    let (status, _) = call(&app, request(Method::PUT, "/customers/2", Some(&customer), Some(other))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    // ownership needs the record, so a missing id is 404 even for customers
    let (status, _) = call(&app, request(Method::PUT, "/customers/999", Some(&customer), Some(renamed))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, request(Method::GET, "/customers/1", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_without_username_keeps_owner() {
    let app = app().await;
    let admin = token(&app, "admin", "puffdaddy").await;
    let customer = token(&app, "customer", "Lakers").await;
    let own = json!({"name": "Lamar Odom", "email": "lamar@lakers.com", "username": "customer"});
    call(&app, request(Method::POST, "/customers", Some(&admin), Some(own))).await;

    let by_owner = json!({"name": "Lamar", "email": "lamar@knicks.com"});
    let (status, _) = call(&app, request(Method::PUT, "/customers/1", Some(&customer), Some(by_owner))).await;
    assert_eq!(status, StatusCode::OK);
    let by_admin = json!({"name": "Lamar", "email": "lamar@clippers.com"});
    let (status, _) = call(&app, request(Method::PUT, "/customers/1", Some(&admin), Some(by_admin))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, request(Method::GET, "/customers/1", Some(&customer), None)).await;
    assert_eq!(body, json!({"name": "Lamar", "email": "lamar@clippers.com", "username": "customer"}));
    let again = json!({"name": "Lamar Odom", "email": "lamar@clippers.com"});
    let (status, _) = call(&app, request(Method::PUT, "/customers/1", Some(&customer), Some(again))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_registers_accounts() {
    let app = app().await;
    let admin = token(&app, "admin", "puffdaddy").await;
    let customer = token(&app, "customer", "Lakers").await;
    let lamar = json!({"username": "lamar", "password": "Lakers123", "role": "customer"});

    let (status, body) = call(&app, request(Method::POST, "/users", Some(&admin), Some(lamar.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"username": "lamar", "role": "customer"}));

    let (status, _) = call(&app, request(Method::POST, "/users", Some(&admin), Some(lamar.clone()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(&app, request(Method::POST, "/users", Some(&customer), Some(lamar))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let short = json!({"username": "kobe", "password": "short", "role": "customer"});
    let (status, _) = call(&app, request(Method::POST, "/users", Some(&admin), Some(short))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fresh = token(&app, "lamar", "Lakers123").await;
    let (_, me) = call(&app, request(Method::GET, "/me", Some(&fresh), None)).await;
    assert_eq!(me, json!({"username": "lamar", "role": "customer"}));
}

#[tokio::test]
async fn test_token_endpoint_is_rate_limited() {
    let mut cfg = config();
    // no refill, so the third login is limited however slow the run is
    cfg.rate_limit.burst_size = 2;
    cfg.rate_limit.requests_per_second = 0;
    let app = app_with(cfg).await;

    assert_eq!(call(&app, login_request("admin", "puffdaddy")).await.0, StatusCode::OK);
    assert_eq!(call(&app, login_request("admin", "wrong")).await.0, StatusCode::UNAUTHORIZED);
    let (status, body) = call(&app, login_request("admin", "puffdaddy")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too Many Requests");

    // other routes are not limited
    assert_eq!(call(&app, request(Method::GET, "/health", None, None)).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_ops_endpoints() {
    let app = app().await;
    let (status, body) = call(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, doc) = call(&app, request(Method::GET, "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/orders"].is_object());

    let _ = call(&app, login_request("admin", "wrong")).await;
    let resp = raw(&app, request(Method::GET, "/metrics", None, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("microshop_login_attempts_total"));
}
