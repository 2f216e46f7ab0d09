mod support;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use support::{error_messages, send_request, TestApp};

#[tokio::test]
async fn health_check_is_ok() {
    let app = TestApp::new();
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_then_fetch_current_user() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({
                "user": {
                    "username": "jake",
                    "email": "jake@jake.jake",
                    "password": "jakejake"
                }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "jake");
    assert_eq!(body["user"]["email"], "jake@jake.jake");
    assert_eq!(body["user"]["bio"], Value::Null);
    assert!(body["user"].get("password").is_none());
    let token = body["user"]["token"].as_str().unwrap();
    assert!(!token.is_empty());

    let (status, current) = app.get("/api/user", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["user"]["username"], "jake");
    assert!(!current["user"]["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_new_row() {
    let app = TestApp::new();
    app.register("jake").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({
                "user": {
                    "username": "someone-else",
                    "email": "JAKE@conduit.test",
                    "password": "password123"
                }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_messages(&body), ["email has already been taken"]);
    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn invalid_registration_lists_every_problem() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({
                "user": { "username": "", "email": "not-an-email", "password": "short" }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_messages(&body).len(), 3);
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"user\":"))
        .unwrap();
    let (status, body) = send_request(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_messages(&body).len(), 1);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("jake").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "user": { "email": "jake@conduit.test", "password": "password123" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "jake");

    let (wrong_status, wrong_password) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "user": { "email": "jake@conduit.test", "password": "wrong-password" } })),
        )
        .await;
    let (unknown_status, unknown_email) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "user": { "email": "nobody@conduit.test", "password": "password123" } })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn protected_routes_require_token_scheme() {
    let app = TestApp::new();
    let token = app.register("jake").await;

    let (status, body) = app.get("/api/user", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_messages(&body).len(), 1);

    let bearer = Request::builder()
        .uri("/api/user")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_request(&app.router, bearer).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/user", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_user_changes_only_given_fields() {
    let app = TestApp::new();
    let token = app.register("jake").await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/user",
            Some(&token),
            Some(json!({ "user": { "bio": "I work at statefarm", "password": "new-password" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["bio"], "I work at statefarm");
    assert_eq!(body["user"]["username"], "jake");
    assert_eq!(body["user"]["email"], "jake@conduit.test");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "user": { "email": "jake@conduit.test", "password": "new-password" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn overlong_image_url_is_rejected() {
    let app = TestApp::new();
    let token = app.register("jake").await;
    let image = format!("https://img.conduit.test/{}.png", "x".repeat(240));

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/user",
            Some(&token),
            Some(json!({ "user": { "bio": "kept out", "image": image } })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_messages(&body),
        ["image is too long (maximum is 255 characters)"]
    );

    let (_, current) = app.get("/api/user", Some(&token)).await;
    assert_eq!(current["user"]["bio"], Value::Null);
    assert_eq!(current["user"]["image"], Value::Null);
}

#[tokio::test]
async fn update_user_to_taken_username_is_rejected() {
    let app = TestApp::new();
    app.register("celeb").await;
    let token = app.register("jake").await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/user",
            Some(&token),
            Some(json!({ "user": { "username": "celeb" } })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_messages(&body), ["username has already been taken"]);
}

#[tokio::test]
async fn follow_and_unfollow_profiles() {
    let app = TestApp::new();
    let jake = app.register("jake").await;
    app.register("celeb").await;

    let (status, anonymous) = app.get("/api/profiles/celeb", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(anonymous["profile"]["following"], false);

    for _ in 0..2 {
        let (status, body) = app
            .send(Method::POST, "/api/profiles/celeb/follow", Some(&jake), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["username"], "celeb");
        assert_eq!(body["profile"]["following"], true);
    }

    let (_, viewed) = app.get("/api/profiles/celeb", Some(&jake)).await;
    assert_eq!(viewed["profile"]["following"], true);

    let (status, body) = app
        .send(Method::DELETE, "/api/profiles/celeb/follow", Some(&jake), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["following"], false);
}

#[tokio::test]
async fn profile_edge_cases() {
    let app = TestApp::new();
    let jake = app.register("jake").await;

    let (status, body) = app.get("/api/profiles/ghost", Some(&jake)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_messages(&body), ["profile not found"]);

    let (status, _) = app
        .send(Method::POST, "/api/profiles/jake/follow", Some(&jake), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(Method::POST, "/api/profiles/jake/follow", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
