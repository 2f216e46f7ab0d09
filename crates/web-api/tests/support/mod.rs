#![allow(dead_code)]

use std::sync::Arc;

use application::{
    testing::InMemoryStore, ArticleService, ArticleServiceDependencies, CommentService,
    CommentServiceDependencies, RandomSlugGenerator, SystemClock, TokenCodec, UserService,
    UserServiceDependencies,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use domain::{UserId, UserRepository, Username};
use infrastructure::{BcryptPasswordHasher, JwtTokenCodec};
use serde_json::{json, Value};
use tower::ServiceExt;
use web_api::{router, AppState};

pub const JWT_SECRET: &str = "integration-test-secret-with-32-bytes+";

/// 内存仓储 + 真实 bcrypt / JWT 组装出的完整路由
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let repo = Arc::new(store.clone());
        let clock = Arc::new(SystemClock);
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::with_lifetime(
            JWT_SECRET,
            Duration::hours(1),
        ));

        let user_service = UserService::new(UserServiceDependencies {
            user_repository: repo.clone(),
            password_hasher: Arc::new(BcryptPasswordHasher::new(Some(4))),
            token_codec: token_codec.clone(),
            clock: clock.clone(),
        });
        let article_service = ArticleService::new(ArticleServiceDependencies {
            article_repository: repo.clone(),
            user_repository: repo.clone(),
            slug_generator: Arc::new(RandomSlugGenerator),
            clock: clock.clone(),
        });
        let comment_service = CommentService::new(CommentServiceDependencies {
            comment_repository: repo.clone(),
            article_repository: repo.clone(),
            user_repository: repo,
            clock,
        });

        let state = AppState::new(
            Arc::new(user_service),
            Arc::new(article_service),
            Arc::new(comment_service),
            token_codec,
        );

        Self {
            router: router(state),
            store,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        send_request(&self.router, request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    /// 原样带上 `Authorization` 头的 GET 请求
    pub async fn get_with_authorization(
        &self,
        uri: &str,
        authorization: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .expect("request");
        send_request(&self.router, request).await
    }

    pub async fn user_id(&self, username: &str) -> UserId {
        let username = Username::parse(username).expect("username");
        self.store
            .find_by_username(&username)
            .await
            .expect("lookup")
            .expect("registered user")
            .id
    }

    /// 注册并返回令牌
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users",
                None,
                Some(json!({
                    "user": {
                        "username": username,
                        "email": format!("{username}@conduit.test"),
                        "password": "password123"
                    }
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
        body["user"]["token"]
            .as_str()
            .expect("token")
            .to_owned()
    }

    /// 发布文章并返回 slug
    pub async fn create_article(&self, token: &str, title: &str, tags: &[&str]) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/articles",
                Some(token),
                Some(json!({
                    "article": {
                        "title": title,
                        "description": format!("about {title}"),
                        "body": format!("{title} body"),
                        "tagList": tags
                    }
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create {title}: {body}");
        body["article"]["slug"].as_str().expect("slug").to_owned()
    }
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };
    (status, body)
}

pub fn error_messages(body: &Value) -> Vec<String> {
    body["errors"]["body"]
        .as_array()
        .expect("errors.body array")
        .iter()
        .filter_map(|message| message.as_str().map(str::to_owned))
        .collect()
}
