use std::borrow::Cow;

use application::{
    services::{CreateArticleRequest, ListArticlesQuery, UpdateArticleRequest},
    ArticleDto, ArticleListDto,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use domain::MAX_SHORT_TEXT_LEN;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    auth::{optional_auth, require_auth, AuthUser, MaybeAuthUser},
    error::ApiError,
    extract::{ApiQuery, ValidatedJson},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticlePayload {
    #[validate(nested)]
    pub article: NewArticlePayload,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewArticlePayload {
    #[validate(custom(function = "short_text"))]
    pub title: String,
    #[validate(custom(function = "short_text"))]
    pub description: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub body: String,
    #[serde(default)]
    #[validate(custom(function = "tag_names"))]
    pub tag_list: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticlePayload {
    #[validate(nested)]
    pub article: ArticleChangesPayload,
}

/// `tagList` 出现时整体替换标签
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArticleChangesPayload {
    #[validate(custom(function = "short_text"))]
    pub title: Option<String>,
    #[validate(custom(function = "short_text"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub body: Option<String>,
    #[validate(custom(function = "tag_names"))]
    pub tag_list: Option<Vec<String>>,
}

/// 标题与描述：非空且不超过列宽
fn short_text(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rejected("length", "can't be blank"));
    }
    if value.chars().count() > MAX_SHORT_TEXT_LEN {
        return Err(too_long());
    }
    Ok(())
}

fn tag_names(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.chars().count() > MAX_SHORT_TEXT_LEN) {
        return Err(too_long());
    }
    Ok(())
}

fn too_long() -> ValidationError {
    rejected(
        "length",
        format!("is too long (maximum is {MAX_SHORT_TEXT_LEN} characters)"),
    )
}

fn rejected(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesParams {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleDto,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

pub fn article_routes(state: &AppState) -> Router<AppState> {
    let required = middleware::from_fn_with_state(state.clone(), require_auth);
    let optional = middleware::from_fn_with_state(state.clone(), optional_auth);

    Router::new()
        .route(
            "/articles",
            get(list_articles).route_layer(optional.clone()),
        )
        .route(
            "/articles",
            post(create_article).route_layer(required.clone()),
        )
        .route("/articles/feed", get(feed).route_layer(required.clone()))
        .route("/articles/{slug}", get(get_article).route_layer(optional))
        .route(
            "/articles/{slug}",
            put(update_article)
                .delete(delete_article)
                .route_layer(required.clone()),
        )
        .route(
            "/articles/{slug}/favorite",
            post(favorite_article)
                .delete(unfavorite_article)
                .route_layer(required),
        )
        .route("/tags", get(list_tags))
}

async fn list_articles(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    ApiQuery(params): ApiQuery<ListArticlesParams>,
) -> Result<Json<ArticleListDto>, ApiError> {
    let query = ListArticlesQuery {
        tag: params.tag,
        author: params.author,
        favorited: params.favorited,
        limit: params.limit,
        offset: params.offset,
    };

    let articles = state.article_service.list(viewer, query).await?;
    Ok(Json(articles))
}

async fn feed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(params): ApiQuery<FeedParams>,
) -> Result<Json<ArticleListDto>, ApiError> {
    let articles = state
        .article_service
        .feed(user_id, params.limit, params.offset)
        .await?;
    Ok(Json(articles))
}

async fn create_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateArticlePayload>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let NewArticlePayload {
        title,
        description,
        body,
        tag_list,
    } = payload.article;

    let article = state
        .article_service
        .create(
            user_id,
            CreateArticleRequest {
                title,
                description,
                body,
                tag_list,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ArticleResponse { article })))
}

async fn get_article(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.get(viewer, &slug).await?;
    Ok(Json(ArticleResponse { article }))
}

async fn update_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateArticlePayload>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let ArticleChangesPayload {
        title,
        description,
        body,
        tag_list,
    } = payload.article;

    let article = state
        .article_service
        .update(
            user_id,
            &slug,
            UpdateArticleRequest {
                title,
                description,
                body,
                tag_list,
            },
        )
        .await?;

    Ok(Json(ArticleResponse { article }))
}

async fn delete_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(user_id, &slug).await?;
    Ok(StatusCode::OK)
}

async fn favorite_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.favorite(user_id, &slug).await?;
    Ok(Json(ArticleResponse { article }))
}

async fn unfavorite_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.unfavorite(user_id, &slug).await?;
    Ok(Json(ArticleResponse { article }))
}

async fn list_tags(State(state): State<AppState>) -> Result<Json<TagsResponse>, ApiError> {
    let tags = state.article_service.tags().await?;
    Ok(Json(TagsResponse { tags }))
}
