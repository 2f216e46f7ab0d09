use application::{
    services::{LoginRequest, RegisterUserRequest, UpdateUserRequest},
    UserDto,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::{require_auth, AuthUser},
    error::ApiError,
    extract::ValidatedJson,
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(nested)]
    pub user: NewUserPayload,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUserPayload {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "is invalid"))]
    pub email: String,
    #[validate(length(min = 8, message = "is too short (minimum is 8 characters)"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(nested)]
    pub user: LoginUserPayload,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub email: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(nested)]
    pub user: UserChangesPayload,
}

/// 只修改出现的字段
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserChangesPayload {
    #[validate(email(message = "is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 8, message = "is too short (minimum is 8 characters)"))]
    pub password: Option<String>,
    pub bio: Option<String>,
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserDto,
}

pub fn user_routes(state: &AppState) -> Router<AppState> {
    let required = middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route("/users", post(register_user))
        .route("/users/login", post(login_user))
        .route(
            "/user",
            get(current_user).put(update_user).route_layer(required),
        )
}

async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let NewUserPayload {
        username,
        email,
        password,
    } = payload.user;

    let user = state
        .user_service
        .register(RegisterUserRequest {
            username,
            email,
            password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .login(LoginRequest {
            email: payload.user.email,
            password: payload.user.password,
        })
        .await?;

    Ok(Json(UserResponse { user }))
}

async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.current_user(user_id).await?;
    Ok(Json(UserResponse { user }))
}

async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    let UserChangesPayload {
        email,
        username,
        password,
        bio,
        image,
    } = payload.user;

    let user = state
        .user_service
        .update_current_user(
            user_id,
            UpdateUserRequest {
                email,
                username,
                password,
                bio,
                image,
            },
        )
        .await?;

    Ok(Json(UserResponse { user }))
}
