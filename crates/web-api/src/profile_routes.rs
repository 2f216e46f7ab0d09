use application::ProfileDto;
use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{
    auth::{optional_auth, require_auth, AuthUser, MaybeAuthUser},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: ProfileDto,
}

pub fn profile_routes(state: &AppState) -> Router<AppState> {
    let required = middleware::from_fn_with_state(state.clone(), require_auth);
    let optional = middleware::from_fn_with_state(state.clone(), optional_auth);

    Router::new()
        .route(
            "/profiles/{username}",
            get(get_profile).route_layer(optional),
        )
        .route(
            "/profiles/{username}/follow",
            post(follow_user).delete(unfollow_user).route_layer(required),
        )
}

async fn get_profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.user_service.get_profile(viewer, &username).await?;
    Ok(Json(ProfileResponse { profile }))
}

async fn follow_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.user_service.follow(user_id, &username).await?;
    Ok(Json(ProfileResponse { profile }))
}

async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.user_service.unfollow(user_id, &username).await?;
    Ok(Json(ProfileResponse { profile }))
}
