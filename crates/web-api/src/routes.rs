use axum::{http::StatusCode, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    article_routes::article_routes, comment_routes::comment_routes,
    profile_routes::profile_routes, state::AppState, user_routes::user_routes,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(user_routes(state))
        .merge(profile_routes(state))
        .merge(article_routes(state))
        .merge(comment_routes(state))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
