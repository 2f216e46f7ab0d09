//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务，
//! 负责令牌认证、请求体校验以及统一的错误响应格式。

mod article_routes;
mod auth;
mod comment_routes;
mod error;
mod extract;
mod profile_routes;
mod routes;
mod state;
mod user_routes;

pub use auth::{AuthUser, CurrentUser, MaybeAuthUser, TOKEN_SCHEME};
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
