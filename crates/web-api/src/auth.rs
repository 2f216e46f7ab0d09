//! 令牌认证
//!
//! 请求头格式为 `Authorization: Token <jwt>`。`require_auth` 在缺少或无效令牌时直接返回 401，
//! `optional_auth` 仅在令牌有效时记录身份；身份写入请求扩展，由 `AuthUser` / `MaybeAuthUser` 取出。

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use domain::UserId;

use crate::{error::ApiError, state::AppState};

pub const TOKEN_SCHEME: &str = "Token";

/// 已通过校验的调用者身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme == TOKEN_SCHEME && !token.is_empty()).then_some(token)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = token_from_headers(headers)?;
    state.token_codec.verify(token).ok().map(CurrentUser)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = authenticate(&state, request.headers()).ok_or_else(ApiError::unauthorized)?;
    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

/// 令牌缺失或无效时按匿名访问继续处理
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(current) = authenticate(&state, request.headers()) {
        request.extensions_mut().insert(current);
    }
    next.run(request).await
}

/// 必须登录的处理器参数
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| AuthUser(current.0))
            .ok_or_else(ApiError::unauthorized)
    }
}

/// 登录可选的处理器参数
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            parts.extensions.get::<CurrentUser>().map(|current| current.0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn accepts_token_scheme() {
        assert_eq!(token_from_headers(&headers("Token abc.def")), Some("abc.def"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(token_from_headers(&headers("Bearer abc.def")), None);
        assert_eq!(token_from_headers(&headers("token abc.def")), None);
        assert_eq!(token_from_headers(&headers("Token ")), None);
        assert_eq!(token_from_headers(&headers("Token")), None);
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }
}
