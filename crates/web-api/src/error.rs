use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// 所有接口统一的错误响应体：`{"errors":{"body":[...]}}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub errors: ErrorMessages,
}

#[derive(Debug, Serialize)]
pub struct ErrorMessages {
    pub body: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_messages(status, vec![message.into()])
    }

    pub fn with_messages(status: StatusCode, messages: Vec<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                errors: ErrorMessages { body: messages },
            },
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "missing or invalid authorization token",
        )
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{resource} not found"))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn messages(&self) -> &[String] {
        &self.body.errors.body
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        use ApplicationError as AppErr;

        let status = match &err {
            AppErr::Validation(_) | AppErr::Conflict(_) | AppErr::InvalidOperation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppErr::Unauthorized | AppErr::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppErr::Forbidden => StatusCode::FORBIDDEN,
            AppErr::NotFound(_) => StatusCode::NOT_FOUND,
            AppErr::HashingFailed(_) | AppErr::Internal(_) => {
                // 细节只写日志，不返回给客户端
                error!(error = %err, "request failed");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
            }
        };

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
