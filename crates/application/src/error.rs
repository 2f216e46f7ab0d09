use std::error::Error as StdError;

use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::password::PasswordHasherError;
use crate::token::TokenError;

/// 服务层对外暴露的错误分类，处理器只需据此映射 HTTP 状态码。
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    /// 登录失败，不区分邮箱不存在还是密码错误
    #[error("email or password is invalid")]
    InvalidCredentials,
    #[error("{0}")]
    InvalidOperation(String),
    #[error("password hashing failed: {0}")]
    HashingFailed(#[from] PasswordHasherError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidArgument { .. } => Self::Validation(value.to_string()),
            DomainError::InsufficientPermissions => Self::Forbidden,
            DomainError::OperationNotAllowed(reason) => Self::InvalidOperation(reason),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound("resource"),
            RepositoryError::Conflict => Self::Conflict("resource already exists".to_owned()),
            other => Self::Internal(error_chain(&other)),
        }
    }
}

impl From<TokenError> for ApplicationError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::InvalidToken => Self::Unauthorized,
            TokenError::Encoding(message) => Self::Internal(format!("token encoding: {message}")),
        }
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
