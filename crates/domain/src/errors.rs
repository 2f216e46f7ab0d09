//! 领域模型错误定义
//!
//! `DomainError` 描述业务规则被破坏的情况，`RepositoryError` 描述持久化层
//! 需要被上层区分对待的情况（未找到、唯一约束冲突、其他存储故障）。

use std::error::Error as StdError;

use thiserror::Error;

/// 领域模型错误类型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 输入不满足值对象约束
    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 请求者不是资源的作者
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// 操作本身不被允许（例如关注自己）
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn operation_not_allowed(reason: impl Into<String>) -> Self {
        Self::OperationNotAllowed(reason.into())
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 仓储错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// 唯一约束冲突，不依赖驱动的错误文本
    #[error("record already exists")]
    Conflict,

    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
