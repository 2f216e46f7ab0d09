//! 密码哈希端口，算法由基础设施层提供

use async_trait::async_trait;
use domain::PasswordHash;
use thiserror::Error;

/// 哈希器自身的故障。密码不匹配不是错误，`verify` 返回 `Ok(false)`。
#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("could not hash password: {0}")]
    Hash(String),
    /// 库中保存的摘要无法解析
    #[error("stored password digest is unreadable: {0}")]
    MalformedDigest(String),
    #[error("hashing worker stopped: {0}")]
    WorkerStopped(String),
}

/// 注册和改密时生成摘要，登录时比对
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError>;

    async fn verify(
        &self,
        plaintext: &str,
        digest: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
