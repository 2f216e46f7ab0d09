use domain::UserId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// 签名不符、结构错误或已过期
    #[error("invalid token")]
    InvalidToken,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// 签发和校验携带用户 ID 的身份令牌
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError>;
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
