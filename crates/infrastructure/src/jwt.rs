//! JWT 令牌签发与校验
//!
//! HS256 对称签名，声明中携带用户 ID 与过期时间；更换密钥会使所有已签发令牌失效。

use application::{TokenCodec, TokenError};
use chrono::{Duration, Utc};
use config::JwtConfig;
use domain::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

#[derive(Clone)]
pub struct JwtTokenCodec {
    lifetime: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        Self::with_lifetime(&config.secret, Duration::hours(config.expiration_hours))
    }

    pub fn with_lifetime(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            lifetime,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: user_id.value(),
            exp: (Utc::now() + self.lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Encoding(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| UserId::new(data.claims.user_id))
            .map_err(|_| TokenError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes";

    #[test]
    fn issued_token_verifies_to_same_user() {
        let codec = JwtTokenCodec::with_lifetime(SECRET, Duration::hours(1));
        let token = codec.issue(UserId::new(42)).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = JwtTokenCodec::with_lifetime(SECRET, Duration::seconds(-10));
        let token = codec.issue(UserId::new(42)).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtTokenCodec::with_lifetime(SECRET, Duration::hours(1));
        let verifier =
            JwtTokenCodec::with_lifetime("another-secret-that-is-32-bytes-long", Duration::hours(1));
        let token = issuer.issue(UserId::new(1)).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let codec = JwtTokenCodec::with_lifetime(SECRET, Duration::hours(1));
        assert_eq!(codec.verify("not.a.jwt"), Err(TokenError::InvalidToken));
        assert_eq!(codec.verify(""), Err(TokenError::InvalidToken));
    }

    #[test]
    fn lifetime_comes_from_config() {
        let codec = JwtTokenCodec::new(&JwtConfig {
            secret: SECRET.to_string(),
            expiration_hours: 24,
        });
        assert_eq!(codec.lifetime, Duration::hours(24));
    }
}
