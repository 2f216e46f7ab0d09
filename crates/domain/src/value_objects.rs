use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

surrogate_id!(
    /// 用户唯一标识。
    UserId
);
surrogate_id!(
    /// 文章唯一标识。
    ArticleId
);
surrogate_id!(
    /// 评论唯一标识。
    CommentId
);

/// 经过验证的用户名，区分大小写。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("username", "can't be blank"));
        }
        if value.chars().count() > 50 {
            return Err(DomainError::invalid_argument("username", "is too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 经过验证的邮箱，统一为小写存储。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("email", "can't be blank"));
        }
        if value.chars().count() > MAX_SHORT_TEXT_LEN {
            return Err(DomainError::invalid_argument("email", "is too long"));
        }
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self(value)),
            _ => Err(DomainError::invalid_argument("email", "is invalid")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 密码哈希值，永远不保存明文。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("password_hash", "cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// 短文本列（标题、描述、标签名、slug、头像地址）允许的最大字符数
pub const MAX_SHORT_TEXT_LEN: usize = 255;

const SLUG_SUFFIX_LEN: usize = 6;
/// 留出连字符和后缀的位置
const SLUG_BASE_MAX_LEN: usize = MAX_SHORT_TEXT_LEN - 1 - SLUG_SUFFIX_LEN;
const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// 文章的 URL 标识：标题转换结果加随机后缀。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// 解析来自路径或数据库的 slug。
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("slug", "can't be blank"));
        }
        Ok(Self(value))
    }

    /// 由标题和后缀拼出 slug：小写、空白换成连字符、去掉其他符号。
    /// 过长的标题只取前缀，保证 slug 不超过 `MAX_SHORT_TEXT_LEN` 个字符。
    pub fn from_title(title: &str, suffix: &str) -> Self {
        let mut base = String::with_capacity(title.len());
        let mut len = 0;
        for c in title.trim().chars().flat_map(char::to_lowercase) {
            if len == SLUG_BASE_MAX_LEN {
                break;
            }
            if c.is_alphanumeric() || c == '_' {
                base.push(c);
                len += 1;
            } else if (c.is_whitespace() || c == '-') && !base.is_empty() && !base.ends_with('-') {
                base.push('-');
                len += 1;
            }
        }
        let base = base.trim_end_matches('-');

        if base.is_empty() {
            Self(suffix.to_owned())
        } else {
            Self(format!("{base}-{suffix}"))
        }
    }

    pub fn random_suffix<R: Rng>(rng: &mut R) -> String {
        (0..SLUG_SUFFIX_LEN)
            .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
            .collect()
    }

    pub fn generate(title: &str) -> Self {
        let suffix = Self::random_suffix(&mut rand::rng());
        Self::from_title(title, &suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_blank_and_overlong_values() {
        assert!(Username::parse("   ").is_err());
        assert!(Username::parse("a".repeat(51)).is_err());
        assert_eq!(Username::parse(" jake ").unwrap().as_str(), "jake");
    }

    #[test]
    fn username_is_case_sensitive() {
        assert_ne!(Username::parse("Jake").unwrap(), Username::parse("jake").unwrap());
    }

    #[test]
    fn email_is_normalised_to_lowercase() {
        let email = UserEmail::parse("  Jake@Jake.JAKE ").unwrap();
        assert_eq!(email.as_str(), "jake@jake.jake");
    }

    #[test]
    fn email_requires_local_and_domain_parts() {
        assert!(UserEmail::parse("jake").is_err());
        assert!(UserEmail::parse("@jake.jake").is_err());
        assert!(UserEmail::parse("jake@").is_err());
    }

    #[test]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$2b$12$secret").unwrap();
        assert_eq!(format!("{hash:?}"), "PasswordHash(***)");
    }

    #[test]
    fn slug_lowercases_and_hyphenates_title() {
        let slug = Slug::from_title("How to Train  Your Dragon!", "abc123");
        assert_eq!(slug.as_str(), "how-to-train-your-dragon-abc123");
    }

    #[test]
    fn slug_of_symbol_only_title_is_the_suffix() {
        assert_eq!(Slug::from_title("?!", "zz9999").as_str(), "zz9999");
    }

    #[test]
    fn slug_of_long_title_fits_column() {
        let title = "é".repeat(300);
        let slug = Slug::from_title(&title, "abc123");
        assert_eq!(slug.as_str().chars().count(), MAX_SHORT_TEXT_LEN);
        assert!(slug.as_str().starts_with("éé"));
        assert!(slug.as_str().ends_with("-abc123"));
    }

    #[test]
    fn truncated_slug_does_not_end_base_with_hyphen() {
        let title = format!("{} tail", "a".repeat(SLUG_BASE_MAX_LEN - 1));
        let slug = Slug::from_title(&title, "abc123");
        assert_eq!(slug.as_str(), format!("{}-abc123", "a".repeat(SLUG_BASE_MAX_LEN - 1)));
    }

    #[test]
    fn random_suffix_uses_slug_alphabet() {
        let suffix = Slug::random_suffix(&mut rand::rng());
        assert_eq!(suffix.len(), SLUG_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SLUG_ALPHABET.contains(&b)));
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&CommentId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
