//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验、唯一性与作者权限检查，
//! 以及对外部适配器（密码哈希、令牌签发、时钟、slug 生成）的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod password;
pub mod services;
pub mod slug;
pub mod token;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use dto::{ArticleDto, ArticleListDto, CommentDto, ProfileDto, UserDto};
pub use error::ApplicationError;
pub use password::{PasswordHasher, PasswordHasherError};
pub use services::{
    ArticleService, ArticleServiceDependencies, CommentService, CommentServiceDependencies,
    UserService, UserServiceDependencies,
};
pub use slug::{RandomSlugGenerator, SlugGenerator};
pub use token::{TokenCodec, TokenError};
