//! 基础设施层实现。
//!
//! 提供 PostgreSQL 仓储、数据库迁移、bcrypt 密码哈希和 JWT 令牌等适配器，
//! 实现应用/领域层定义的接口。

pub mod builder;
pub mod jwt;
pub mod migrations;
pub mod password;
pub mod repository;

pub use builder::{Infrastructure, InfrastructureError};
pub use jwt::JwtTokenCodec;
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgArticleRepository, PgCommentRepository, PgStorage, PgUserRepository,
};
