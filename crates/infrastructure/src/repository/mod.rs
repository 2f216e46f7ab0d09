//! PostgreSQL 仓储实现

mod article;
mod comment;
mod user;

use std::sync::Arc;

use domain::RepositoryError;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub use article::PgArticleRepository;
pub use comment::PgCommentRepository;
pub use user::PgUserRepository;

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepositoryError::Conflict;
        }
    }
    RepositoryError::storage_with_source("database operation failed", err)
}

pub(crate) fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub article_repository: Arc<PgArticleRepository>,
    pub comment_repository: Arc<PgCommentRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            article_repository: Arc::new(PgArticleRepository::new(pool.clone())),
            comment_repository: Arc::new(PgCommentRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
