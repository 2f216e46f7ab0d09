use std::sync::Arc;

use application::{PasswordHasher, TokenCodec};
use config::AppConfig;
use thiserror::Error;
use tracing::info;

use crate::{
    jwt::JwtTokenCodec,
    migrations::MIGRATOR,
    password::BcryptPasswordHasher,
    repository::{create_pg_pool, PgStorage},
};

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// 启动时构建一次的外部适配器集合
#[derive(Clone)]
pub struct Infrastructure {
    pub storage: Arc<PgStorage>,
    pub password_hasher: Arc<BcryptPasswordHasher>,
    pub token_codec: Arc<JwtTokenCodec>,
}

impl Infrastructure {
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;
        MIGRATOR.run(&pool).await?;
        info!(max_connections = config.database.max_connections, "database ready");

        Ok(Self {
            storage: Arc::new(PgStorage::new(pool)),
            password_hasher: Arc::new(BcryptPasswordHasher::new(config.security.bcrypt_cost)),
            token_codec: Arc::new(JwtTokenCodec::new(&config.jwt)),
        })
    }

    pub fn password_hasher_trait(&self) -> Arc<dyn PasswordHasher> {
        self.password_hasher.clone()
    }

    pub fn token_codec_trait(&self) -> Arc<dyn TokenCodec> {
        self.token_codec.clone()
    }
}
