//! 主应用程序入口
//!
//! 加载配置、连接数据库并启动 Axum Web API 服务。

use std::sync::Arc;

use anyhow::Context;
use application::{
    ArticleService, ArticleServiceDependencies, Clock, CommentService,
    CommentServiceDependencies, RandomSlugGenerator, SystemClock, UserService,
    UserServiceDependencies,
};
use config::AppConfig;
use infrastructure::Infrastructure;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志，RUST_LOG 未设置时使用默认级别
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    info!(config = %config.sanitize(), "configuration loaded");

    let infrastructure = Infrastructure::connect(&config)
        .await
        .context("failed to initialize infrastructure")?;
    let state = build_state(&infrastructure);

    let app = router(state);
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("conduit listening on http://{address}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn build_state(infrastructure: &Infrastructure) -> AppState {
    let storage = &infrastructure.storage;
    let token_codec = infrastructure.token_codec_trait();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let user_service = UserService::new(UserServiceDependencies {
        user_repository: storage.user_repository.clone(),
        password_hasher: infrastructure.password_hasher_trait(),
        token_codec: token_codec.clone(),
        clock: clock.clone(),
    });

    let article_service = ArticleService::new(ArticleServiceDependencies {
        article_repository: storage.article_repository.clone(),
        user_repository: storage.user_repository.clone(),
        slug_generator: Arc::new(RandomSlugGenerator),
        clock: clock.clone(),
    });

    let comment_service = CommentService::new(CommentServiceDependencies {
        comment_repository: storage.comment_repository.clone(),
        article_repository: storage.article_repository.clone(),
        user_repository: storage.user_repository.clone(),
        clock,
    });

    AppState::new(
        Arc::new(user_service),
        Arc::new(article_service),
        Arc::new(comment_service),
        token_codec,
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
