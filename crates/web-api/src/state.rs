use std::sync::Arc;

use application::{ArticleService, CommentService, TokenCodec, UserService};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub article_service: Arc<ArticleService>,
    pub comment_service: Arc<CommentService>,
    pub token_codec: Arc<dyn TokenCodec>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        article_service: Arc<ArticleService>,
        comment_service: Arc<CommentService>,
        token_codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            user_service,
            article_service,
            comment_service,
            token_codec,
        }
    }
}
