use std::sync::Arc;

use domain::{
    Article, ArticleRepository, CommentId, CommentRepository, NewComment, Slug, UserId,
    UserRepository,
};
use tracing::info;

use crate::{
    clock::Clock, dto::CommentDto, error::ApplicationError, services::profiles::AuthorProfiles,
};

pub struct CommentServiceDependencies {
    pub comment_repository: Arc<dyn CommentRepository>,
    pub article_repository: Arc<dyn ArticleRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct CommentService {
    deps: CommentServiceDependencies,
}

impl CommentService {
    pub fn new(deps: CommentServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn add(
        &self,
        author_id: UserId,
        slug: &str,
        body: String,
    ) -> Result<CommentDto, ApplicationError> {
        let article = self.find_article(slug).await?;
        let new_comment = NewComment::new(body, article.id, author_id, self.deps.clock.now())?;
        let comment = self.deps.comment_repository.create(new_comment).await?;

        let author = AuthorProfiles::new(self.deps.user_repository.as_ref(), Some(author_id))
            .resolve(author_id)
            .await?;
        Ok(CommentDto::new(&comment, author))
    }

    /// 按创建时间升序返回
    pub async fn list(
        &self,
        viewer: Option<UserId>,
        slug: &str,
    ) -> Result<Vec<CommentDto>, ApplicationError> {
        let article = self.find_article(slug).await?;
        let comments = self
            .deps
            .comment_repository
            .list_by_article(article.id)
            .await?;

        let mut profiles = AuthorProfiles::new(self.deps.user_repository.as_ref(), viewer);
        let mut result = Vec::with_capacity(comments.len());
        for comment in &comments {
            let author = profiles.resolve(comment.author_id).await?;
            result.push(CommentDto::new(comment, author));
        }
        Ok(result)
    }

    pub async fn delete(
        &self,
        user_id: UserId,
        slug: &str,
        comment_id: i64,
    ) -> Result<(), ApplicationError> {
        let article = self.find_article(slug).await?;
        let comment = self
            .deps
            .comment_repository
            .find_by_id(CommentId::new(comment_id))
            .await?
            .filter(|comment| comment.article_id == article.id)
            .ok_or(ApplicationError::NotFound("comment"))?;
        comment.ensure_authored_by(user_id)?;

        self.deps.comment_repository.delete(comment.id).await?;
        info!(comment_id = %comment.id, article_id = %article.id, "comment deleted");
        Ok(())
    }

    async fn find_article(&self, slug: &str) -> Result<Article, ApplicationError> {
        let Ok(slug) = Slug::parse(slug) else {
            return Err(ApplicationError::NotFound("article"));
        };
        self.deps
            .article_repository
            .find_by_slug(&slug)
            .await?
            .ok_or(ApplicationError::NotFound("article"))
    }
}
