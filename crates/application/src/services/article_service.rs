use std::sync::Arc;

use domain::{
    Article, ArticleChanges, ArticleFilter, ArticleRepository, NewArticle, PaginatedResult,
    Pagination, RepositoryError, Slug, UserId, UserRepository,
};
use tracing::{info, warn};

use crate::{
    clock::Clock,
    dto::{ArticleDto, ArticleListDto},
    error::ApplicationError,
    services::profiles::AuthorProfiles,
    slug::SlugGenerator,
};

/// slug 冲突时最多尝试的次数
pub const MAX_SLUG_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct CreateArticleRequest {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListArticlesQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub struct ArticleServiceDependencies {
    pub article_repository: Arc<dyn ArticleRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub slug_generator: Arc<dyn SlugGenerator>,
    pub clock: Arc<dyn Clock>,
}

pub struct ArticleService {
    deps: ArticleServiceDependencies,
}

impl ArticleService {
    pub fn new(deps: ArticleServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create(
        &self,
        author_id: UserId,
        request: CreateArticleRequest,
    ) -> Result<ArticleDto, ApplicationError> {
        let slug = self.deps.slug_generator.generate(&request.title);
        let mut new_article = NewArticle::new(
            slug,
            request.title,
            request.description,
            request.body,
            author_id,
            request.tag_list,
            self.deps.clock.now(),
        )?;

        let mut attempt = 1;
        let article = loop {
            match self.deps.article_repository.create(new_article.clone()).await {
                Ok(article) => break article,
                Err(RepositoryError::Conflict) if attempt < MAX_SLUG_ATTEMPTS => {
                    warn!(slug = %new_article.slug, attempt, "slug collision, regenerating");
                    let slug = self.deps.slug_generator.generate(&new_article.title);
                    new_article = new_article.with_slug(slug);
                    attempt += 1;
                }
                Err(RepositoryError::Conflict) => return Err(slug_exhausted()),
                Err(err) => return Err(err.into()),
            }
        };

        info!(article_id = %article.id, slug = %article.slug, author_id = %author_id, "article created");
        self.present_full(Some(author_id), &article).await
    }

    pub async fn get(
        &self,
        viewer: Option<UserId>,
        slug: &str,
    ) -> Result<ArticleDto, ApplicationError> {
        let article = self.find_by_slug(slug).await?;
        self.present_full(viewer, &article).await
    }

    /// 仅作者可修改；标题变化时重新生成 slug
    pub async fn update(
        &self,
        user_id: UserId,
        slug: &str,
        request: UpdateArticleRequest,
    ) -> Result<ArticleDto, ApplicationError> {
        let mut article = self.find_by_slug(slug).await?;
        article.ensure_authored_by(user_id)?;

        let changes = ArticleChanges {
            title: request.title,
            description: request.description,
            body: request.body,
            tag_list: request.tag_list,
        };
        let title_changed = article.apply_changes(changes, self.deps.clock.now())?;

        let article = if title_changed {
            self.save_with_new_slug(article).await?
        } else {
            self.deps.article_repository.update(&article).await?
        };

        info!(article_id = %article.id, slug = %article.slug, "article updated");
        self.present_full(Some(user_id), &article).await
    }

    pub async fn delete(&self, user_id: UserId, slug: &str) -> Result<(), ApplicationError> {
        let article = self.find_by_slug(slug).await?;
        article.ensure_authored_by(user_id)?;

        self.deps.article_repository.delete(article.id).await?;
        info!(article_id = %article.id, slug = %article.slug, "article deleted");
        Ok(())
    }

    pub async fn favorite(&self, user_id: UserId, slug: &str) -> Result<ArticleDto, ApplicationError> {
        let mut article = self.find_by_slug(slug).await?;
        article.favorites_count = self
            .deps
            .article_repository
            .add_favorite(user_id, article.id)
            .await?;

        let author = self.author_profiles(Some(user_id)).resolve(article.author_id).await?;
        Ok(ArticleDto::full(&article, author, true))
    }

    pub async fn unfavorite(
        &self,
        user_id: UserId,
        slug: &str,
    ) -> Result<ArticleDto, ApplicationError> {
        let mut article = self.find_by_slug(slug).await?;
        article.favorites_count = self
            .deps
            .article_repository
            .remove_favorite(user_id, article.id)
            .await?;

        let author = self.author_profiles(Some(user_id)).resolve(article.author_id).await?;
        Ok(ArticleDto::full(&article, author, false))
    }

    pub async fn list(
        &self,
        viewer: Option<UserId>,
        query: ListArticlesQuery,
    ) -> Result<ArticleListDto, ApplicationError> {
        let filter = ArticleFilter {
            tag: query.tag,
            author: query.author,
            favorited_by: query.favorited,
        };
        let page = self
            .deps
            .article_repository
            .list(&filter, Pagination::new(query.limit, query.offset))
            .await?;

        self.present_page(viewer, page, false).await
    }

    pub async fn feed(
        &self,
        user_id: UserId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ArticleListDto, ApplicationError> {
        let page = self
            .deps
            .article_repository
            .feed(user_id, Pagination::new(limit, offset))
            .await?;

        self.present_page(Some(user_id), page, true).await
    }

    pub async fn tags(&self) -> Result<Vec<String>, ApplicationError> {
        Ok(self.deps.article_repository.list_tags().await?)
    }

    async fn save_with_new_slug(&self, mut article: Article) -> Result<Article, ApplicationError> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            article.slug = self.deps.slug_generator.generate(&article.title);
            match self.deps.article_repository.update(&article).await {
                Ok(saved) => return Ok(saved),
                Err(RepositoryError::Conflict) => {
                    warn!(slug = %article.slug, attempt, "slug collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(slug_exhausted())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Article, ApplicationError> {
        let Ok(slug) = Slug::parse(slug) else {
            return Err(ApplicationError::NotFound("article"));
        };
        self.deps
            .article_repository
            .find_by_slug(&slug)
            .await?
            .ok_or(ApplicationError::NotFound("article"))
    }

    fn author_profiles(&self, viewer: Option<UserId>) -> AuthorProfiles<'_> {
        AuthorProfiles::new(self.deps.user_repository.as_ref(), viewer)
    }

    async fn is_favorited(
        &self,
        viewer: Option<UserId>,
        article: &Article,
    ) -> Result<bool, ApplicationError> {
        match viewer {
            Some(viewer) => Ok(self
                .deps
                .article_repository
                .is_favorited(viewer, article.id)
                .await?),
            None => Ok(false),
        }
    }

    async fn present_full(
        &self,
        viewer: Option<UserId>,
        article: &Article,
    ) -> Result<ArticleDto, ApplicationError> {
        let mut profiles = self.author_profiles(viewer);
        let (author, favorited) = tokio::try_join!(
            profiles.resolve(article.author_id),
            self.is_favorited(viewer, article)
        )?;
        Ok(ArticleDto::full(article, author, favorited))
    }

    async fn present_page(
        &self,
        viewer: Option<UserId>,
        page: PaginatedResult<Article>,
        from_feed: bool,
    ) -> Result<ArticleListDto, ApplicationError> {
        let mut profiles = self.author_profiles(viewer);
        let mut articles = Vec::with_capacity(page.items.len());
        for article in &page.items {
            let mut author = profiles.resolve(article.author_id).await?;
            if from_feed {
                author.following = true;
            }
            let favorited = self.is_favorited(viewer, article).await?;
            articles.push(ArticleDto::summary(article, author, favorited));
        }

        Ok(ArticleListDto {
            articles,
            articles_count: page.total_count,
        })
    }
}

fn slug_exhausted() -> ApplicationError {
    ApplicationError::conflict("could not generate a unique slug, please retry")
}
