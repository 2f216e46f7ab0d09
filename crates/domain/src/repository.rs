//! Repository接口定义
//!
//! 内层定义数据访问能力，外层（PostgreSQL、内存实现）负责实现。
//! 唯一约束冲突统一以 `RepositoryError::Conflict` 返回，未命中的查找返回 `Ok(None)`。

use async_trait::async_trait;

use crate::article::{Article, NewArticle};
use crate::comment::{Comment, NewComment};
use crate::errors::RepositoryResult;
use crate::user::{NewUser, User};
use crate::value_objects::{ArticleId, CommentId, Slug, UserEmail, UserId, Username};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    /// limit 缺省为 20，并限制在 1..=100 之间
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 分页结果，`total_count` 为满足条件的总数而非本页条数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

/// 文章列表过滤条件，各条件之间为 AND 关系
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    /// 作者用户名
    pub author: Option<String>,
    /// 收藏者用户名
    pub favorited_by: Option<String>,
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;

    async fn find_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;

    /// 保存整个用户记录；用户名或邮箱与他人冲突时返回 `Conflict`
    async fn update(&self, user: &User) -> RepositoryResult<User>;

    async fn is_following(&self, follower: UserId, following: UserId) -> RepositoryResult<bool>;

    /// 已关注时不做任何事
    async fn follow(&self, follower: UserId, following: UserId) -> RepositoryResult<()>;

    /// 未关注时不做任何事
    async fn unfollow(&self, follower: UserId, following: UserId) -> RepositoryResult<()>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// 在同一事务中写入文章并关联标签；slug 重复时返回 `Conflict`
    async fn create(&self, article: NewArticle) -> RepositoryResult<Article>;

    async fn find_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Article>>;

    /// 保存文章字段并整体替换标签集合
    async fn update(&self, article: &Article) -> RepositoryResult<Article>;

    async fn delete(&self, id: ArticleId) -> RepositoryResult<()>;

    async fn list(
        &self,
        filter: &ArticleFilter,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>>;

    /// 被 `reader` 关注的作者发表的文章
    async fn feed(
        &self,
        reader: UserId,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>>;

    async fn is_favorited(&self, user_id: UserId, article_id: ArticleId) -> RepositoryResult<bool>;

    /// 幂等收藏，返回当前收藏数
    async fn add_favorite(&self, user_id: UserId, article_id: ArticleId) -> RepositoryResult<i64>;

    /// 幂等取消收藏，返回当前收藏数
    async fn remove_favorite(&self, user_id: UserId, article_id: ArticleId)
        -> RepositoryResult<i64>;

    async fn list_tags(&self) -> RepositoryResult<Vec<String>>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> RepositoryResult<Comment>;

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>>;

    /// 按创建时间升序
    async fn list_by_article(&self, article_id: ArticleId) -> RepositoryResult<Vec<Comment>>;

    async fn delete(&self, id: CommentId) -> RepositoryResult<()>;
}
