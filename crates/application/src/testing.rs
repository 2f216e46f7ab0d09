//! 内存版仓储与适配器，用于服务层单元测试和 web-api 集成测试。
//!
//! 语义与 PostgreSQL 实现保持一致：唯一约束冲突返回 `Conflict`，
//! 收藏计数只在收藏行真正插入或删除时变化，删除文章级联删除收藏与评论。

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use domain::{
    Article, ArticleFilter, ArticleId, ArticleRepository, Comment, CommentId, CommentRepository,
    NewArticle, NewComment, NewUser, PaginatedResult, Pagination, PasswordHash, RepositoryError,
    RepositoryResult, Slug, Timestamp, User, UserEmail, UserId, UserRepository, Username,
};
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::password::{PasswordHasher, PasswordHasherError};
use crate::token::{TokenCodec, TokenError};

#[derive(Default)]
struct State {
    next_user_id: i64,
    next_article_id: i64,
    next_comment_id: i64,
    users: BTreeMap<UserId, User>,
    follows: HashSet<(UserId, UserId)>,
    articles: BTreeMap<ArticleId, Article>,
    tags: BTreeSet<String>,
    favorites: HashSet<(UserId, ArticleId)>,
    comments: BTreeMap<CommentId, Comment>,
}

impl State {
    fn user_id_by_username(&self, username: &str) -> Option<UserId> {
        self.users
            .values()
            .find(|user| user.username.as_str() == username)
            .map(|user| user.id)
    }

    fn slug_taken(&self, slug: &Slug, except: Option<ArticleId>) -> bool {
        self.articles
            .values()
            .any(|article| &article.slug == slug && Some(article.id) != except)
    }

    fn paginate(&self, mut items: Vec<Article>, pagination: Pagination) -> PaginatedResult<Article> {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        PaginatedResult::new(items, total)
    }
}

/// 同时实现三个仓储接口的内存存储，克隆后共享同一份数据。
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某篇文章的收藏行数量
    pub async fn favorite_rows(&self, article_id: ArticleId) -> usize {
        let guard = self.state.read().await;
        guard
            .favorites
            .iter()
            .filter(|(_, article)| *article == article_id)
            .count()
    }

    pub async fn follow_rows(&self, follower: UserId) -> usize {
        let guard = self.state.read().await;
        guard
            .follows
            .iter()
            .filter(|(from, _)| *from == follower)
            .count()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut guard = self.state.write().await;
        let taken = guard
            .users
            .values()
            .any(|existing| existing.username == user.username || existing.email == user.email);
        if taken {
            return Err(RepositoryError::Conflict);
        }

        guard.next_user_id += 1;
        let user = user.into_user(UserId::new(guard.next_user_id));
        guard.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
        let guard = self.state.read().await;
        Ok(guard.users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> RepositoryResult<Option<User>> {
        let guard = self.state.read().await;
        Ok(guard.users.values().find(|u| &u.username == username).cloned())
    }

    async fn update(&self, user: &User) -> RepositoryResult<User> {
        let mut guard = self.state.write().await;
        if !guard.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        let taken = guard.users.values().any(|existing| {
            existing.id != user.id
                && (existing.username == user.username || existing.email == user.email)
        });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn is_following(&self, follower: UserId, following: UserId) -> RepositoryResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .follows
            .contains(&(follower, following)))
    }

    async fn follow(&self, follower: UserId, following: UserId) -> RepositoryResult<()> {
        self.state.write().await.follows.insert((follower, following));
        Ok(())
    }

    async fn unfollow(&self, follower: UserId, following: UserId) -> RepositoryResult<()> {
        self.state.write().await.follows.remove(&(follower, following));
        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryStore {
    async fn create(&self, article: NewArticle) -> RepositoryResult<Article> {
        let mut guard = self.state.write().await;
        if guard.slug_taken(&article.slug, None) {
            return Err(RepositoryError::Conflict);
        }

        guard.next_article_id += 1;
        let article = article.into_article(ArticleId::new(guard.next_article_id));
        guard.tags.extend(article.tag_list.iter().cloned());
        guard.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn find_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Article>> {
        let guard = self.state.read().await;
        Ok(guard.articles.values().find(|a| &a.slug == slug).cloned())
    }

    async fn update(&self, article: &Article) -> RepositoryResult<Article> {
        let mut guard = self.state.write().await;
        let Some(stored) = guard.articles.get(&article.id) else {
            return Err(RepositoryError::NotFound);
        };
        // 收藏数只由收藏操作维护
        let favorites_count = stored.favorites_count;
        if guard.slug_taken(&article.slug, Some(article.id)) {
            return Err(RepositoryError::Conflict);
        }

        let mut updated = article.clone();
        updated.favorites_count = favorites_count;
        guard.tags.extend(updated.tag_list.iter().cloned());
        guard.articles.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: ArticleId) -> RepositoryResult<()> {
        let mut guard = self.state.write().await;
        if guard.articles.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        guard.favorites.retain(|(_, article)| *article != id);
        guard.comments.retain(|_, comment| comment.article_id != id);
        Ok(())
    }

    async fn list(
        &self,
        filter: &ArticleFilter,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>> {
        let guard = self.state.read().await;

        let author = match &filter.author {
            Some(name) => match guard.user_id_by_username(name) {
                Some(id) => Some(id),
                None => return Ok(PaginatedResult::new(Vec::new(), 0)),
            },
            None => None,
        };
        let favorited_by = match &filter.favorited_by {
            Some(name) => match guard.user_id_by_username(name) {
                Some(id) => Some(id),
                None => return Ok(PaginatedResult::new(Vec::new(), 0)),
            },
            None => None,
        };

        let items = guard
            .articles
            .values()
            .filter(|a| filter.tag.as_ref().is_none_or(|tag| a.tag_list.contains(tag)))
            .filter(|a| author.is_none_or(|id| a.author_id == id))
            .filter(|a| favorited_by.is_none_or(|id| guard.favorites.contains(&(id, a.id))))
            .cloned()
            .collect();
        Ok(guard.paginate(items, pagination))
    }

    async fn feed(
        &self,
        reader: UserId,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>> {
        let guard = self.state.read().await;
        let items = guard
            .articles
            .values()
            .filter(|a| guard.follows.contains(&(reader, a.author_id)))
            .cloned()
            .collect();
        Ok(guard.paginate(items, pagination))
    }

    async fn is_favorited(&self, user_id: UserId, article_id: ArticleId) -> RepositoryResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .favorites
            .contains(&(user_id, article_id)))
    }

    async fn add_favorite(&self, user_id: UserId, article_id: ArticleId) -> RepositoryResult<i64> {
        let mut guard = self.state.write().await;
        if !guard.articles.contains_key(&article_id) {
            return Err(RepositoryError::NotFound);
        }
        let inserted = guard.favorites.insert((user_id, article_id));
        let article = guard
            .articles
            .get_mut(&article_id)
            .ok_or(RepositoryError::NotFound)?;
        if inserted {
            article.favorites_count += 1;
        }
        Ok(article.favorites_count)
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        article_id: ArticleId,
    ) -> RepositoryResult<i64> {
        let mut guard = self.state.write().await;
        let removed = guard.favorites.remove(&(user_id, article_id));
        let article = guard
            .articles
            .get_mut(&article_id)
            .ok_or(RepositoryError::NotFound)?;
        if removed && article.favorites_count > 0 {
            article.favorites_count -= 1;
        }
        Ok(article.favorites_count)
    }

    async fn list_tags(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.state.read().await.tags.iter().cloned().collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let mut guard = self.state.write().await;
        if !guard.articles.contains_key(&comment.article_id) {
            return Err(RepositoryError::NotFound);
        }
        guard.next_comment_id += 1;
        let comment = comment.into_comment(CommentId::new(guard.next_comment_id));
        guard.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_by_article(&self, article_id: ArticleId) -> RepositoryResult<Vec<Comment>> {
        let guard = self.state.read().await;
        let mut comments: Vec<Comment> = guard
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn delete(&self, id: CommentId) -> RepositoryResult<()> {
        match self.state.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

/// 明文“哈希”，只用于测试
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{plaintext}"))
            .map_err(|err| PasswordHasherError::Hash(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        digest: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        match digest.as_str().strip_prefix("plain:") {
            Some(stored) => Ok(stored == plaintext),
            None => Err(PasswordHasherError::MalformedDigest(digest.as_str().to_owned())),
        }
    }
}

/// 手动拨动的时钟，克隆后共享同一时刻
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 令牌即 `user-<id>`，不签名
pub struct StaticTokenCodec;

impl TokenCodec for StaticTokenCodec {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        Ok(format!("user-{user_id}"))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        token
            .strip_prefix("user-")
            .and_then(|id| id.parse::<i64>().ok())
            .map(UserId::new)
            .ok_or(TokenError::InvalidToken)
    }
}
