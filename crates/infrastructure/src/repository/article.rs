use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    Article, ArticleFilter, ArticleId, ArticleRepository, NewArticle, PaginatedResult, Pagination,
    RepositoryError, RepositoryResult, Slug, UserId,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{invalid_data, map_sqlx_err};

const ARTICLE_COLUMNS: &str = r#"
    a.id, a.slug, a.title, a.description, a.body, a.author_id, a.favorites_count,
    a.created_at, a.updated_at,
    ARRAY(
        SELECT t.name::TEXT
        FROM article_tags atg
        JOIN tags t ON t.id = atg.tag_id
        WHERE atg.article_id = a.id
        ORDER BY t.name
    ) AS tag_list
"#;

/// 过滤参数为 NULL 时该条件不生效
const LIST_CONDITION: &str = r#"
    ($1::TEXT IS NULL OR EXISTS (
        SELECT 1 FROM article_tags atg JOIN tags t ON t.id = atg.tag_id
        WHERE atg.article_id = a.id AND t.name = $1))
    AND ($2::TEXT IS NULL OR a.author_id = (SELECT u.id FROM users u WHERE u.username = $2))
    AND ($3::TEXT IS NULL OR EXISTS (
        SELECT 1 FROM favorites f JOIN users fu ON fu.id = f.user_id
        WHERE f.article_id = a.id AND fu.username = $3))
"#;

const FEED_CONDITION: &str =
    "a.author_id IN (SELECT following_id FROM follows WHERE follower_id = $1)";

#[derive(Debug, FromRow)]
struct ArticleRecord {
    id: i64,
    slug: String,
    title: String,
    description: String,
    body: String,
    author_id: i64,
    favorites_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tag_list: Vec<String>,
}

impl TryFrom<ArticleRecord> for Article {
    type Error = RepositoryError;

    fn try_from(value: ArticleRecord) -> Result<Self, Self::Error> {
        let slug = Slug::parse(value.slug).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Article {
            id: ArticleId::new(value.id),
            slug,
            title: value.title,
            description: value.description,
            body: value.body,
            author_id: UserId::new(value.author_id),
            favorites_count: value.favorites_count,
            tag_list: value.tag_list,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_page(
        &self,
        items_sql: &str,
        count_sql: &str,
        params: [Option<&str>; 3],
        reader: Option<UserId>,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>> {
        let mut items = sqlx::query_as::<_, ArticleRecord>(items_sql);
        let mut count = sqlx::query_scalar::<_, i64>(count_sql);
        match reader {
            Some(reader) => {
                items = items.bind(reader.value());
                count = count.bind(reader.value());
            }
            None => {
                for param in params {
                    items = items.bind(param);
                    count = count.bind(param);
                }
            }
        }
        let items = items
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.offset))
            .fetch_all(&self.pool);
        let count = count.fetch_one(&self.pool);

        let (records, total) = tokio::try_join!(items, count).map_err(map_sqlx_err)?;
        let articles = records
            .into_iter()
            .map(Article::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult::new(articles, total.max(0) as u64))
    }
}

/// 按名称取得或创建标签，并关联到文章
async fn attach_tags(
    tx: &mut Transaction<'_, Postgres>,
    article_id: i64,
    tags: &[String],
) -> RepositoryResult<()> {
    if tags.is_empty() {
        return Ok(());
    }

    sqlx::query("INSERT INTO tags (name) SELECT UNNEST($1::TEXT[]) ON CONFLICT (name) DO NOTHING")
        .bind(tags)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_err)?;

    sqlx::query(
        "INSERT INTO article_tags (article_id, tag_id) \
         SELECT $1, id FROM tags WHERE name = ANY($2::TEXT[]) \
         ON CONFLICT DO NOTHING",
    )
    .bind(article_id)
    .bind(tags)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_err)?;

    Ok(())
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn create(&self, article: NewArticle) -> RepositoryResult<Article> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO articles (slug, title, description, body, author_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING id",
        )
        .bind(article.slug.as_str())
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.body)
        .bind(article.author_id.value())
        .bind(article.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        attach_tags(&mut tx, id, &article.tag_list).await?;
        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(article.into_article(ArticleId::new(id)))
    }

    async fn find_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.slug = $1");
        let record = sqlx::query_as::<_, ArticleRecord>(&sql)
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        record.map(Article::try_from).transpose()
    }

    async fn update(&self, article: &Article) -> RepositoryResult<Article> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let favorites_count = sqlx::query_scalar::<_, i64>(
            "UPDATE articles SET slug = $2, title = $3, description = $4, body = $5, \
             updated_at = $6 WHERE id = $1 RETURNING favorites_count",
        )
        .bind(article.id.value())
        .bind(article.slug.as_str())
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.body)
        .bind(article.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_err)?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(article.id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        attach_tags(&mut tx, article.id.value(), &article.tag_list).await?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(Article {
            favorites_count,
            ..article.clone()
        })
    }

    async fn delete(&self, id: ArticleId) -> RepositoryResult<()> {
        // 标签关联、收藏和评论由外键级联删除
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &ArticleFilter,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>> {
        let items_sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE {LIST_CONDITION} \
             ORDER BY a.created_at DESC, a.id DESC LIMIT $4 OFFSET $5"
        );
        let count_sql = format!("SELECT COUNT(*) FROM articles a WHERE {LIST_CONDITION}");
        let params = [
            filter.tag.as_deref(),
            filter.author.as_deref(),
            filter.favorited_by.as_deref(),
        ];

        self.fetch_page(&items_sql, &count_sql, params, None, pagination)
            .await
    }

    async fn feed(
        &self,
        reader: UserId,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Article>> {
        let items_sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE {FEED_CONDITION} \
             ORDER BY a.created_at DESC, a.id DESC LIMIT $2 OFFSET $3"
        );
        let count_sql = format!("SELECT COUNT(*) FROM articles a WHERE {FEED_CONDITION}");

        self.fetch_page(&items_sql, &count_sql, [None; 3], Some(reader), pagination)
            .await
    }

    async fn is_favorited(&self, user_id: UserId, article_id: ArticleId) -> RepositoryResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND article_id = $2)",
        )
        .bind(user_id.value())
        .bind(article_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn add_favorite(&self, user_id: UserId, article_id: ArticleId) -> RepositoryResult<i64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let inserted = sqlx::query(
            "INSERT INTO favorites (user_id, article_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id.value())
        .bind(article_id.value())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?
        .rows_affected();

        // 只有真正插入了收藏行才增加计数
        let sql = if inserted == 1 {
            "UPDATE articles SET favorites_count = favorites_count + 1 WHERE id = $1 \
             RETURNING favorites_count"
        } else {
            "SELECT favorites_count FROM articles WHERE id = $1"
        };
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(article_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(count)
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        article_id: ArticleId,
    ) -> RepositoryResult<i64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND article_id = $2")
            .bind(user_id.value())
            .bind(article_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

        let sql = if deleted == 1 {
            "UPDATE articles SET favorites_count = GREATEST(favorites_count - 1, 0) \
             WHERE id = $1 RETURNING favorites_count"
        } else {
            "SELECT favorites_count FROM articles WHERE id = $1"
        };
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(article_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(count)
    }

    async fn list_tags(&self) -> RepositoryResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }
}
