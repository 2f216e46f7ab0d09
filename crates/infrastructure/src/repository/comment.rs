use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    ArticleId, Comment, CommentId, CommentRepository, NewComment, RepositoryError,
    RepositoryResult, UserId,
};
use sqlx::{FromRow, PgPool};

use super::map_sqlx_err;

const COMMENT_COLUMNS: &str = "id, body, article_id, author_id, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CommentRecord {
    id: i64,
    body: String,
    article_id: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRecord> for Comment {
    fn from(value: CommentRecord) -> Self {
        Comment {
            id: CommentId::new(value.id),
            body: value.body,
            article_id: ArticleId::new(value.article_id),
            author_id: UserId::new(value.author_id),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let sql = format!(
            "INSERT INTO comments (body, article_id, author_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {COMMENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(&comment.body)
            .bind(comment.article_id.value())
            .bind(comment.author_id.value())
            .bind(comment.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(record.into())
    }

    async fn find_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        let record = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(record.map(Comment::from))
    }

    async fn list_by_article(&self, article_id: ArticleId) -> RepositoryResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        let records = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(article_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(Comment::from).collect())
    }

    async fn delete(&self, id: CommentId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
