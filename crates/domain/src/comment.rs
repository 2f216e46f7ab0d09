use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ArticleId, CommentId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub created_at: Timestamp,
}

impl NewComment {
    pub fn new(
        body: impl Into<String>,
        article_id: ArticleId,
        author_id: UserId,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(DomainError::invalid_argument("body", "can't be blank"));
        }
        Ok(Self {
            body,
            article_id,
            author_id,
            created_at: now,
        })
    }

    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            body: self.body,
            article_id: self.article_id,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Comment {
    pub fn ensure_authored_by(&self, user_id: UserId) -> DomainResult<()> {
        if self.author_id == user_id {
            Ok(())
        } else {
            Err(DomainError::InsufficientPermissions)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn blank_comment_is_rejected() {
        let result = NewComment::new("  ", ArticleId::new(1), UserId::new(1), Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn non_author_cannot_pass_ownership_check() {
        let comment = NewComment::new("Thank you!", ArticleId::new(1), UserId::new(3), Utc::now())
            .unwrap()
            .into_comment(CommentId::new(9));
        assert!(comment.ensure_authored_by(UserId::new(3)).is_ok());
        assert_eq!(
            comment.ensure_authored_by(UserId::new(4)),
            Err(DomainError::InsufficientPermissions)
        );
    }
}
