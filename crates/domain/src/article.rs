//! 文章实体与作者归属规则

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ArticleId, Slug, Timestamp, UserId, MAX_SHORT_TEXT_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: UserId,
    /// 冗余计数，只在收藏行插入/删除的同一事务内变更
    pub favorites_count: i64,
    /// 按名称排序
    pub tag_list: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: UserId,
    pub tag_list: Vec<String>,
    pub created_at: Timestamp,
}

impl NewArticle {
    pub fn new(
        slug: Slug,
        title: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        author_id: UserId,
        tag_list: Vec<String>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let title = short_text("title", title.into())?;
        let description = short_text("description", description.into())?;
        let body = required_text("body", body.into())?;
        let tag_list = normalize_tags(tag_list)?;

        Ok(Self {
            slug,
            title,
            description,
            body,
            author_id,
            tag_list,
            created_at: now,
        })
    }

    /// 发生 slug 冲突后换一个新的 slug 重试
    pub fn with_slug(mut self, slug: Slug) -> Self {
        self.slug = slug;
        self
    }

    pub fn into_article(self, id: ArticleId) -> Article {
        Article {
            id,
            slug: self.slug,
            title: self.title,
            description: self.description,
            body: self.body,
            author_id: self.author_id,
            favorites_count: 0,
            tag_list: self.tag_list,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// 文章的部分更新
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

impl Article {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    pub fn ensure_authored_by(&self, user_id: UserId) -> DomainResult<()> {
        if self.is_authored_by(user_id) {
            Ok(())
        } else {
            Err(DomainError::InsufficientPermissions)
        }
    }

    /// 应用部分更新，返回标题是否发生变化（需要重新生成 slug）。
    pub fn apply_changes(&mut self, changes: ArticleChanges, now: Timestamp) -> DomainResult<bool> {
        let mut title_changed = false;
        if let Some(title) = changes.title {
            let title = short_text("title", title)?;
            title_changed = title != self.title;
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = short_text("description", description)?;
        }
        if let Some(body) = changes.body {
            self.body = required_text("body", body)?;
        }
        if let Some(tags) = changes.tag_list {
            self.tag_list = normalize_tags(tags)?;
        }
        self.updated_at = now;
        Ok(title_changed)
    }
}

/// 去掉空白标签并去重，结果按名称排序。
pub fn normalize_tags(tags: Vec<String>) -> DomainResult<Vec<String>> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.iter().any(|tag| tag.chars().count() > MAX_SHORT_TEXT_LEN) {
        return Err(DomainError::invalid_argument("tagList", "contains a tag that is too long"));
    }
    tags.sort();
    tags.dedup();
    Ok(tags)
}

fn required_text(field: &str, value: String) -> DomainResult<String> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_argument(field, "can't be blank"));
    }
    Ok(value)
}

fn short_text(field: &str, value: String) -> DomainResult<String> {
    let value = required_text(field, value)?;
    if value.chars().count() > MAX_SHORT_TEXT_LEN {
        return Err(DomainError::invalid_argument(field, "is too long"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn article(author: i64) -> Article {
        NewArticle::new(
            Slug::from_title("How to train your dragon", "abc123"),
            "How to train your dragon",
            "Ever wonder how?",
            "You have to believe",
            UserId::new(author),
            vec!["dragons".into(), "training".into()],
            Utc::now(),
        )
        .unwrap()
        .into_article(ArticleId::new(7))
    }

    #[test]
    fn only_the_author_passes_the_ownership_check() {
        let article = article(1);
        assert!(article.ensure_authored_by(UserId::new(1)).is_ok());
        assert_eq!(
            article.ensure_authored_by(UserId::new(2)),
            Err(DomainError::InsufficientPermissions)
        );
    }

    #[test]
    fn new_article_requires_title_description_and_body() {
        let result = NewArticle::new(
            Slug::from_title("x", "abc123"),
            " ",
            "d",
            "b",
            UserId::new(1),
            vec![],
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidArgument { field, .. }) if field == "title"));
    }

    #[test]
    fn tags_are_trimmed_deduplicated_and_sorted() {
        let tags = normalize_tags(vec![
            "rust ".into(),
            "axum".into(),
            "rust".into(),
            "  ".into(),
        ])
        .unwrap();
        assert_eq!(tags, vec!["axum".to_string(), "rust".to_string()]);
    }

    #[test]
    fn overlong_title_and_tags_are_rejected() {
        let long = "a".repeat(MAX_SHORT_TEXT_LEN + 1);
        let result = NewArticle::new(
            Slug::from_title("x", "abc123"),
            long.clone(),
            "d",
            "b",
            UserId::new(1),
            vec![],
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidArgument { field, .. }) if field == "title"));

        assert!(normalize_tags(vec!["a".repeat(MAX_SHORT_TEXT_LEN)]).is_ok());
        assert!(normalize_tags(vec![long.clone()]).is_err());

        let mut article = article(1);
        let result = article.apply_changes(
            ArticleChanges {
                description: Some(long),
                ..ArticleChanges::default()
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidArgument { field, .. }) if field == "description"));
        assert_eq!(article.description, "Ever wonder how?");
    }

    #[test]
    fn apply_changes_reports_title_change() {
        let mut article = article(1);
        let changed = article
            .apply_changes(
                ArticleChanges {
                    title: Some("Did you train your dragon?".into()),
                    ..ArticleChanges::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert!(changed);
        assert_eq!(article.body, "You have to believe");

        let unchanged = article
            .apply_changes(
                ArticleChanges {
                    body: Some("new body".into()),
                    ..ArticleChanges::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert!(!unchanged);
        assert_eq!(article.body, "new body");
    }
}
