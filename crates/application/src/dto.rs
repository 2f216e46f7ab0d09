//! 响应载荷，字段名即对外的 JSON 契约

use domain::{Article, Comment, Timestamp, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserDto {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            email: user.email.as_str().to_owned(),
            token,
            username: user.username.as_str().to_owned(),
            bio: user.bio.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl ProfileDto {
    pub fn new(user: &User, following: bool) -> Self {
        Self {
            username: user.username.as_str().to_owned(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// 列表接口不返回正文
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub tag_list: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileDto,
}

impl ArticleDto {
    pub fn full(article: &Article, author: ProfileDto, favorited: bool) -> Self {
        Self {
            body: Some(article.body.clone()),
            ..Self::summary(article, author, favorited)
        }
    }

    pub fn summary(article: &Article, author: ProfileDto, favorited: bool) -> Self {
        Self {
            slug: article.slug.as_str().to_owned(),
            title: article.title.clone(),
            description: article.description.clone(),
            body: None,
            tag_list: article.tag_list.clone(),
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited,
            favorites_count: article.favorites_count,
            author,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListDto {
    pub articles: Vec<ArticleDto>,
    pub articles_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub body: String,
    pub author: ProfileDto,
}

impl CommentDto {
    pub fn new(comment: &Comment, author: ProfileDto) -> Self {
        Self {
            id: comment.id.value(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            body: comment.body.clone(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::{ArticleId, NewArticle, Slug, UserId};

    use super::*;

    fn profile() -> ProfileDto {
        ProfileDto {
            username: "jake".into(),
            bio: None,
            image: None,
            following: false,
        }
    }

    #[test]
    fn article_uses_camel_case_and_omits_body_in_summary() {
        let article = NewArticle::new(
            Slug::from_title("Dragons", "abc123"),
            "Dragons",
            "desc",
            "body",
            UserId::new(1),
            vec!["dragons".into()],
            Utc::now(),
        )
        .unwrap()
        .into_article(ArticleId::new(1));

        let summary = serde_json::to_value(ArticleDto::summary(&article, profile(), false)).unwrap();
        assert!(summary.get("body").is_none());
        assert_eq!(summary["tagList"][0], "dragons");
        assert_eq!(summary["favoritesCount"], 0);

        let full = serde_json::to_value(ArticleDto::full(&article, profile(), true)).unwrap();
        assert_eq!(full["body"], "body");
        assert_eq!(full["favorited"], true);
        assert_eq!(full["author"]["following"], false);
    }
}
