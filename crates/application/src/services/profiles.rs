use std::collections::HashMap;

use domain::{UserId, UserRepository};

use crate::{dto::ProfileDto, error::ApplicationError};

/// 按查看者解析作者资料；同一请求内对同一作者只查询一次。
pub(crate) struct AuthorProfiles<'a> {
    users: &'a dyn UserRepository,
    viewer: Option<UserId>,
    cache: HashMap<UserId, ProfileDto>,
}

impl<'a> AuthorProfiles<'a> {
    pub(crate) fn new(users: &'a dyn UserRepository, viewer: Option<UserId>) -> Self {
        Self {
            users,
            viewer,
            cache: HashMap::new(),
        }
    }

    pub(crate) async fn resolve(&mut self, author_id: UserId) -> Result<ProfileDto, ApplicationError> {
        if let Some(profile) = self.cache.get(&author_id) {
            return Ok(profile.clone());
        }

        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| ApplicationError::internal(format!("author {author_id} is missing")))?;

        let following = match self.viewer {
            Some(viewer) if viewer != author_id => self.users.is_following(viewer, author_id).await?,
            _ => false,
        };

        let profile = ProfileDto::new(&author, following);
        self.cache.insert(author_id, profile.clone());
        Ok(profile)
    }
}
