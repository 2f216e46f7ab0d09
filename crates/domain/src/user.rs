use crate::value_objects::{PasswordHash, Timestamp, UserEmail, UserId, Username};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: UserEmail,
    #[serde(skip_serializing)] // 密码字段不暴露给客户端
    pub password: PasswordHash,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// 待持久化的新用户，id 由存储层分配。
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: UserEmail,
    pub password: PasswordHash,
    pub created_at: Timestamp,
}

impl NewUser {
    pub fn register(
        username: Username,
        email: UserEmail,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            username,
            email,
            password,
            created_at: now,
        }
    }

    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password: self.password,
            bio: None,
            image: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// 个人资料的部分更新；`None` 表示请求中未提供该字段。
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<UserEmail>,
    pub password: Option<PasswordHash>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl User {
    pub fn apply_changes(&mut self, changes: UserChanges, now: Timestamp) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(password) = changes.password {
            self.password = password;
        }
        if let Some(bio) = changes.bio {
            self.bio = Some(bio);
        }
        if let Some(image) = changes.image {
            self.image = Some(image);
        }
        self.updated_at = now;
    }
}
