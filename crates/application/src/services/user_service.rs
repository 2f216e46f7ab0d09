use std::sync::Arc;

use domain::{
    NewUser, RepositoryError, User, UserChanges, UserEmail, UserId, UserRepository, Username,
};
use tracing::{debug, info};

use crate::{
    clock::Clock,
    dto::{ProfileDto, UserDto},
    error::ApplicationError,
    password::PasswordHasher,
    token::TokenCodec,
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 只有 `Some` 的字段会被修改
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_codec: Arc<dyn TokenCodec>,
    pub clock: Arc<dyn Clock>,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<UserDto, ApplicationError> {
        let username = Username::parse(request.username)?;
        let email = UserEmail::parse(request.email)?;
        ensure_password_strength(&request.password)?;

        let repo = &self.deps.user_repository;
        if repo.find_by_email(&email).await?.is_some() {
            return Err(ApplicationError::conflict("email has already been taken"));
        }
        if repo.find_by_username(&username).await?.is_some() {
            return Err(ApplicationError::conflict("username has already been taken"));
        }

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;
        let new_user = NewUser::register(username, email, password_hash, self.deps.clock.now());

        // 并发注册时由唯一索引兜底
        let user = repo.create(new_user).await.map_err(|err| match err {
            RepositoryError::Conflict => {
                ApplicationError::conflict("username or email has already been taken")
            }
            other => other.into(),
        })?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        self.with_token(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<UserDto, ApplicationError> {
        let Ok(email) = UserEmail::parse(request.email) else {
            return Err(ApplicationError::InvalidCredentials);
        };

        let user = self
            .deps
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(ApplicationError::InvalidCredentials)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?;
        if !password_ok {
            debug!(user_id = %user.id, "login rejected");
            return Err(ApplicationError::InvalidCredentials);
        }

        self.with_token(&user)
    }

    /// 返回当前用户并签发新的令牌
    pub async fn current_user(&self, user_id: UserId) -> Result<UserDto, ApplicationError> {
        let user = self.load_current(user_id).await?;
        self.with_token(&user)
    }

    pub async fn update_current_user(
        &self,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> Result<UserDto, ApplicationError> {
        let mut user = self.load_current(user_id).await?;
        let repo = &self.deps.user_repository;

        let mut changes = UserChanges {
            bio: request.bio,
            image: request.image,
            ..UserChanges::default()
        };

        if let Some(username) = request.username {
            let username = Username::parse(username)?;
            if username != user.username {
                if let Some(other) = repo.find_by_username(&username).await? {
                    if other.id != user.id {
                        return Err(ApplicationError::conflict("username has already been taken"));
                    }
                }
            }
            changes.username = Some(username);
        }

        if let Some(email) = request.email {
            let email = UserEmail::parse(email)?;
            if email != user.email {
                if let Some(other) = repo.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(ApplicationError::conflict("email has already been taken"));
                    }
                }
            }
            changes.email = Some(email);
        }

        if let Some(password) = request.password {
            ensure_password_strength(&password)?;
            changes.password = Some(self.deps.password_hasher.hash(&password).await?);
        }

        user.apply_changes(changes, self.deps.clock.now());
        let user = repo.update(&user).await.map_err(|err| match err {
            RepositoryError::Conflict => {
                ApplicationError::conflict("username or email has already been taken")
            }
            RepositoryError::NotFound => ApplicationError::Unauthorized,
            other => other.into(),
        })?;

        info!(user_id = %user.id, "user profile updated");
        self.with_token(&user)
    }

    /// `viewer` 为空或为本人时 `following` 恒为 false
    pub async fn get_profile(
        &self,
        viewer: Option<UserId>,
        username: &str,
    ) -> Result<ProfileDto, ApplicationError> {
        let target = self.find_by_username(username).await?;
        let following = match viewer {
            Some(viewer) if viewer != target.id => {
                self.deps
                    .user_repository
                    .is_following(viewer, target.id)
                    .await?
            }
            _ => false,
        };
        Ok(ProfileDto::new(&target, following))
    }

    pub async fn follow(
        &self,
        follower: UserId,
        username: &str,
    ) -> Result<ProfileDto, ApplicationError> {
        let target = self.find_by_username(username).await?;
        if target.id == follower {
            return Err(ApplicationError::InvalidOperation(
                "cannot follow yourself".to_owned(),
            ));
        }

        self.deps.user_repository.follow(follower, target.id).await?;
        debug!(follower = %follower, following = %target.id, "followed user");
        Ok(ProfileDto::new(&target, true))
    }

    pub async fn unfollow(
        &self,
        follower: UserId,
        username: &str,
    ) -> Result<ProfileDto, ApplicationError> {
        let target = self.find_by_username(username).await?;
        self.deps
            .user_repository
            .unfollow(follower, target.id)
            .await?;
        debug!(follower = %follower, following = %target.id, "unfollowed user");
        Ok(ProfileDto::new(&target, false))
    }

    async fn load_current(&self, user_id: UserId) -> Result<User, ApplicationError> {
        // 令牌有效但用户已不存在，按未认证处理
        self.deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ApplicationError::Unauthorized)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, ApplicationError> {
        let Ok(username) = Username::parse(username) else {
            return Err(ApplicationError::NotFound("profile"));
        };
        self.deps
            .user_repository
            .find_by_username(&username)
            .await?
            .ok_or(ApplicationError::NotFound("profile"))
    }

    fn with_token(&self, user: &User) -> Result<UserDto, ApplicationError> {
        let token = self.deps.token_codec.issue(user.id)?;
        Ok(UserDto::new(user, token))
    }
}

fn ensure_password_strength(password: &str) -> Result<(), ApplicationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApplicationError::validation(format!(
            "password: is too short (minimum is {MIN_PASSWORD_LEN} characters)"
        )));
    }
    Ok(())
}
