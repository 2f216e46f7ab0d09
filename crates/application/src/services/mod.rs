mod article_service;
mod comment_service;
mod profiles;
mod user_service;


pub use article_service::{
    ArticleService, ArticleServiceDependencies, CreateArticleRequest, ListArticlesQuery,
    UpdateArticleRequest, MAX_SLUG_ATTEMPTS,
};
pub use comment_service::{CommentService, CommentServiceDependencies};
pub use user_service::{
    LoginRequest, RegisterUserRequest, UpdateUserRequest, UserService, UserServiceDependencies,
    MIN_PASSWORD_LEN,
};
