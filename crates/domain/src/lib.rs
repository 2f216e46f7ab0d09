//! Conduit 博客系统核心领域模型
//!
//! 包含用户、文章、评论等实体，值对象，作者归属规则以及仓储接口。

pub mod article;
pub mod comment;
pub mod errors;
pub mod repository;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use article::*;
pub use comment::*;
pub use errors::*;
pub use repository::*;
pub use user::*;
pub use value_objects::*;
