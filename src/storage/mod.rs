//! 页面配置存储
//!
//! - `repository`: 持久化边界（按 id / slug / shortId 唯一）
//! - `config_store`: 校验 + 缓存 + 失效的服务层

pub mod config_store;
pub mod models;
pub mod repository;

pub use config_store::{ConfigStore, SHORT_ID_LENGTH};
pub use models::{ConfigPatch, NewCloakingConfig};
pub use repository::{ConfigRepository, MemoryConfigRepository};
