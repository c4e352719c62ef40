//! Admin API 服务模块
//!
//! 该模块包含管理 API 的所有端点：
//! - 页面配置 CRUD
//! - 计数读取与刷新
//! - 自定义域名保存与验证
//! - 落地页截图

mod configs;
mod domain;
pub mod error_code;
mod helpers;
pub mod routes;
mod screenshots;
mod stats;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, created_response, error_from_cloak, error_response, json_response,
    success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;

pub use routes::{admin_routes, admin_v1_routes};
