//! HTTP 接口层
//!
//! - `services::cloak`: 访客入口
//! - `services::admin`: `/admin/v1` 管理接口
//! - `services::health`: 健康检查

pub mod services;
