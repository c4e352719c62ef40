//! pagecloak - 落地页伪装路由服务
//!
//! 每个访客请求都会经过分类、决策、执行三步：拿到落地页配置，询问外部
//! 机器人分类器，根据配置决定展示伪装页、跳转真实地址或直接拦截，并把
//! 结果计入每个页面的统计。
//!
//! # Architecture
//! - `cloaking`: 决策引擎、分类器、伪装页模板、执行器
//! - `storage`: 落地页配置的仓储与缓存
//! - `analytics`: 结果计数的缓冲聚合与刷新合并
//! - `domain`: 自定义域名绑定与 DNS 校验
//! - `screenshot`: 桌面/移动端截图编排
//! - `api`: HTTP 接口（访客入口、管理接口、健康检查）
//! - `services`: 服务装配
//! - `config`: 配置加载
//! - `runtime`: 启动、关闭与服务器模式
//! - `system`: 日志与 panic 钩子

pub mod analytics;
pub mod api;
pub mod cloaking;
pub mod config;
pub mod domain;
pub mod errors;
pub mod runtime;
pub mod screenshot;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
