//! Admin API 类型定义

use serde::{Deserialize, Serialize};

use crate::analytics::StatsCounters;
use crate::domain::{DomainBinding, DomainStatus};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 列表查询参数
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListConfigsQuery {
    pub user_id: String,
}

/// 带用户标识的请求（认证不在本服务范围内，由调用方传入）
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SaveDomainRequest {
    pub user_id: String,
    pub domain: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDomainRequest {
    pub user_id: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequestBody {
    pub url: String,
    #[serde(default)]
    pub page_id: Option<String>,
}

/// 页面计数 + 刷新状态
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub page_id: String,
    #[serde(flatten)]
    pub counters: StatsCounters,
    pub refreshing: bool,
}

/// 非阻塞刷新的结果
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTriggerResponse {
    pub page_id: String,
    /// false 表示已有刷新在进行，本次被忽略
    pub started: bool,
}

/// 域名绑定视图；没有记录时 status 为 unset
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DomainResponse {
    pub status: DomainStatus,
    pub expected_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<DomainBinding>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub pending_outcomes: usize,
    pub response_time_ms: u32,
}
