//! Admin API 页面计数

use actix_web::{Responder, web};
use serde::Deserialize;
use tracing::trace;

use crate::services::AppServices;

use super::helpers::{api_result, error_from_cloak, success_response};
use super::types::{RefreshTriggerResponse, StatsResponse};

#[derive(Deserialize, Debug, Default)]
pub struct RefreshQuery {
    /// false 时只触发刷新，不等待结果
    #[serde(default)]
    pub wait: Option<bool>,
}

pub async fn get_stats(
    path: web::Path<String>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let page_id = path.into_inner();
    if let Err(e) = services.configs.get(&page_id).await {
        return error_from_cloak(&e);
    }
    let result = services.stats.get_stats(&page_id).await.map(|counters| StatsResponse {
        refreshing: services.refresher.is_busy(&page_id),
        page_id,
        counters,
    });
    api_result(result)
}

/// 刷新计数；并发请求共享同一次读取
pub async fn refresh_stats(
    path: web::Path<String>,
    query: web::Query<RefreshQuery>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let page_id = path.into_inner();
    // 只为存在的页面建立计数和刷新状态
    if let Err(e) = services.configs.get(&page_id).await {
        return error_from_cloak(&e);
    }

    if query.wait == Some(false) {
        let started = services.refresher.trigger(&page_id);
        trace!("Admin API: stats refresh trigger for {} started={}", page_id, started);
        return success_response(RefreshTriggerResponse { page_id, started });
    }

    let result = services
        .refresher
        .refresh(&page_id)
        .await
        .map(|counters| StatsResponse {
            page_id,
            counters,
            refreshing: false,
        });
    api_result(result)
}
