use actix_web::{HttpResponse, Responder, web};
use std::time::Instant;
use tracing::trace;

use crate::api::services::admin::{ErrorCode, HealthResponse, json_response};
use crate::services::AppServices;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        services: web::Data<AppServices>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        let health = HealthResponse {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            pending_outcomes: services.stats.pending(),
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        json_response(
            actix_web::http::StatusCode::OK,
            ErrorCode::Success,
            "OK",
            Some(health),
        )
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
