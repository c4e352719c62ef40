//! Admin API 路由配置
//!
//! 将 /v1 下的路由按功能模块拆分。

use actix_web::web;

use super::configs::{create_config, delete_config, get_config, list_configs, update_config};
use super::domain::{get_domain, save_domain, verify_domain};
use super::screenshots::{capture_both, capture_device};
use super::stats::{get_stats, refresh_stats};

/// 页面配置路由 `/configs`
///
/// 包含：
/// - GET /configs?userId= - 列出用户的配置
/// - POST /configs - 创建配置
/// - GET/PATCH/PUT/DELETE /configs/{id} - 单个配置
/// - GET /configs/{id}/stats - 读取计数
/// - POST /configs/{id}/stats/refresh - 刷新计数（`?wait=false` 只触发）
pub fn configs_routes() -> actix_web::Scope {
    web::scope("/configs")
        .route("", web::get().to(list_configs))
        .route("", web::post().to(create_config))
        .route("/{id}/stats", web::get().to(get_stats))
        .route("/{id}/stats/refresh", web::post().to(refresh_stats))
        .route("/{id}", web::get().to(get_config))
        .route("/{id}", web::patch().to(update_config))
        .route("/{id}", web::put().to(update_config))
        .route("/{id}", web::delete().to(delete_config))
}

/// 自定义域名路由 `/domain`
pub fn domain_routes() -> actix_web::Scope {
    web::scope("/domain")
        .route("", web::get().to(get_domain))
        .route("", web::put().to(save_domain))
        .route("/verify", web::post().to(verify_domain))
}

/// 截图路由 `/screenshots`
pub fn screenshot_routes() -> actix_web::Scope {
    web::scope("/screenshots")
        .route("", web::post().to(capture_both))
        .route("/{device}", web::post().to(capture_device))
}

/// `/v1` 下的全部管理路由
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .service(configs_routes())
        .service(domain_routes())
        .service(screenshot_routes())
}

/// 完整的 `/admin` 作用域
pub fn admin_routes() -> actix_web::Scope {
    web::scope("/admin").service(admin_v1_routes())
}
