//! Admin API 页面配置 CRUD

use actix_web::{Responder, web};
use tracing::{info, trace};

use crate::services::AppServices;
use crate::storage::{ConfigPatch, NewCloakingConfig};

use super::helpers::{api_result, created_response, error_from_cloak};
use super::types::ListConfigsQuery;

/// 列出某个用户的全部配置（按创建时间倒序）
pub async fn list_configs(
    query: web::Query<ListConfigsQuery>,
    services: web::Data<AppServices>,
) -> impl Responder {
    trace!("Admin API: list configs for user {}", query.user_id);
    api_result(services.configs.list_by_user(&query.user_id).await)
}

pub async fn create_config(
    body: web::Json<NewCloakingConfig>,
    services: web::Data<AppServices>,
) -> impl Responder {
    match services.configs.create(body.into_inner()).await {
        Ok(config) => {
            info!("Admin API: created config {} ({})", config.id, config.slug);
            created_response(config)
        }
        Err(e) => error_from_cloak(&e),
    }
}

pub async fn get_config(
    path: web::Path<String>,
    services: web::Data<AppServices>,
) -> impl Responder {
    api_result(services.configs.get(&path.into_inner()).await)
}

pub async fn update_config(
    path: web::Path<String>,
    body: web::Json<ConfigPatch>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let id = path.into_inner();
    trace!("Admin API: update config {}", id);
    api_result(services.configs.update(&id, body.into_inner()).await)
}

pub async fn delete_config(
    path: web::Path<String>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let id = path.into_inner();
    let result = services.configs.delete(&id).await.map(|()| {
        services.stats.forget(&id);
        services.refresher.forget(&id);
        info!("Admin API: deleted config {}", id);
        serde_json::json!({ "id": id })
    });
    api_result(result)
}
