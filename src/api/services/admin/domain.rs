//! Admin API 自定义域名

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::info;

use crate::domain::DomainBinding;
use crate::errors::Result;
use crate::services::AppServices;

use super::error_code::ErrorCode;
use super::helpers::{api_result, json_response};
use super::types::{DomainResponse, SaveDomainRequest, UserQuery, VerifyDomainRequest};

pub async fn get_domain(
    query: web::Query<UserQuery>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let result = services
        .domains
        .get_binding(&query.user_id)
        .await
        .map(|binding| DomainResponse {
            status: binding.as_ref().map(|b| b.status).unwrap_or_default(),
            expected_ip: services.domains.expected_ip().to_string(),
            binding,
        });
    api_result(result)
}

pub async fn save_domain(
    body: web::Json<SaveDomainRequest>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let result = services.domains.save(&body.user_id, &body.domain).await;
    if let Ok(binding) = &result {
        info!("Admin API: domain {} saved ({})", binding.domain, binding.status);
    }
    domain_op_response(&services, &body.user_id, result).await
}

pub async fn verify_domain(
    body: web::Json<VerifyDomainRequest>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let result = services.domains.verify(&body.user_id).await;
    domain_op_response(&services, &body.user_id, result).await
}

/// 失败时 data 里仍然带当前状态，前端据此展示
async fn domain_op_response(
    services: &AppServices,
    user_id: &str,
    result: Result<DomainBinding>,
) -> HttpResponse {
    let (status, code, message) = match &result {
        Ok(_) => (StatusCode::OK, ErrorCode::Success, "OK".to_string()),
        Err(e) => (e.http_status(), ErrorCode::from(e), e.message().to_string()),
    };
    let op = services.domains.op_result(user_id, result).await;
    json_response(status, code, message, Some(op))
}
