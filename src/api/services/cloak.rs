//! 访客入口 `GET|HEAD /{key}`
//!
//! 查找配置 → 识别机器人（失败放行）→ 决策 → 执行。

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{error, trace};

use crate::cloaking::{VisitorRequest, classify_or_fail_open, evaluate};
use crate::services::AppServices;
use crate::utils::{device_class_from_user_agent, extract_client_ip, is_valid_page_key};

pub struct CloakService;

impl CloakService {
    pub async fn handle_visit(
        req: HttpRequest,
        path: web::Path<String>,
        services: web::Data<AppServices>,
    ) -> impl Responder {
        let key = path.into_inner();

        if !is_valid_page_key(&key) {
            trace!("Invalid page key rejected: {}", key);
            return Self::not_found_response();
        }

        let config = match services.configs.resolve(&key).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                trace!("No cloaking config for key: {}", key);
                return Self::not_found_response();
            }
            Err(e) => {
                error!("Config lookup for {} failed: {}", key, e);
                return Self::error_response();
            }
        };

        let visitor = Self::visitor_from_request(&req);
        let signal = classify_or_fail_open(
            services.classifier.as_ref(),
            &visitor,
            services.classifier_timeout,
        )
        .await;

        let decision = evaluate(&config, &visitor, &signal);
        services.executor.execute(&config.id, decision)
    }

    /// 只提取原始字段，不做任何识别
    fn visitor_from_request(req: &HttpRequest) -> VisitorRequest {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        let user_agent = header("user-agent").unwrap_or_default();
        let device = device_class_from_user_agent(&user_agent);

        VisitorRequest::new(device, user_agent)
            .with_ip(extract_client_ip(req))
            .with_referrer(header("referer"))
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }
}

/// 访客路由（必须最后注册，避免吞掉其他前缀）
pub fn cloak_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{key}", web::get().to(CloakService::handle_visit))
        .route("/{key}", web::head().to(CloakService::handle_visit))
}
