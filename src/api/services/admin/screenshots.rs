//! Admin API 落地页截图

use actix_web::{Responder, web};
use tracing::info;

use crate::cloaking::DeviceClass;
use crate::services::AppServices;

use super::helpers::success_response;
use super::types::CaptureRequestBody;

/// 同时截取桌面和移动端
pub async fn capture_both(
    body: web::Json<CaptureRequestBody>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let result = services
        .screenshots
        .capture_both(&body.url, body.page_id.as_deref())
        .await;
    info!(
        "Admin API: screenshots for {} desktop={} mobile={}",
        body.url, result.desktop.success, result.mobile.success
    );
    success_response(result)
}

/// 单独重试某个设备
pub async fn capture_device(
    path: web::Path<DeviceClass>,
    body: web::Json<CaptureRequestBody>,
    services: web::Data<AppServices>,
) -> impl Responder {
    let device = path.into_inner();
    let result = services
        .screenshots
        .capture(&body.url, device, body.page_id.as_deref())
        .await;
    success_response(result)
}
