//! Admin API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::CloakError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建创建成功响应
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 CloakError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 字段校验错误的 message 带字段名，方便前端定位。
pub fn error_from_cloak(err: &CloakError) -> HttpResponse {
    let status = err.http_status();
    let error_code = ErrorCode::from(err);
    match err {
        CloakError::FieldValidation(field) => {
            error_response(status, error_code, &field.to_string())
        }
        _ => error_response(status, error_code, err.message()),
    }
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 CloakError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<CloakError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: CloakError = e.into();
            error_from_cloak(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("success_data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_from_cloak_maps_status() {
        let response = error_from_cloak(&CloakError::not_found("missing"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_from_cloak(&CloakError::invalid_field("redirectUrl", "is required"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_from_cloak(&CloakError::conflict("slug taken"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_api_result() {
        let ok: Result<u32, CloakError> = Ok(1);
        assert_eq!(api_result(ok).status(), StatusCode::OK);

        let err: Result<u32, CloakError> = Err(CloakError::upstream("down"));
        assert_eq!(api_result(err).status(), StatusCode::BAD_GATEWAY);
    }
}
