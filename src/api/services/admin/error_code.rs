//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::CloakError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 页面配置错误
/// - 4000-4099: 域名绑定错误
/// - 5000-5099: 计数错误
/// - 6000-6099: 外部服务错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 页面配置错误 3000-3099
    ConfigNotFound = 3000,
    ConfigConflict = 3001,
    ConfigInvalidField = 3002,

    // 域名绑定错误 4000-4099
    DomainNotSet = 4000,
    DomainDnsMismatch = 4001,
    DomainInvalid = 4002,

    // 计数错误 5000-5099
    StatsUnavailable = 5000,

    // 外部服务错误 6000-6099
    UpstreamUnavailable = 6000,
    ClassifierUnavailable = 6001,
}

impl From<&CloakError> for ErrorCode {
    fn from(err: &CloakError) -> Self {
        match err {
            CloakError::Validation(_) => ErrorCode::BadRequest,
            CloakError::FieldValidation(field) if field.field == "domain" => {
                ErrorCode::DomainInvalid
            }
            CloakError::FieldValidation(_) => ErrorCode::ConfigInvalidField,
            CloakError::NotFound(_) => ErrorCode::NotFound,
            CloakError::Conflict(_) => ErrorCode::ConfigConflict,
            CloakError::Storage(_) => ErrorCode::ServiceUnavailable,
            CloakError::Upstream(_) => ErrorCode::UpstreamUnavailable,
            CloakError::DnsMismatch(_) => ErrorCode::DomainDnsMismatch,
            CloakError::ClassifierUnavailable(_) => ErrorCode::ClassifierUnavailable,
            CloakError::Serialization(_) | CloakError::Config(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}
