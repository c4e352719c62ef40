use std::fmt;

use actix_web::http::StatusCode;

/// 字段级校验错误（保存配置时同步返回）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new<T: Into<String>>(field: &'static str, message: T) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone)]
pub enum CloakError {
    Validation(String),
    FieldValidation(FieldError),
    NotFound(String),
    Conflict(String),
    Storage(String),
    Upstream(String),
    DnsMismatch(String),
    ClassifierUnavailable(String),
    Serialization(String),
    Config(String),
}

impl CloakError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            CloakError::Validation(_) => "E001",
            CloakError::FieldValidation(_) => "E002",
            CloakError::NotFound(_) => "E003",
            CloakError::Conflict(_) => "E004",
            CloakError::Storage(_) => "E005",
            CloakError::Upstream(_) => "E006",
            CloakError::DnsMismatch(_) => "E007",
            CloakError::ClassifierUnavailable(_) => "E008",
            CloakError::Serialization(_) => "E009",
            CloakError::Config(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            CloakError::Validation(_) => "Validation Error",
            CloakError::FieldValidation(_) => "Field Validation Error",
            CloakError::NotFound(_) => "Resource Not Found",
            CloakError::Conflict(_) => "Conflict",
            CloakError::Storage(_) => "Storage Error",
            CloakError::Upstream(_) => "Upstream Service Error",
            CloakError::DnsMismatch(_) => "DNS Mismatch",
            CloakError::ClassifierUnavailable(_) => "Classifier Unavailable",
            CloakError::Serialization(_) => "Serialization Error",
            CloakError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            CloakError::Validation(msg) => msg,
            CloakError::FieldValidation(err) => &err.message,
            CloakError::NotFound(msg) => msg,
            CloakError::Conflict(msg) => msg,
            CloakError::Storage(msg) => msg,
            CloakError::Upstream(msg) => msg,
            CloakError::DnsMismatch(msg) => msg,
            CloakError::ClassifierUnavailable(msg) => msg,
            CloakError::Serialization(msg) => msg,
            CloakError::Config(msg) => msg,
        }
    }

    /// 出错的字段（仅字段校验错误）
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CloakError::FieldValidation(err) => Some(err.field),
            _ => None,
        }
    }

    /// 调用方是否可以原样重试
    ///
    /// DNS 不匹配需要用户先修正解析记录，不属于可重试错误。
    pub fn is_retryable(&self) -> bool {
        matches!(self, CloakError::Upstream(_) | CloakError::Storage(_))
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            CloakError::Validation(_) | CloakError::FieldValidation(_) => StatusCode::BAD_REQUEST,
            CloakError::NotFound(_) => StatusCode::NOT_FOUND,
            CloakError::Conflict(_) => StatusCode::CONFLICT,
            CloakError::DnsMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CloakError::Upstream(_) | CloakError::ClassifierUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            CloakError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            CloakError::Serialization(_) | CloakError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        match self {
            CloakError::FieldValidation(err) => format!("{}: {}", self.error_type(), err),
            _ => format!("{}: {}", self.error_type(), self.message()),
        }
    }
}

impl fmt::Display for CloakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CloakError {}

// 便捷的构造函数
impl CloakError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        CloakError::Validation(msg.into())
    }

    pub fn invalid_field<T: Into<String>>(field: &'static str, msg: T) -> Self {
        CloakError::FieldValidation(FieldError::new(field, msg))
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        CloakError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        CloakError::Conflict(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        CloakError::Storage(msg.into())
    }

    pub fn upstream<T: Into<String>>(msg: T) -> Self {
        CloakError::Upstream(msg.into())
    }

    pub fn dns_mismatch<T: Into<String>>(msg: T) -> Self {
        CloakError::DnsMismatch(msg.into())
    }

    pub fn classifier_unavailable<T: Into<String>>(msg: T) -> Self {
        CloakError::ClassifierUnavailable(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        CloakError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        CloakError::Config(msg.into())
    }
}

impl From<FieldError> for CloakError {
    fn from(err: FieldError) -> Self {
        CloakError::FieldValidation(err)
    }
}

impl From<serde_json::Error> for CloakError {
    fn from(err: serde_json::Error) -> Self {
        CloakError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CloakError {
    fn from(err: std::io::Error) -> Self {
        CloakError::Storage(err.to_string())
    }
}

impl From<ureq::Error> for CloakError {
    fn from(err: ureq::Error) -> Self {
        CloakError::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloakError>;
