//! 跳转地址校验
//!
//! 只接受带主机名的 http(s) 地址，脚本类协议一律拒绝。

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    DangerousProtocol(String),
    InvalidProtocol(String),
    MissingHost,
    ControlCharacter,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::DangerousProtocol(proto) => write!(f, "protocol {} is not allowed", proto),
            Self::InvalidProtocol(proto) => {
                write!(f, "protocol {} is not supported, use http:// or https://", proto)
            }
            Self::MissingHost => write!(f, "URL must contain a host"),
            Self::ControlCharacter => write!(f, "URL must not contain control characters"),
            Self::InvalidFormat(msg) => write!(f, "invalid URL: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

const DANGEROUS_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }
    // Url::parse 会静默丢弃制表符和换行，原串却会原样存下来
    if raw.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }

    // 先按冒号前缀判断协议，`javascript:alert(1)` 这类地址 Url::parse 也能解析成功
    if let Some((scheme, _)) = raw.split_once(':') {
        let scheme = scheme.to_ascii_lowercase();
        if DANGEROUS_SCHEMES.contains(&scheme.as_str()) {
            return Err(UrlValidationError::DangerousProtocol(format!("{}:", scheme)));
        }
    }

    let url = Url::parse(raw).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}
