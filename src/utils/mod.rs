pub mod device;
pub mod ip;
pub mod url_validator;

pub use device::device_class_from_user_agent;
pub use ip::extract_client_ip;
pub use url_validator::validate_url;

/// slug / shortId 允许的最大长度
pub const MAX_KEY_LENGTH: usize = 64;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 检查 slug / shortId 是否合法：`[A-Za-z0-9_-]`，1..=64 个字符
#[inline]
pub fn is_valid_page_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// 把空白字符串视为缺省
#[inline]
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
