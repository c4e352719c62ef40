//! 用户输入的域名规范化

use url::Host;

use crate::errors::FieldError;

const MAX_DOMAIN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// 规范化用户输入的域名
///
/// 去掉首尾空白、协议、路径、端口和末尾的点，并转为小写。
/// 必须是至少两段的主机名，不接受 IP 地址。
pub fn normalize_domain(raw: &str) -> Result<String, FieldError> {
    let mut value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(FieldError::new("domain", "is required"));
    }

    for scheme in ["https://", "http://"] {
        if let Some(rest) = value.strip_prefix(scheme) {
            value = rest.to_string();
            break;
        }
    }

    let host = value
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // 不带方括号的 IPv6 里有多个冒号，交给后面的 IP 检查
    let host = match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    };
    let host = host.trim_end_matches('.');

    if host.is_empty() {
        return Err(FieldError::new("domain", "is required"));
    }
    if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
        return Err(FieldError::new("domain", "IP addresses are not allowed"));
    }

    let ascii = match Host::parse(host) {
        Ok(Host::Domain(domain)) => domain,
        Ok(Host::Ipv4(_)) | Ok(Host::Ipv6(_)) => {
            return Err(FieldError::new("domain", "IP addresses are not allowed"));
        }
        Err(e) => return Err(FieldError::new("domain", format!("invalid host name: {}", e))),
    };

    if ascii.len() > MAX_DOMAIN_LENGTH {
        return Err(FieldError::new("domain", "is too long"));
    }

    let labels: Vec<&str> = ascii.split('.').collect();
    if labels.len() < 2 {
        return Err(FieldError::new(
            "domain",
            "must include a top-level domain (e.g. pages.example.com)",
        ));
    }
    for label in &labels {
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if !valid {
            return Err(FieldError::new(
                "domain",
                format!("invalid label '{}'", label),
            ));
        }
    }

    Ok(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scheme_path_and_dot() {
        assert_eq!(
            normalize_domain("  HTTPS://Pages.Example.com./landing?x=1 ").unwrap(),
            "pages.example.com"
        );
        assert_eq!(
            normalize_domain("pages.example.com:8443").unwrap(),
            "pages.example.com"
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("localhost").is_err());
        assert!(normalize_domain("203.0.113.7").is_err());
        assert!(normalize_domain("[2001:db8::1]").is_err());
        assert!(normalize_domain("-bad.example.com").is_err());
        assert!(normalize_domain("under_score.example.com").is_err());
        assert!(normalize_domain("a..example.com").is_err());
    }

    #[test]
    fn test_error_names_the_field() {
        assert_eq!(normalize_domain("").unwrap_err().field, "domain");
    }
}
