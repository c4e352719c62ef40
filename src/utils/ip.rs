//! 客户端 IP 提取
//!
//! 来自私有网段（反向代理）的连接才信任 X-Forwarded-For / X-Real-IP，
//! 公网直连时只使用连接地址，防止伪造。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.parse::<SocketAddr>()
        .map(|s| s.ip())
        .or_else(|_| raw.parse::<IpAddr>())
        .ok()
}

/// 从 HeaderMap 提取转发的 IP（X-Forwarded-For 第一个，其次 X-Real-IP）
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

/// 根据连接地址和转发头选出访客 IP
pub fn resolve_client_ip(peer: Option<&str>, headers: &HeaderMap) -> Option<String> {
    let Some(peer) = peer else {
        return forwarded_ip_from_headers(headers);
    };

    match parse_ip(peer) {
        Some(ip) if is_private_or_local(&ip) => {
            forwarded_ip_from_headers(headers).or_else(|| Some(ip.to_string()))
        }
        Some(ip) => Some(ip.to_string()),
        None => Some(peer.to_string()),
    }
}

pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    let conn_info = req.connection_info();
    resolve_client_ip(conn_info.peer_addr(), req.headers())
}
