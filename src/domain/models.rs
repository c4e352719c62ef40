use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// 自定义域名的绑定状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DomainStatus {
    #[default]
    Unset,
    Pending,
    Verified,
}

/// 驱动状态迁移的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    /// 保存域名；`changed` 表示与已保存的域名不同
    Saved { changed: bool },
    /// DNS 已指向预期地址
    DnsVerified,
    /// DNS 可以解析，但没有指向预期地址
    DnsMismatch,
}

impl DomainStatus {
    /// 状态迁移表
    ///
    /// 已验证的绑定只有在域名改变时才回到 Pending；
    /// 复查时的不匹配不会撤销已有的验证结果。
    pub fn on(self, event: DomainEvent) -> DomainStatus {
        use DomainEvent::*;
        use DomainStatus::*;

        match (self, event) {
            (Unset, Saved { .. }) => Pending,
            (Pending, Saved { .. }) => Pending,
            (Verified, Saved { changed: true }) => Pending,
            (Verified, Saved { changed: false }) => Verified,

            (Unset, DnsVerified) => Unset,
            (Pending, DnsVerified) => Verified,
            (Verified, DnsVerified) => Verified,

            (status, DnsMismatch) => status,
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// 用户的自定义域名绑定（每个用户一条）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainBinding {
    pub user_id: String,
    pub domain: String,
    pub status: DomainStatus,
    pub provider: String,
    pub target_ip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

/// 控制面 DNS 检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsCheck {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_ip: Option<String>,
}

/// 保存 / 验证操作的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOpResult {
    pub success: bool,
    pub status: DomainStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 稳定的错误码（`CloakError::code`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// 调用方能否原样重试；DNS 不匹配时为 false
    #[serde(default)]
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_save_transitions() {
        assert_eq!(
            DomainStatus::Unset.on(DomainEvent::Saved { changed: true }),
            DomainStatus::Pending
        );
        assert_eq!(
            DomainStatus::Verified.on(DomainEvent::Saved { changed: true }),
            DomainStatus::Pending
        );
        assert_eq!(
            DomainStatus::Verified.on(DomainEvent::Saved { changed: false }),
            DomainStatus::Verified
        );
    }

    #[test]
    fn test_mismatch_never_verifies() {
        for status in DomainStatus::iter() {
            let next = status.on(DomainEvent::DnsMismatch);
            assert_eq!(next, status);
            if status != DomainStatus::Verified {
                assert_ne!(next, DomainStatus::Verified);
            }
        }
    }

    #[test]
    fn test_verification_requires_binding() {
        assert_eq!(
            DomainStatus::Unset.on(DomainEvent::DnsVerified),
            DomainStatus::Unset
        );
        assert_eq!(
            DomainStatus::Pending.on(DomainEvent::DnsVerified),
            DomainStatus::Verified
        );
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&DomainStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(DomainStatus::Verified.to_string(), "verified");
    }
}
