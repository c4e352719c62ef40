//! Custom domain binding tests
//!
//! Save → verify flow against a scripted control plane.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use pagecloak::domain::{
    DnsCheck, DomainBindingService, DomainControlPlane, DomainRepository, DomainStatus,
    MemoryDomainRepository,
};
use pagecloak::errors::{CloakError, Result};

// =============================================================================
// Test Control Plane
// =============================================================================

#[derive(Default)]
struct FakeControlPlane {
    /// 下一次 DNS 检查的结果；None 表示网络错误
    dns: Mutex<Option<DnsCheck>>,
    upsert_down: Mutex<bool>,
    upserts: Mutex<Vec<(String, String)>>,
}

impl FakeControlPlane {
    fn resolves(&self, verified: bool, ip: &str) {
        *self.dns.lock() = Some(DnsCheck {
            verified,
            resolved_ip: Some(ip.to_string()),
        });
    }
}

#[async_trait]
impl DomainControlPlane for FakeControlPlane {
    async fn upsert_domain(&self, domain: &str, user_id: &str) -> Result<()> {
        if *self.upsert_down.lock() {
            return Err(CloakError::upstream("control plane returned 503"));
        }
        self.upserts
            .lock()
            .push((domain.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn check_dns(&self, _domain: &str) -> Result<DnsCheck> {
        self.dns
            .lock()
            .clone()
            .ok_or_else(|| CloakError::upstream("connection reset"))
    }
}

fn service() -> (
    DomainBindingService,
    Arc<FakeControlPlane>,
    Arc<MemoryDomainRepository>,
) {
    let plane = Arc::new(FakeControlPlane::default());
    let repo = Arc::new(MemoryDomainRepository::new());
    let service = DomainBindingService::new(
        repo.clone(),
        plane.clone(),
        String::from("198.51.100.7"),
        String::from("cloudflare"),
    );
    (service, plane, repo)
}

// =============================================================================
// Save
// =============================================================================

#[tokio::test]
async fn test_save_normalizes_and_goes_pending() {
    let (service, plane, _) = service();
    assert_eq!(service.status("u1").await.unwrap(), DomainStatus::Unset);

    let result = service
        .save_domain("u1", "  HTTPS://Promo.Example.COM/landing?x=1 ")
        .await;
    assert!(result.success);
    assert_eq!(result.status, DomainStatus::Pending);
    assert_eq!(result.domain.as_deref(), Some("promo.example.com"));

    let upserts = plane.upserts.lock().clone();
    assert_eq!(
        upserts,
        vec![("promo.example.com".to_string(), "u1".to_string())]
    );
}

#[tokio::test]
async fn test_save_rejects_invalid_domain_without_side_effects() {
    let (service, plane, repo) = service();

    let result = service.save_domain("u1", "not a domain").await;
    assert!(!result.success);
    assert_eq!(result.status, DomainStatus::Unset);
    assert!(!result.retryable);
    assert!(repo.get("u1").await.unwrap().is_none());
    assert!(plane.upserts.lock().is_empty());
}

#[tokio::test]
async fn test_control_plane_failure_keeps_local_record() {
    let (service, plane, repo) = service();
    *plane.upsert_down.lock() = true;

    let result = service.save_domain("u1", "promo.example.com").await;
    assert!(!result.success);
    assert!(result.retryable);
    assert_eq!(result.status, DomainStatus::Pending);

    let stored = repo.get("u1").await.unwrap().unwrap();
    assert_eq!(stored.domain, "promo.example.com");
    assert_eq!(stored.target_ip, "198.51.100.7");
}

// =============================================================================
// Verify
// =============================================================================

#[tokio::test]
async fn test_verify_without_domain_is_not_found() {
    let (service, _, _) = service();
    let err = service.verify("nobody").await.unwrap_err();
    assert!(matches!(err, CloakError::NotFound(_)));
}

#[tokio::test]
async fn test_dns_mismatch_stays_pending() {
    let (service, plane, _) = service();
    service.save("u1", "promo.example.com").await.unwrap();
    plane.resolves(false, "203.0.113.50");

    let result = service.verify_domain("u1").await;
    assert!(!result.success);
    assert_eq!(result.status, DomainStatus::Pending);
    assert_eq!(
        result.error_code.as_deref(),
        Some(CloakError::dns_mismatch("").code())
    );
    assert!(!result.retryable);
    assert!(result.error.unwrap().contains("203.0.113.50"));
    assert_eq!(service.status("u1").await.unwrap(), DomainStatus::Pending);
}

#[tokio::test]
async fn test_network_error_is_retryable_and_keeps_status() {
    let (service, _, _) = service();
    service.save("u1", "promo.example.com").await.unwrap();

    let result = service.verify_domain("u1").await;
    assert!(!result.success);
    assert!(result.retryable);
    assert_eq!(result.status, DomainStatus::Pending);
}

#[tokio::test]
async fn test_verify_then_resave() {
    let (service, plane, _) = service();
    service.save("u1", "promo.example.com").await.unwrap();
    plane.resolves(true, "198.51.100.7");

    let verified = service.verify("u1").await.unwrap();
    assert_eq!(verified.status, DomainStatus::Verified);
    assert!(verified.verified_at.is_some());

    // 同一个域名再次保存不会撤销验证
    let same = service.save("u1", "PROMO.example.com.").await.unwrap();
    assert_eq!(same.status, DomainStatus::Verified);
    assert_eq!(same.verified_at, verified.verified_at);

    // 换域名需要重新验证
    let changed = service.save("u1", "other.example.com").await.unwrap();
    assert_eq!(changed.status, DomainStatus::Pending);
    assert!(changed.verified_at.is_none());
}

#[tokio::test]
async fn test_mismatch_after_verified_keeps_verified() {
    let (service, plane, _) = service();
    service.save("u1", "promo.example.com").await.unwrap();
    plane.resolves(true, "198.51.100.7");
    service.verify("u1").await.unwrap();

    plane.resolves(false, "203.0.113.50");
    let result = service.verify_domain("u1").await;
    assert!(!result.success);
    assert_eq!(result.status, DomainStatus::Verified);
}
