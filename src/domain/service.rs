//! 自定义域名绑定服务
//!
//! 保存时先写本地记录再通知控制面：中途失败只会留下一条可恢复的 Pending 记录。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::control_plane::DomainControlPlane;
use super::models::{DomainBinding, DomainEvent, DomainOpResult, DomainStatus};
use super::normalize::normalize_domain;
use super::repository::DomainRepository;
use crate::errors::{CloakError, Result};

pub struct DomainBindingService {
    repository: Arc<dyn DomainRepository>,
    control_plane: Arc<dyn DomainControlPlane>,
    expected_ip: String,
    provider: String,
}

impl DomainBindingService {
    pub fn new(
        repository: Arc<dyn DomainRepository>,
        control_plane: Arc<dyn DomainControlPlane>,
        expected_ip: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            control_plane,
            expected_ip: expected_ip.into(),
            provider: provider.into(),
        }
    }

    pub fn expected_ip(&self) -> &str {
        &self.expected_ip
    }

    pub async fn get_binding(&self, user_id: &str) -> Result<Option<DomainBinding>> {
        self.repository.get(user_id).await
    }

    /// 没有绑定记录时为 `Unset`
    pub async fn status(&self, user_id: &str) -> Result<DomainStatus> {
        Ok(self
            .repository
            .get(user_id)
            .await?
            .map(|b| b.status)
            .unwrap_or_default())
    }

    /// 保存域名：校验 → 写本地记录 → 通知控制面
    pub async fn save(&self, user_id: &str, raw_domain: &str) -> Result<DomainBinding> {
        let domain = normalize_domain(raw_domain)?;
        let now = Utc::now();

        let binding = match self.repository.get(user_id).await? {
            Some(existing) => {
                let changed = existing.domain != domain;
                let status = existing.status.on(DomainEvent::Saved { changed });
                DomainBinding {
                    domain: domain.clone(),
                    status,
                    provider: self.provider.clone(),
                    target_ip: self.expected_ip.clone(),
                    updated_at: now,
                    verified_at: if status == DomainStatus::Verified {
                        existing.verified_at
                    } else {
                        None
                    },
                    ..existing
                }
            }
            None => DomainBinding {
                user_id: user_id.to_string(),
                domain: domain.clone(),
                status: DomainStatus::Unset.on(DomainEvent::Saved { changed: true }),
                provider: self.provider.clone(),
                target_ip: self.expected_ip.clone(),
                created_at: now,
                updated_at: now,
                verified_at: None,
            },
        };

        self.repository.save(binding.clone()).await?;
        debug!(
            "DomainBinding: stored {} for user {} as {}",
            domain, user_id, binding.status
        );

        self.control_plane
            .upsert_domain(&domain, user_id)
            .await
            .inspect_err(|e| {
                warn!(
                    "DomainBinding: control plane upsert for {} failed, record kept as {}: {}",
                    domain, binding.status, e
                );
            })?;

        info!("DomainBinding: saved {} for user {}", domain, user_id);
        Ok(binding)
    }

    /// 验证 DNS：网络错误可重试，解析不符返回 `DnsMismatch`
    pub async fn verify(&self, user_id: &str) -> Result<DomainBinding> {
        let mut binding = self
            .repository
            .get(user_id)
            .await?
            .ok_or_else(|| CloakError::not_found("no custom domain has been saved"))?;

        let check = self.control_plane.check_dns(&binding.domain).await?;
        if !check.verified {
            binding.status = binding.status.on(DomainEvent::DnsMismatch);
            let resolved = check
                .resolved_ip
                .map(|ip| format!(" (currently {})", ip))
                .unwrap_or_default();
            debug!(
                "DomainBinding: {} does not point to {} yet{}",
                binding.domain, self.expected_ip, resolved
            );
            return Err(CloakError::dns_mismatch(format!(
                "DNS for {} is not yet pointing to {}{}",
                binding.domain, self.expected_ip, resolved
            )));
        }

        let now = Utc::now();
        binding.status = binding.status.on(DomainEvent::DnsVerified);
        binding.updated_at = now;
        binding.verified_at = Some(now);
        self.repository.save(binding.clone()).await?;
        info!(
            "DomainBinding: {} verified for user {}",
            binding.domain, user_id
        );
        Ok(binding)
    }

    pub async fn save_domain(&self, user_id: &str, raw_domain: &str) -> DomainOpResult {
        let result = self.save(user_id, raw_domain).await;
        self.op_result(user_id, result).await
    }

    pub async fn verify_domain(&self, user_id: &str) -> DomainOpResult {
        let result = self.verify(user_id).await;
        self.op_result(user_id, result).await
    }

    /// 把操作结果转成对外的结果结构，失败时附带当前状态
    pub async fn op_result(&self, user_id: &str, result: Result<DomainBinding>) -> DomainOpResult {
        match result {
            Ok(binding) => DomainOpResult {
                success: true,
                status: binding.status,
                domain: Some(binding.domain),
                error: None,
                error_code: None,
                retryable: false,
            },
            Err(e) => {
                let current = self.repository.get(user_id).await.ok().flatten();
                DomainOpResult {
                    success: false,
                    status: current.as_ref().map(|b| b.status).unwrap_or_default(),
                    domain: current.map(|b| b.domain),
                    error: Some(e.message().to_string()),
                    error_code: Some(e.code().to_string()),
                    retryable: e.is_retryable(),
                }
            }
        }
    }
}
