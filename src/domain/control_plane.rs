//! 路由控制面边界
//!
//! `POST /domain {domain, userId}`：幂等写入映射
//! `POST /check-dns {domain}` → `{verified}`：检查域名是否指向固定地址

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, trace};
use ureq::Agent;

use super::models::DnsCheck;
use crate::errors::{CloakError, Result};

#[async_trait]
pub trait DomainControlPlane: Send + Sync {
    async fn upsert_domain(&self, domain: &str, user_id: &str) -> Result<()>;

    /// 网络错误返回 `Upstream`；解析结果不符时返回 `verified = false`
    async fn check_dns(&self, domain: &str) -> Result<DnsCheck>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertDomainBody {
    domain: String,
    user_id: String,
}

#[derive(Serialize)]
struct CheckDnsBody {
    domain: String,
}

pub struct HttpControlPlane {
    base_url: String,
    agent: Agent,
}

impl HttpControlPlane {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 在阻塞线程池中执行同步请求
    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Agent) -> Result<T> + Send + 'static,
    {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || f(agent))
            .await
            .map_err(|e| CloakError::upstream(format!("control plane task failed: {}", e)))?
    }
}

#[async_trait]
impl DomainControlPlane for HttpControlPlane {
    async fn upsert_domain(&self, domain: &str, user_id: &str) -> Result<()> {
        let url = self.endpoint("/domain");
        let body = UpsertDomainBody {
            domain: domain.to_string(),
            user_id: user_id.to_string(),
        };
        debug!("Control plane: upserting {} for user {}", domain, user_id);

        self.run_blocking(move |agent| {
            agent.post(&url).send_json(&body)?;
            Ok(())
        })
        .await
    }

    async fn check_dns(&self, domain: &str) -> Result<DnsCheck> {
        let url = self.endpoint("/check-dns");
        let body = CheckDnsBody {
            domain: domain.to_string(),
        };

        let check = self
            .run_blocking(move |agent| {
                let check = agent
                    .post(&url)
                    .send_json(&body)?
                    .into_body()
                    .read_json::<DnsCheck>()?;
                Ok(check)
            })
            .await?;
        trace!("Control plane: check-dns {} -> {:?}", domain, check);
        Ok(check)
    }
}
