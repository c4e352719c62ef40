//! 机器人识别服务边界
//!
//! 识别逻辑在外部服务中，这里只负责调用和降级：
//! 任何失败（网络、超时、解析）都按真人放行并记录日志。

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{trace, warn};
use ureq::Agent;

use super::models::{BotSignal, DeviceClass, VisitorRequest};
use crate::errors::{CloakError, Result};

#[async_trait]
pub trait BotClassifier: Send + Sync {
    async fn classify(&self, request: &VisitorRequest) -> Result<BotSignal>;
}

/// 发给识别服务的请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest {
    user_agent: String,
    ip: Option<String>,
    referrer: Option<String>,
    device: DeviceClass,
    timestamp: i64,
}

impl From<&VisitorRequest> for ClassifyRequest {
    fn from(request: &VisitorRequest) -> Self {
        Self {
            user_agent: request.user_agent.clone(),
            ip: request.ip.clone(),
            referrer: request.referrer.clone(),
            device: request.device,
            timestamp: request.timestamp.timestamp_millis(),
        }
    }
}

/// HTTP 识别服务：`POST {endpoint}`，返回 `BotSignal` JSON
pub struct HttpClassifier {
    endpoint: String,
    agent: Agent,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn classify_sync(agent: &Agent, endpoint: &str, body: &ClassifyRequest) -> Result<BotSignal> {
        let signal = agent
            .post(endpoint)
            .send_json(body)?
            .into_body()
            .read_json::<BotSignal>()?;
        trace!(
            "Classifier verdict: is_bot={}, known={}, dc={}",
            signal.is_bot, signal.is_known_bot, signal.is_data_center_ip
        );
        Ok(signal)
    }
}

#[async_trait]
impl BotClassifier for HttpClassifier {
    async fn classify(&self, request: &VisitorRequest) -> Result<BotSignal> {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let body = ClassifyRequest::from(request);

        tokio::task::spawn_blocking(move || Self::classify_sync(&agent, &endpoint, &body))
            .await
            .map_err(|e| {
                CloakError::classifier_unavailable(format!("classifier task failed: {}", e))
            })?
    }
}

/// 未配置识别服务时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClassifier;

#[async_trait]
impl BotClassifier for DisabledClassifier {
    async fn classify(&self, _request: &VisitorRequest) -> Result<BotSignal> {
        Err(CloakError::classifier_unavailable(
            "no classifier endpoint configured",
        ))
    }
}

/// 调用识别服务，失败或超时时按真人处理
pub async fn classify_or_fail_open(
    classifier: &dyn BotClassifier,
    request: &VisitorRequest,
    timeout: Duration,
) -> BotSignal {
    match tokio::time::timeout(timeout, classifier.classify(request)).await {
        Ok(Ok(signal)) => signal,
        Ok(Err(e)) => {
            warn!("Bot classifier unavailable, failing open: {}", e);
            BotSignal::fail_open(e.to_string())
        }
        Err(_) => {
            warn!(
                "Bot classifier timed out after {}ms, failing open",
                timeout.as_millis()
            );
            BotSignal::fail_open("classifier timeout")
        }
    }
}
