//! 截图服务边界
//!
//! 输入 `{url, device, pageId?}`，输出 `{success, screenshotUrl?, error?}`。
//! 同一 `(url, device, pageId)` 的请求可以安全重试。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;
use ureq::Agent;

use crate::cloaking::DeviceClass;
use crate::errors::{CloakError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub url: String,
    pub device: DeviceClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResult {
    pub fn captured(screenshot_url: impl Into<String>) -> Self {
        Self {
            success: true,
            screenshot_url: Some(screenshot_url.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            screenshot_url: None,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait CaptureService: Send + Sync {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureResult>;
}

pub struct HttpCaptureService {
    endpoint: String,
    agent: Agent,
}

impl HttpCaptureService {
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
}

#[async_trait]
impl CaptureService for HttpCaptureService {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureResult> {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let body = request.clone();

        let result = tokio::task::spawn_blocking(move || -> Result<CaptureResult> {
            let result = agent
                .post(&endpoint)
                .send_json(&body)?
                .into_body()
                .read_json::<CaptureResult>()?;
            Ok(result)
        })
        .await
        .map_err(|e| CloakError::upstream(format!("capture task failed: {}", e)))??;

        trace!(
            "Capture service: {} ({}) -> success={}",
            request.url, request.device, result.success
        );
        Ok(result)
    }
}
