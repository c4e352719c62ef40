//! 桌面 / 移动端成对截图
//!
//! 两个请求并发执行，互不取消；各自的失败只体现在各自的结果里。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::service::{CaptureRequest, CaptureResult, CaptureService};
use crate::cloaking::DeviceClass;
use crate::utils::validate_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedCaptureResult {
    pub desktop: CaptureResult,
    pub mobile: CaptureResult,
    pub all_success: bool,
}

pub struct ScreenshotOrchestrator {
    service: Arc<dyn CaptureService>,
    /// 单个设备截图的超时
    timeout: Duration,
}

impl ScreenshotOrchestrator {
    pub fn new(service: Arc<dyn CaptureService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// 单设备截图；错误和超时都转成 `success = false`
    pub async fn capture(
        &self,
        url: &str,
        device: DeviceClass,
        page_id: Option<&str>,
    ) -> CaptureResult {
        if let Err(e) = validate_url(url) {
            return CaptureResult::failed(format!("invalid url: {}", e));
        }

        let request = CaptureRequest {
            url: url.trim().to_string(),
            device,
            page_id: page_id.map(String::from),
        };

        match tokio::time::timeout(self.timeout, self.service.capture(&request)).await {
            Ok(Ok(result)) => {
                if !result.success {
                    debug!(
                        "Screenshot {} for {} reported failure: {:?}",
                        device, request.url, result.error
                    );
                }
                result
            }
            Ok(Err(e)) => {
                warn!("Screenshot {} for {} failed: {}", device, request.url, e);
                CaptureResult::failed(e.message())
            }
            Err(_) => {
                warn!(
                    "Screenshot {} for {} timed out after {}s",
                    device,
                    request.url,
                    self.timeout.as_secs()
                );
                CaptureResult::failed(format!(
                    "capture timed out after {}s",
                    self.timeout.as_secs()
                ))
            }
        }
    }

    pub async fn capture_both(&self, url: &str, page_id: Option<&str>) -> PairedCaptureResult {
        let (desktop, mobile) = tokio::join!(
            self.capture(url, DeviceClass::Desktop, page_id),
            self.capture(url, DeviceClass::Mobile, page_id),
        );
        let all_success = desktop.success && mobile.success;
        PairedCaptureResult {
            desktop,
            mobile,
            all_success,
        }
    }
}
