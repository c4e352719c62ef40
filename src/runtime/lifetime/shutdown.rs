use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::analytics::StatsAggregator;

/// 单个任务超时时间（秒）
const TASK_TIMEOUT_SECS: u64 = 10;

pub async fn listen_for_shutdown(stats: &StatsAggregator) {
    // 等待 Ctrl+C 信号
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, flushing data...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    perform_shutdown_tasks(stats).await;
}

/// 执行所有关闭任务
pub async fn perform_shutdown_tasks(stats: &StatsAggregator) {
    let pending = stats.pending();
    match timeout(Duration::from_secs(TASK_TIMEOUT_SECS), stats.shutdown()).await {
        Ok(()) => {
            info!("StatsAggregator flushed on shutdown");
        }
        Err(_) => {
            error!(
                "StatsAggregator flush timed out after {} seconds, up to {} outcomes were not persisted",
                TASK_TIMEOUT_SECS, pending
            );
        }
    }
}
