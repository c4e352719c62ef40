use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{AppServices, Collaborators};
use crate::utils::validate_url;

/// 准备服务器启动的上下文：校验配置、装配服务、启动后台刷盘任务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<AppServices> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    validate_url(&config.cloaking.fallback_url)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Invalid cloaking.fallback_url")?;

    let services = AppServices::build(config, Collaborators::from_config(config));

    let stats = services.stats.clone();
    tokio::spawn(async move {
        stats.start_background_task().await;
    });
    info!(
        "Stats aggregator started (flush every {}s or {} outcomes)",
        config.stats.flush_interval_secs, config.stats.max_outcomes_before_flush
    );

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());
    Ok(services)
}
