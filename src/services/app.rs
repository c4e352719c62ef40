//! 服务装配
//!
//! 所有外部协作方都以 trait 对象注入，测试时替换成内存实现。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::analytics::{MemoryStatsStore, StatsAggregator, StatsRefresher, StatsStore};
use crate::cloaking::{
    ActionExecutor, BotClassifier, BuiltinTemplates, DisabledClassifier, FakePageRenderer,
    HttpClassifier,
};
use crate::config::StaticConfig;
use crate::domain::{
    DomainBindingService, DomainControlPlane, DomainRepository, HttpControlPlane,
    MemoryDomainRepository,
};
use crate::screenshot::{CaptureService, HttpCaptureService, ScreenshotOrchestrator};
use crate::storage::{ConfigRepository, ConfigStore, MemoryConfigRepository};
use crate::utils::non_empty;

/// 外部协作方
pub struct Collaborators {
    pub configs: Arc<dyn ConfigRepository>,
    pub stats: Arc<dyn StatsStore>,
    pub domains: Arc<dyn DomainRepository>,
    pub templates: Arc<dyn FakePageRenderer>,
    pub classifier: Arc<dyn BotClassifier>,
    pub control_plane: Arc<dyn DomainControlPlane>,
    pub capture: Arc<dyn CaptureService>,
}

impl Collaborators {
    /// 存储使用内存实现，外部服务使用给定的适配器
    pub fn in_memory(
        classifier: Arc<dyn BotClassifier>,
        control_plane: Arc<dyn DomainControlPlane>,
        capture: Arc<dyn CaptureService>,
    ) -> Self {
        Self {
            configs: Arc::new(MemoryConfigRepository::new()),
            stats: Arc::new(MemoryStatsStore::new()),
            domains: Arc::new(MemoryDomainRepository::new()),
            templates: Arc::new(BuiltinTemplates),
            classifier,
            control_plane,
            capture,
        }
    }

    /// 按静态配置创建 HTTP 适配器
    pub fn from_config(config: &StaticConfig) -> Self {
        let classifier: Arc<dyn BotClassifier> = match non_empty(&config.classifier.endpoint) {
            Some(endpoint) => {
                info!("Bot classifier endpoint: {}", endpoint);
                Arc::new(HttpClassifier::new(
                    endpoint,
                    Duration::from_millis(config.classifier.timeout_ms),
                ))
            }
            None => {
                warn!("No bot classifier configured, every visitor will be treated as human");
                Arc::new(DisabledClassifier)
            }
        };

        let control_plane = Arc::new(HttpControlPlane::new(
            &config.domain.control_plane_url,
            Duration::from_secs(config.domain.timeout_secs),
        ));
        let capture = Arc::new(HttpCaptureService::new(
            config.screenshot.service_url.clone(),
            Duration::from_secs(config.screenshot.timeout_secs),
        ));

        Self::in_memory(classifier, control_plane, capture)
    }
}

/// 请求处理需要的全部服务，Clone 后共享同一组实例
#[derive(Clone)]
pub struct AppServices {
    pub configs: Arc<ConfigStore>,
    pub classifier: Arc<dyn BotClassifier>,
    pub classifier_timeout: Duration,
    pub executor: Arc<ActionExecutor>,
    pub stats: StatsAggregator,
    pub refresher: Arc<StatsRefresher>,
    pub domains: Arc<DomainBindingService>,
    pub screenshots: Arc<ScreenshotOrchestrator>,
}

impl AppServices {
    pub fn build(config: &StaticConfig, collaborators: Collaborators) -> Self {
        let configs = Arc::new(ConfigStore::new(
            collaborators.configs,
            Arc::clone(&collaborators.templates),
            Duration::from_secs(config.cloaking.config_cache_ttl_secs),
            config.cloaking.config_cache_capacity,
        ));

        let stats = StatsAggregator::new(
            collaborators.stats,
            Duration::from_secs(config.stats.flush_interval_secs.max(1)),
            config.stats.max_outcomes_before_flush,
        );
        let refresher = Arc::new(StatsRefresher::new(
            stats.clone(),
            Duration::from_millis(config.stats.refresh_min_busy_ms),
        ));

        let executor = Arc::new(ActionExecutor::new(
            collaborators.templates,
            stats.clone(),
            config.cloaking.fallback_url.clone(),
        ));

        let domains = Arc::new(DomainBindingService::new(
            collaborators.domains,
            collaborators.control_plane,
            config.domain.expected_ip.clone(),
            config.domain.provider.clone(),
        ));

        let screenshots = Arc::new(ScreenshotOrchestrator::new(
            collaborators.capture,
            Duration::from_secs(config.screenshot.timeout_secs),
        ));

        debug!("Application services assembled");
        Self {
            configs,
            classifier: collaborators.classifier,
            classifier_timeout: Duration::from_millis(config.classifier.timeout_ms),
            executor,
            stats,
            refresher,
            domains,
            screenshots,
        }
    }
}
