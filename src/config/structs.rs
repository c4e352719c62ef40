use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - logging: 日志配置
/// - cloaking: 页面配置缓存与兜底跳转地址
/// - classifier: 外部机器人识别服务
/// - stats: 计数缓冲与刷新
/// - domain: 自定义域名控制面
/// - screenshot: 截图服务
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cloaking: CloakingSettings,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub screenshot: ScreenshotConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：PC，分隔符：__
    /// 示例：PC__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 加载配置，失败时返回错误而不是回退到默认值
    pub fn try_load(path: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<StaticConfig>()
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 页面配置相关设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloakingSettings {
    /// 跳转目标为空时的兜底地址
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_config_cache_ttl")]
    pub config_cache_ttl_secs: u64,
    #[serde(default = "default_config_cache_capacity")]
    pub config_cache_capacity: u64,
}

/// 外部机器人识别服务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// 未配置时所有访客按真人处理（fail-open）
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

/// 计数聚合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
    #[serde(default = "default_max_outcomes_before_flush")]
    pub max_outcomes_before_flush: usize,
    /// 刷新按钮的最短忙碌时长，避免界面闪烁
    #[serde(default = "default_refresh_min_busy_ms")]
    pub refresh_min_busy_ms: u64,
}

/// 自定义域名配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,
    /// 用户域名必须解析到的地址
    #[serde(default = "default_expected_ip")]
    pub expected_ip: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

/// 截图服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default = "default_screenshot_url")]
    pub service_url: String,
    #[serde(default = "default_screenshot_timeout")]
    pub timeout_secs: u64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_fallback_url() -> String {
    "https://example.com/".to_string()
}

fn default_config_cache_ttl() -> u64 {
    300
}

fn default_config_cache_capacity() -> u64 {
    10_000
}

fn default_classifier_timeout_ms() -> u64 {
    300
}

fn default_flush_interval() -> u64 {
    30
}

fn default_max_outcomes_before_flush() -> usize {
    10_000
}

fn default_refresh_min_busy_ms() -> u64 {
    500
}

fn default_control_plane_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_expected_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_provider() -> String {
    "cloudflare".to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_screenshot_url() -> String {
    "http://127.0.0.1:8788/capture".to_string()
}

fn default_screenshot_timeout() -> u64 {
    60
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for CloakingSettings {
    fn default() -> Self {
        Self {
            fallback_url: default_fallback_url(),
            config_cache_ttl_secs: default_config_cache_ttl(),
            config_cache_capacity: default_config_cache_capacity(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: default_flush_interval(),
            max_outcomes_before_flush: default_max_outcomes_before_flush(),
            refresh_min_busy_ms: default_refresh_min_busy_ms(),
        }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            control_plane_url: default_control_plane_url(),
            expected_ip: default_expected_ip(),
            provider: default_provider(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            service_url: default_screenshot_url(),
            timeout_secs: default_screenshot_timeout(),
        }
    }
}
