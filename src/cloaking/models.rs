//! 页面配置、访客请求与机器人信号的数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// 识别为机器人后的处理方式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BotAction {
    /// 返回伪装页面
    #[default]
    FakePage,
    /// 跳转到安全地址
    Redirect,
    /// 直接拦截
    Block,
}

impl std::fmt::Display for BotAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for BotAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fake_page" => Ok(Self::FakePage),
            "redirect" => Ok(Self::Redirect),
            "block" => Ok(Self::Block),
            _ => Err(format!(
                "Invalid bot action: '{}'. Valid: fake_page, redirect, block",
                s
            )),
        }
    }
}

/// 访客设备类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// 落地页配置
///
/// `id` / `slug` / `short_id` 三者各自全局唯一，均可用于查找。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloakingConfig {
    pub id: String,
    pub user_id: String,
    pub slug: String,
    pub short_id: String,

    /// 真人访客的默认目标
    pub redirect_url: String,
    #[serde(default)]
    pub use_separate_urls: bool,
    #[serde(default)]
    pub redirect_url_desktop: Option<String>,
    #[serde(default)]
    pub redirect_url_mobile: Option<String>,

    #[serde(default)]
    pub bot_action: BotAction,
    #[serde(default)]
    pub fake_page_template: Option<u32>,
    #[serde(default)]
    pub fake_page_html: Option<String>,
    #[serde(default)]
    pub bot_redirect_url: Option<String>,
    #[serde(default)]
    pub safe_redirect_url: Option<String>,

    #[serde(default)]
    pub block_known_bots: bool,
    #[serde(default)]
    pub block_data_centers: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 单次访问（只在请求期间存在，不落库）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorRequest {
    pub device: DeviceClass,
    pub user_agent: String,
    pub ip: Option<String>,
    pub referrer: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl VisitorRequest {
    pub fn new(device: DeviceClass, user_agent: impl Into<String>) -> Self {
        Self {
            device,
            user_agent: user_agent.into(),
            ip: None,
            referrer: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip;
        self
    }

    pub fn with_referrer(mut self, referrer: Option<String>) -> Self {
        self.referrer = referrer;
        self
    }
}

/// 外部识别服务给出的判定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSignal {
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_known_bot: bool,
    #[serde(default)]
    pub is_data_center_ip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BotSignal {
    pub fn human() -> Self {
        Self::default()
    }

    /// 识别服务不可用时使用：按真人放行
    pub fn fail_open(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// 伪装页面内容来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakePage {
    Html(String),
    Template(u32),
}

/// 路由动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ServeFakePage(FakePage),
    Redirect(String),
    Block,
}
