use serde::{Deserialize, Deserializer, Serialize};

use crate::cloaking::BotAction;

/// 创建页面配置的输入；`id` / `shortId` 由服务端生成，`slug` 缺省时随机生成
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCloakingConfig {
    pub user_id: String,
    #[serde(default)]
    pub slug: Option<String>,
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
}

/// 字段级部分更新：缺省字段保持不变
///
/// 可选字符串字段传空串表示清空；`fakePageTemplate` 传 `null` 或 `0` 表示清空。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub slug: Option<String>,
    pub redirect_url: Option<String>,
    pub use_separate_urls: Option<bool>,
    pub redirect_url_desktop: Option<String>,
    pub redirect_url_mobile: Option<String>,
    pub bot_action: Option<BotAction>,
    #[serde(default, deserialize_with = "present")]
    pub fake_page_template: Option<Option<u32>>,
    pub fake_page_html: Option<String>,
    pub bot_redirect_url: Option<String>,
    pub safe_redirect_url: Option<String>,
    pub block_known_bots: Option<bool>,
    pub block_data_centers: Option<bool>,
}

/// 区分"字段缺省"和"显式传 null"：出现即为 `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.redirect_url.is_none()
            && self.use_separate_urls.is_none()
            && self.redirect_url_desktop.is_none()
            && self.redirect_url_mobile.is_none()
            && self.bot_action.is_none()
            && self.fake_page_template.is_none()
            && self.fake_page_html.is_none()
            && self.bot_redirect_url.is_none()
            && self.safe_redirect_url.is_none()
            && self.block_known_bots.is_none()
            && self.block_data_centers.is_none()
    }
}
