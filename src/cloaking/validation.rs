//! 配置保存前的字段校验
//!
//! 所有不变量都在写入时检查，请求路径上不再做任何校验。

use crate::errors::FieldError;
use crate::utils::{is_valid_page_key, non_empty, validate_url};

use super::models::{BotAction, CloakingConfig};
use super::templates::FakePageRenderer;

/// 自定义伪装页面 HTML 的上限
pub const MAX_FAKE_PAGE_HTML_BYTES: usize = 512 * 1024;

fn check_url(field: &'static str, value: &str) -> Result<(), FieldError> {
    validate_url(value)
        .map(|_| ())
        .map_err(|e| FieldError::new(field, e.to_string()))
}

fn check_optional_url(field: &'static str, value: &Option<String>) -> Result<(), FieldError> {
    match non_empty(value) {
        Some(url) => check_url(field, url),
        None => Ok(()),
    }
}

pub fn validate_config(
    config: &CloakingConfig,
    templates: &dyn FakePageRenderer,
) -> Result<(), FieldError> {
    if !is_valid_page_key(&config.slug) {
        return Err(FieldError::new(
            "slug",
            "must be 1-64 characters of letters, digits, '-' or '_'",
        ));
    }
    if !is_valid_page_key(&config.short_id) {
        return Err(FieldError::new(
            "shortId",
            "must be 1-64 characters of letters, digits, '-' or '_'",
        ));
    }
    if config.user_id.trim().is_empty() {
        return Err(FieldError::new("userId", "is required"));
    }

    // 分设备跳转时默认地址仍是兜底，始终必填
    if config.redirect_url.trim().is_empty() {
        return Err(FieldError::new("redirectUrl", "is required"));
    }
    check_url("redirectUrl", &config.redirect_url)?;
    check_optional_url("redirectUrlDesktop", &config.redirect_url_desktop)?;
    check_optional_url("redirectUrlMobile", &config.redirect_url_mobile)?;
    check_optional_url("botRedirectUrl", &config.bot_redirect_url)?;
    check_optional_url("safeRedirectUrl", &config.safe_redirect_url)?;

    if let Some(html) = &config.fake_page_html
        && html.len() > MAX_FAKE_PAGE_HTML_BYTES
    {
        return Err(FieldError::new(
            "fakePageHtml",
            format!("must not exceed {} bytes", MAX_FAKE_PAGE_HTML_BYTES),
        ));
    }

    match config.bot_action {
        BotAction::FakePage => {
            let has_html = non_empty(&config.fake_page_html).is_some();
            let has_template = config
                .fake_page_template
                .is_some_and(|id| templates.has_template(id));
            if !has_html && !has_template {
                let message = match config.fake_page_template {
                    Some(id) => format!("template {} does not exist and no custom HTML is set", id),
                    None => "a template or custom HTML is required when botAction is fake_page"
                        .to_string(),
                };
                return Err(FieldError::new("fakePageTemplate", message));
            }
        }
        BotAction::Redirect => {
            if non_empty(&config.bot_redirect_url).is_none()
                && non_empty(&config.safe_redirect_url).is_none()
            {
                return Err(FieldError::new(
                    "botRedirectUrl",
                    "botRedirectUrl or safeRedirectUrl is required when botAction is redirect",
                ));
            }
        }
        BotAction::Block => {}
    }

    Ok(())
}
