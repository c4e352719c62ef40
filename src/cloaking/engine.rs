//! 路由决策
//!
//! 纯函数：相同输入永远得到相同输出，不读时钟、不做 I/O。
//! 拦截规则优先于机器人处理规则。

use super::models::{
    Action, BotAction, BotSignal, CloakingConfig, DeviceClass, FakePage, VisitorRequest,
};
use crate::analytics::Outcome;
use crate::utils::non_empty;

/// 未配置模板时使用的模板编号
pub const DEFAULT_TEMPLATE_ID: u32 = 1;

/// 决策结果：动作 + 命中的分支（用于计数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub outcome: Outcome,
}

impl Decision {
    fn new(action: Action, outcome: Outcome) -> Self {
        Self { action, outcome }
    }
}

pub fn decide(config: &CloakingConfig, request: &VisitorRequest, signal: &BotSignal) -> Action {
    evaluate(config, request, signal).action
}

pub fn evaluate(config: &CloakingConfig, request: &VisitorRequest, signal: &BotSignal) -> Decision {
    if signal.is_known_bot && config.block_known_bots {
        return Decision::new(Action::Block, Outcome::BlockedKnownBot);
    }

    if signal.is_data_center_ip && config.block_data_centers {
        return Decision::new(Action::Block, Outcome::BlockedDataCenter);
    }

    if signal.is_bot {
        return bot_decision(config);
    }

    Decision::new(
        Action::Redirect(human_target(config, request.device).to_string()),
        Outcome::HumanServed,
    )
}

fn bot_decision(config: &CloakingConfig) -> Decision {
    match config.bot_action {
        BotAction::FakePage => {
            let page = match config.fake_page_html.as_deref() {
                Some(html) if !html.trim().is_empty() => FakePage::Html(html.to_string()),
                _ => FakePage::Template(config.fake_page_template.unwrap_or(DEFAULT_TEMPLATE_ID)),
            };
            Decision::new(Action::ServeFakePage(page), Outcome::BotDetectedFake)
        }
        BotAction::Redirect => {
            let target = non_empty(&config.bot_redirect_url)
                .or_else(|| non_empty(&config.safe_redirect_url));
            match target {
                Some(target) => Decision::new(
                    Action::Redirect(target.to_string()),
                    Outcome::BotDetectedRedirect,
                ),
                // 保存时已校验，不应出现；宁可拦截也不把机器人送到真实页面
                None => Decision::new(Action::Block, Outcome::BotDetectedBlock),
            }
        }
        BotAction::Block => Decision::new(Action::Block, Outcome::BotDetectedBlock),
    }
}

/// 真人访客的目标地址：分设备地址为空时回退到默认地址
pub fn human_target(config: &CloakingConfig, device: DeviceClass) -> &str {
    if config.use_separate_urls {
        let device_url = match device {
            DeviceClass::Desktop => non_empty(&config.redirect_url_desktop),
            DeviceClass::Mobile => non_empty(&config.redirect_url_mobile),
        };
        if let Some(url) = device_url {
            return url;
        }
    }
    config.redirect_url.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn config() -> CloakingConfig {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CloakingConfig {
            id: "cfg-1".into(),
            user_id: "user-1".into(),
            slug: "spring".into(),
            short_id: "Ab12Cd34".into(),
            redirect_url: "https://offer.example".into(),
            use_separate_urls: false,
            redirect_url_desktop: None,
            redirect_url_mobile: None,
            bot_action: BotAction::FakePage,
            fake_page_template: Some(3),
            fake_page_html: None,
            bot_redirect_url: None,
            safe_redirect_url: None,
            block_known_bots: false,
            block_data_centers: false,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn visitor(device: DeviceClass) -> VisitorRequest {
        VisitorRequest {
            device,
            user_agent: "ua".into(),
            ip: Some("203.0.113.1".into()),
            referrer: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn bot() -> BotSignal {
        BotSignal {
            is_bot: true,
            ..BotSignal::default()
        }
    }

    #[test]
    fn test_known_bot_blocked_before_bot_action() {
        let mut cfg = config();
        cfg.block_known_bots = true;
        cfg.bot_action = BotAction::Redirect;
        cfg.bot_redirect_url = Some("https://safe.example".into());
        let signal = BotSignal {
            is_known_bot: true,
            ..BotSignal::default()
        };

        let decision = evaluate(&cfg, &visitor(DeviceClass::Desktop), &signal);
        assert_eq!(decision.action, Action::Block);
        assert_eq!(decision.outcome, Outcome::BlockedKnownBot);
    }

    #[test]
    fn test_known_bot_rule_precedes_data_center_rule() {
        let mut cfg = config();
        cfg.block_known_bots = true;
        cfg.block_data_centers = true;
        let signal = BotSignal {
            is_bot: true,
            is_known_bot: true,
            is_data_center_ip: true,
            ..BotSignal::default()
        };
        assert_eq!(
            evaluate(&cfg, &visitor(DeviceClass::Desktop), &signal).outcome,
            Outcome::BlockedKnownBot
        );
    }

    #[test]
    fn test_data_center_blocked_even_when_not_flagged_bot() {
        let mut cfg = config();
        cfg.block_data_centers = true;
        let signal = BotSignal {
            is_data_center_ip: true,
            ..BotSignal::default()
        };
        let decision = evaluate(&cfg, &visitor(DeviceClass::Mobile), &signal);
        assert_eq!(decision.action, Action::Block);
        assert_eq!(decision.outcome, Outcome::BlockedDataCenter);
    }

    #[test]
    fn test_disabled_block_toggles_fall_through() {
        let signal = BotSignal {
            is_known_bot: true,
            is_data_center_ip: true,
            ..BotSignal::default()
        };
        // 未标记 is_bot 且拦截开关关闭 → 当作真人
        let decision = evaluate(&config(), &visitor(DeviceClass::Desktop), &signal);
        assert_eq!(decision.action, Action::Redirect("https://offer.example".into()));
        assert_eq!(decision.outcome, Outcome::HumanServed);
    }

    #[test]
    fn test_fake_page_prefers_custom_html() {
        let mut cfg = config();
        cfg.fake_page_html = Some("<h1>hello</h1>".into());
        assert_eq!(
            decide(&cfg, &visitor(DeviceClass::Desktop), &bot()),
            Action::ServeFakePage(FakePage::Html("<h1>hello</h1>".into()))
        );

        cfg.fake_page_html = Some("   ".into());
        assert_eq!(
            decide(&cfg, &visitor(DeviceClass::Desktop), &bot()),
            Action::ServeFakePage(FakePage::Template(3))
        );
    }

    #[test]
    fn test_bot_redirect_falls_back_to_safe_url() {
        let mut cfg = config();
        cfg.bot_action = BotAction::Redirect;
        cfg.safe_redirect_url = Some("https://safe.example".into());
        let decision = evaluate(&cfg, &visitor(DeviceClass::Desktop), &bot());
        assert_eq!(decision.action, Action::Redirect("https://safe.example".into()));
        assert_eq!(decision.outcome, Outcome::BotDetectedRedirect);

        cfg.bot_redirect_url = Some("https://bots.example".into());
        assert_eq!(
            decide(&cfg, &visitor(DeviceClass::Desktop), &bot()),
            Action::Redirect("https://bots.example".into())
        );
    }

    #[test]
    fn test_bot_redirect_without_target_blocks() {
        let mut cfg = config();
        cfg.bot_action = BotAction::Redirect;
        let decision = evaluate(&cfg, &visitor(DeviceClass::Desktop), &bot());
        assert_eq!(decision.action, Action::Block);
    }

    #[test]
    fn test_bot_action_block() {
        let mut cfg = config();
        cfg.bot_action = BotAction::Block;
        let decision = evaluate(&cfg, &visitor(DeviceClass::Mobile), &bot());
        assert_eq!(decision.action, Action::Block);
        assert_eq!(decision.outcome, Outcome::BotDetectedBlock);
    }

    #[test]
    fn test_device_split_for_humans() {
        let mut cfg = config();
        cfg.use_separate_urls = true;
        cfg.redirect_url_mobile = Some("https://m.offer.example".into());

        assert_eq!(
            decide(&cfg, &visitor(DeviceClass::Mobile), &BotSignal::human()),
            Action::Redirect("https://m.offer.example".into())
        );
        // 桌面地址为空 → 默认地址
        assert_eq!(
            decide(&cfg, &visitor(DeviceClass::Desktop), &BotSignal::human()),
            Action::Redirect("https://offer.example".into())
        );

        // 关闭分设备时忽略设备地址
        cfg.use_separate_urls = false;
        assert_eq!(
            decide(&cfg, &visitor(DeviceClass::Mobile), &BotSignal::human()),
            Action::Redirect("https://offer.example".into())
        );
    }

    #[test]
    fn test_decide_is_deterministic() {
        let mut cfg = config();
        cfg.block_data_centers = true;
        let req = visitor(DeviceClass::Mobile);
        let signals = [
            BotSignal::human(),
            bot(),
            BotSignal {
                is_data_center_ip: true,
                ..BotSignal::default()
            },
        ];
        for signal in &signals {
            let first = evaluate(&cfg, &req, signal);
            for _ in 0..100 {
                assert_eq!(evaluate(&cfg, &req, signal), first);
            }
        }
    }
}
