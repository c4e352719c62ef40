//! 执行路由动作并上报结果
//!
//! 每次执行恰好调用一次 `StatsAggregator::record`，计数失败不会影响响应。

use std::sync::Arc;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderValue;
use tracing::{trace, warn};
use url::Url;

use super::engine::Decision;
use super::models::Action;
use super::templates::FakePageRenderer;
use crate::analytics::StatsAggregator;

pub struct ActionExecutor {
    renderer: Arc<dyn FakePageRenderer>,
    stats: StatsAggregator,
    fallback_url: String,
}

impl ActionExecutor {
    pub fn new(
        renderer: Arc<dyn FakePageRenderer>,
        stats: StatsAggregator,
        fallback_url: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            stats,
            fallback_url: fallback_url.into(),
        }
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn execute(&self, page_id: &str, decision: Decision) -> HttpResponse {
        let response = match &decision.action {
            Action::ServeFakePage(page) => Self::html_response(self.renderer.render(page)),
            Action::Redirect(target) => {
                let target = if target.trim().is_empty() {
                    warn!(
                        "Empty redirect target for page {}, using fallback {}",
                        page_id, self.fallback_url
                    );
                    self.fallback_url.as_str()
                } else {
                    target.as_str()
                };
                match location_value(target) {
                    Some(location) => Self::redirect_response(location),
                    None => {
                        warn!(
                            "Unusable redirect target for page {}, using fallback {}",
                            page_id, self.fallback_url
                        );
                        match location_value(&self.fallback_url) {
                            Some(location) => Self::redirect_response(location),
                            None => Self::block_response(),
                        }
                    }
                }
            }
            Action::Block => Self::block_response(),
        };

        trace!(
            "Executed {:?} for page {} ({})",
            decision.action,
            page_id,
            decision.outcome.as_ref()
        );
        self.stats.record(page_id, decision.outcome);
        response
    }

    #[inline]
    fn html_response(body: String) -> HttpResponse {
        HttpResponse::build(StatusCode::OK)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body(body)
    }

    #[inline]
    fn redirect_response(location: HeaderValue) -> HttpResponse {
        HttpResponse::TemporaryRedirect()
            .insert_header(("Location", location))
            .insert_header(("Cache-Control", "no-store"))
            .finish()
    }

    #[inline]
    fn block_response() -> HttpResponse {
        HttpResponse::build(StatusCode::FORBIDDEN)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("Forbidden")
    }
}

/// 原样可用则原样返回，否则退回到 url 序列化后的 ASCII 形式（非 ASCII 路径会被百分号编码）
fn location_value(target: &str) -> Option<HeaderValue> {
    let target = target.trim();
    if target.chars().any(char::is_control) {
        return None;
    }
    HeaderValue::from_str(target).ok().or_else(|| {
        Url::parse(target)
            .ok()
            .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{MemoryStatsStore, Outcome};
    use crate::cloaking::models::FakePage;
    use crate::cloaking::templates::BuiltinTemplates;
    use std::time::Duration;

    fn executor() -> ActionExecutor {
        let stats = StatsAggregator::new(
            Arc::new(MemoryStatsStore::new()),
            Duration::from_secs(60),
            10_000,
        );
        ActionExecutor::new(Arc::new(BuiltinTemplates), stats, "https://fallback.example/")
    }

    #[tokio::test]
    async fn test_redirect_sets_location() {
        let exec = executor();
        let resp = exec.execute(
            "p1",
            Decision {
                action: Action::Redirect("https://offer.example".into()),
                outcome: Outcome::HumanServed,
            },
        );
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "https://offer.example"
        );

        let stats = exec.stats().get_stats("p1").await.unwrap();
        assert_eq!(stats.views, 1);
        assert_eq!(stats.redirects, 1);
    }

    #[tokio::test]
    async fn test_empty_redirect_uses_fallback() {
        let exec = executor();
        let resp = exec.execute(
            "p1",
            Decision {
                action: Action::Redirect("  ".into()),
                outcome: Outcome::HumanServed,
            },
        );
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "https://fallback.example/"
        );
    }

    #[tokio::test]
    async fn test_non_ascii_target_is_percent_encoded() {
        let exec = executor();
        let resp = exec.execute(
            "p1",
            Decision {
                action: Action::Redirect("https://offer.example/café".into()),
                outcome: Outcome::HumanServed,
            },
        );
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "https://offer.example/caf%C3%A9"
        );
    }

    #[tokio::test]
    async fn test_unusable_target_falls_back_and_counts_once() {
        let exec = executor();
        let resp = exec.execute(
            "p1",
            Decision {
                action: Action::Redirect("https://offer.example/a\nb".into()),
                outcome: Outcome::HumanServed,
            },
        );
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "https://fallback.example/"
        );
        let stats = exec.stats().get_stats("p1").await.unwrap();
        assert_eq!(stats.redirects, 1);
    }

    #[tokio::test]
    async fn test_block_records_once() {
        let exec = executor();
        let resp = exec.execute(
            "p1",
            Decision {
                action: Action::Block,
                outcome: Outcome::BotDetectedBlock,
            },
        );
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let stats = exec.stats().get_stats("p1").await.unwrap();
        assert_eq!(stats.blocked_bots, 1);
        assert_eq!(stats.bot_detections, 1);
        assert_eq!(stats.views, 0);
        assert_eq!(stats.redirects, 0);
    }

    #[tokio::test]
    async fn test_fake_page_is_html() {
        let exec = executor();
        let resp = exec.execute(
            "p1",
            Decision {
                action: Action::ServeFakePage(FakePage::Template(2)),
                outcome: Outcome::BotDetectedFake,
            },
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .get("Content-Type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert_eq!(exec.stats().pending(), 1);
    }
}
