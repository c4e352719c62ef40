//! 页面配置服务
//!
//! 写入前统一校验；读取走 moka 缓存，每次提交后显式失效相关的 key。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::sync::Cache;
use tracing::{debug, info, trace};

use super::models::{ConfigPatch, NewCloakingConfig};
use super::repository::ConfigRepository;
use crate::cloaking::{CloakingConfig, FakePageRenderer, validate_config};
use crate::errors::{CloakError, Result};
use crate::utils::generate_random_code;

/// shortId 长度
pub const SHORT_ID_LENGTH: usize = 8;
/// 未指定 slug 时随机生成的长度
const RANDOM_SLUG_LENGTH: usize = 10;
/// shortId 冲突时的最大重试次数
const MAX_SHORT_ID_ATTEMPTS: usize = 5;

pub struct ConfigStore {
    repository: Arc<dyn ConfigRepository>,
    templates: Arc<dyn FakePageRenderer>,
    /// 查找 key（shortId / slug / id）→ 配置
    cache: Cache<String, Arc<CloakingConfig>>,
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ConfigStore {
    pub fn new(
        repository: Arc<dyn ConfigRepository>,
        templates: Arc<dyn FakePageRenderer>,
        cache_ttl: Duration,
        cache_capacity: u64,
    ) -> Self {
        let cache = Cache::builder()
            .time_to_live(cache_ttl)
            .max_capacity(cache_capacity)
            .build();
        Self {
            repository,
            templates,
            cache,
        }
    }

    pub async fn create(&self, input: NewCloakingConfig) -> Result<CloakingConfig> {
        let slug = match normalize_optional(input.slug) {
            Some(slug) => {
                if self.repository.find_by_slug(&slug).await?.is_some() {
                    return Err(CloakError::conflict(format!("slug '{}' is already in use", slug)));
                }
                slug
            }
            None => self.unused_slug().await?,
        };

        let now = Utc::now();
        let mut config = CloakingConfig {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: input.user_id.trim().to_string(),
            slug,
            short_id: self.unused_short_id().await?,
            redirect_url: input.redirect_url.trim().to_string(),
            use_separate_urls: input.use_separate_urls,
            redirect_url_desktop: normalize_optional(input.redirect_url_desktop),
            redirect_url_mobile: normalize_optional(input.redirect_url_mobile),
            bot_action: input.bot_action,
            fake_page_template: input.fake_page_template,
            fake_page_html: input.fake_page_html.filter(|h| !h.trim().is_empty()),
            bot_redirect_url: normalize_optional(input.bot_redirect_url),
            safe_redirect_url: normalize_optional(input.safe_redirect_url),
            block_known_bots: input.block_known_bots,
            block_data_centers: input.block_data_centers,
            created_at: now,
            updated_at: now,
        };

        validate_config(&config, self.templates.as_ref())?;

        // 生成的 shortId 仍可能在检查之后被占用
        for attempt in 1..=MAX_SHORT_ID_ATTEMPTS {
            match self.repository.upsert(config.clone()).await {
                Ok(()) => break,
                Err(CloakError::Conflict(msg))
                    if msg.contains("shortId") && attempt < MAX_SHORT_ID_ATTEMPTS =>
                {
                    debug!(
                        "ConfigStore: shortId collision on attempt {}, regenerating",
                        attempt
                    );
                    config.short_id = self.unused_short_id().await?;
                }
                Err(e) => return Err(e),
            }
        }

        self.invalidate(&config);
        info!(
            "ConfigStore: created config {} (slug={}, shortId={})",
            config.id, config.slug, config.short_id
        );
        Ok(config)
    }

    async fn unused_short_id(&self) -> Result<String> {
        for _ in 0..MAX_SHORT_ID_ATTEMPTS {
            let candidate = generate_random_code(SHORT_ID_LENGTH);
            if self.repository.find_by_short_id(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(CloakError::conflict("failed to generate a unique shortId"))
    }

    async fn unused_slug(&self) -> Result<String> {
        for _ in 0..MAX_SHORT_ID_ATTEMPTS {
            let candidate = generate_random_code(RANDOM_SLUG_LENGTH).to_lowercase();
            if self.repository.find_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(CloakError::conflict("failed to generate a unique slug"))
    }

    /// 字段级部分更新，校验通过后才提交
    pub async fn update(&self, id: &str, patch: ConfigPatch) -> Result<CloakingConfig> {
        let previous = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CloakError::not_found(format!("config '{}' not found", id)))?;

        if patch.is_empty() {
            return Ok(previous);
        }

        let mut config = previous.clone();
        if let Some(slug) = patch.slug {
            config.slug = slug.trim().to_string();
        }
        if let Some(url) = patch.redirect_url {
            config.redirect_url = url.trim().to_string();
        }
        if let Some(v) = patch.use_separate_urls {
            config.use_separate_urls = v;
        }
        if let Some(url) = patch.redirect_url_desktop {
            config.redirect_url_desktop = normalize_optional(Some(url));
        }
        if let Some(url) = patch.redirect_url_mobile {
            config.redirect_url_mobile = normalize_optional(Some(url));
        }
        if let Some(action) = patch.bot_action {
            config.bot_action = action;
        }
        if let Some(template) = patch.fake_page_template {
            // null 或 0 表示清空，只保留自定义 HTML
            config.fake_page_template = template.filter(|id| *id != 0);
        }
        if let Some(html) = patch.fake_page_html {
            config.fake_page_html = Some(html).filter(|h| !h.trim().is_empty());
        }
        if let Some(url) = patch.bot_redirect_url {
            config.bot_redirect_url = normalize_optional(Some(url));
        }
        if let Some(url) = patch.safe_redirect_url {
            config.safe_redirect_url = normalize_optional(Some(url));
        }
        if let Some(v) = patch.block_known_bots {
            config.block_known_bots = v;
        }
        if let Some(v) = patch.block_data_centers {
            config.block_data_centers = v;
        }
        config.updated_at = Utc::now();

        validate_config(&config, self.templates.as_ref())?;
        self.repository.upsert(config.clone()).await?;

        self.invalidate(&previous);
        self.invalidate(&config);
        debug!("ConfigStore: updated config {}", id);
        Ok(config)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        match self.repository.delete(id).await? {
            Some(removed) => {
                self.invalidate(&removed);
                info!("ConfigStore: deleted config {}", id);
                Ok(())
            }
            None => Err(CloakError::not_found(format!("config '{}' not found", id))),
        }
    }

    pub async fn get(&self, id: &str) -> Result<CloakingConfig> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CloakError::not_found(format!("config '{}' not found", id)))
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<CloakingConfig>> {
        self.repository.list_by_user(user_id).await
    }

    /// 访客入口查找：shortId → slug → id
    pub async fn resolve(&self, key: &str) -> Result<Option<Arc<CloakingConfig>>> {
        if let Some(hit) = self.cache.get(key) {
            trace!("ConfigStore: cache hit for {}", key);
            return Ok(Some(hit));
        }

        let found = match self.repository.find_by_short_id(key).await? {
            Some(config) => Some(config),
            None => match self.repository.find_by_slug(key).await? {
                Some(config) => Some(config),
                None => self.repository.get_by_id(key).await?,
            },
        };

        Ok(found.map(|config| {
            let config = Arc::new(config);
            self.cache.insert(key.to_string(), Arc::clone(&config));
            config
        }))
    }

    /// 失效一个配置可能被查找到的所有 key
    pub fn invalidate(&self, config: &CloakingConfig) {
        self.cache.invalidate(&config.id);
        self.cache.invalidate(&config.slug);
        self.cache.invalidate(&config.short_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloaking::{BotAction, BuiltinTemplates};
    use crate::storage::repository::MemoryConfigRepository;

    fn store() -> ConfigStore {
        ConfigStore::new(
            Arc::new(MemoryConfigRepository::new()),
            Arc::new(BuiltinTemplates),
            Duration::from_secs(300),
            1000,
        )
    }

    fn input() -> NewCloakingConfig {
        NewCloakingConfig {
            user_id: "u1".into(),
            slug: Some("spring".into()),
            redirect_url: "https://offer.example".into(),
            bot_action: BotAction::FakePage,
            fake_page_template: Some(1),
            ..NewCloakingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_create_generates_identity() {
        let store = store();
        let cfg = store.create(input()).await.unwrap();
        assert_eq!(cfg.short_id.len(), SHORT_ID_LENGTH);
        assert!(uuid::Uuid::parse_str(&cfg.id).is_ok());

        let random = store
            .create(NewCloakingConfig {
                slug: None,
                ..input()
            })
            .await
            .unwrap();
        assert_eq!(random.slug.len(), RANDOM_SLUG_LENGTH);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_config() {
        let store = store();
        let err = store
            .create(NewCloakingConfig {
                bot_action: BotAction::Redirect,
                ..input()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("botRedirectUrl"));
        assert!(store.list_by_user("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = store();
        store.create(input()).await.unwrap();
        assert!(matches!(
            store.create(input()).await.unwrap_err(),
            CloakError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_order_and_invalidation() {
        let store = store();
        let cfg = store.create(input()).await.unwrap();

        for key in [&cfg.short_id, &cfg.slug, &cfg.id] {
            assert_eq!(store.resolve(key).await.unwrap().unwrap().id, cfg.id);
        }

        // 缓存中的旧值在更新后必须失效
        let updated = store
            .update(
                &cfg.id,
                ConfigPatch {
                    slug: Some("summer".into()),
                    redirect_url: Some("https://new.example".into()),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.redirect_url, "https://new.example");
        assert!(store.resolve("spring").await.unwrap().is_none());
        assert_eq!(
            store.resolve(&cfg.short_id).await.unwrap().unwrap().redirect_url,
            "https://new.example"
        );

        store.delete(&cfg.id).await.unwrap();
        assert!(store.resolve(&cfg.short_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_patch_leaves_config_unchanged() {
        let store = store();
        let cfg = store.create(input()).await.unwrap();

        let err = store
            .update(
                &cfg.id,
                ConfigPatch {
                    bot_action: Some(BotAction::Redirect),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CloakError::FieldValidation(_)));
        assert_eq!(store.get(&cfg.id).await.unwrap().bot_action, BotAction::FakePage);
    }

    #[tokio::test]
    async fn test_patch_clears_optional_field() {
        let store = store();
        let cfg = store
            .create(NewCloakingConfig {
                safe_redirect_url: Some("https://safe.example".into()),
                ..input()
            })
            .await
            .unwrap();
        let updated = store
            .update(
                &cfg.id,
                ConfigPatch {
                    safe_redirect_url: Some(String::new()),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.safe_redirect_url.is_none());
    }

    #[tokio::test]
    async fn test_patch_clears_template() {
        let store = store();
        let cfg = store
            .create(NewCloakingConfig {
                fake_page_html: Some("<html>custom</html>".into()),
                ..input()
            })
            .await
            .unwrap();

        let updated = store
            .update(
                &cfg.id,
                ConfigPatch {
                    fake_page_template: Some(None),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.fake_page_template.is_none());
        assert_eq!(updated.fake_page_html.as_deref(), Some("<html>custom</html>"));

        let updated = store
            .update(
                &cfg.id,
                ConfigPatch {
                    fake_page_template: Some(Some(2)),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fake_page_template, Some(2));

        let updated = store
            .update(
                &cfg.id,
                ConfigPatch {
                    fake_page_template: Some(Some(0)),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.fake_page_template.is_none());
    }

    #[tokio::test]
    async fn test_clearing_only_fake_page_source_is_rejected() {
        let store = store();
        let cfg = store.create(input()).await.unwrap();

        let err = store
            .update(
                &cfg.id,
                ConfigPatch {
                    fake_page_template: Some(None),
                    ..ConfigPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("fakePageTemplate"));
        assert_eq!(store.get(&cfg.id).await.unwrap().fake_page_template, Some(1));
    }

    #[tokio::test]
    async fn test_missing_config_is_not_found() {
        let store = store();
        assert!(matches!(
            store.update("nope", ConfigPatch::default()).await.unwrap_err(),
            CloakError::NotFound(_)
        ));
        assert!(matches!(
            store.delete("nope").await.unwrap_err(),
            CloakError::NotFound(_)
        ));
    }
}
