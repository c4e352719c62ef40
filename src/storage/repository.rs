//! 页面配置持久化边界

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use crate::cloaking::CloakingConfig;
use crate::errors::{CloakError, Result};

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<CloakingConfig>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CloakingConfig>>;
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<CloakingConfig>>;

    /// 按 id 插入或覆盖；slug / shortId 被其他配置占用时返回 `Conflict`
    async fn upsert(&self, config: CloakingConfig) -> Result<()>;

    /// 删除配置，返回被删除的记录
    async fn delete(&self, id: &str) -> Result<Option<CloakingConfig>>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CloakingConfig>>;
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<String, CloakingConfig>,
    /// slug → id
    slugs: HashMap<String, String>,
    /// shortId → id
    short_ids: HashMap<String, String>,
}

/// 内存实现，三张索引在同一把锁下更新
#[derive(Default)]
pub struct MemoryConfigRepository {
    tables: RwLock<Tables>,
}

impl MemoryConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConfigRepository for MemoryConfigRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<CloakingConfig>> {
        Ok(self.tables.read().by_id.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CloakingConfig>> {
        let tables = self.tables.read();
        Ok(tables
            .slugs
            .get(slug)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<CloakingConfig>> {
        let tables = self.tables.read();
        Ok(tables
            .short_ids
            .get(short_id)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn upsert(&self, config: CloakingConfig) -> Result<()> {
        let mut tables = self.tables.write();

        if let Some(owner) = tables.slugs.get(&config.slug)
            && owner != &config.id
        {
            return Err(CloakError::conflict(format!(
                "slug '{}' is already in use",
                config.slug
            )));
        }
        if let Some(owner) = tables.short_ids.get(&config.short_id)
            && owner != &config.id
        {
            return Err(CloakError::conflict(format!(
                "shortId '{}' is already in use",
                config.short_id
            )));
        }

        if let Some(previous) = tables.by_id.get(&config.id).cloned() {
            tables.slugs.remove(&previous.slug);
            tables.short_ids.remove(&previous.short_id);
        }

        tables.slugs.insert(config.slug.clone(), config.id.clone());
        tables
            .short_ids
            .insert(config.short_id.clone(), config.id.clone());
        trace!("MemoryConfigRepository: upserted {}", config.id);
        tables.by_id.insert(config.id.clone(), config);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<Option<CloakingConfig>> {
        let mut tables = self.tables.write();
        let removed = tables.by_id.remove(id);
        if let Some(config) = &removed {
            tables.slugs.remove(&config.slug);
            tables.short_ids.remove(&config.short_id);
        }
        Ok(removed)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CloakingConfig>> {
        let tables = self.tables.read();
        let mut configs: Vec<CloakingConfig> = tables
            .by_id
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        configs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(configs)
    }
}
