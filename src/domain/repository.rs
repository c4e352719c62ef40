use async_trait::async_trait;
use dashmap::DashMap;

use super::models::DomainBinding;
use crate::errors::Result;

/// 域名绑定持久化边界；绑定记录只会被覆盖，不会被删除
#[async_trait]
pub trait DomainRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<DomainBinding>>;
    async fn save(&self, binding: DomainBinding) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryDomainRepository {
    bindings: DashMap<String, DomainBinding>,
}

impl MemoryDomainRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainRepository for MemoryDomainRepository {
    async fn get(&self, user_id: &str) -> Result<Option<DomainBinding>> {
        Ok(self.bindings.get(user_id).map(|b| b.value().clone()))
    }

    async fn save(&self, binding: DomainBinding) -> Result<()> {
        self.bindings.insert(binding.user_id.clone(), binding);
        Ok(())
    }
}
