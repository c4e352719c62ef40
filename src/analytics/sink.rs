use async_trait::async_trait;
use dashmap::DashMap;

use super::StatsCounters;

/// 计数持久化边界（聚合模式）
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// 把一批增量累加到持久化计数上
    async fn apply(&self, deltas: Vec<(String, StatsCounters)>) -> anyhow::Result<()>;

    /// 读取已持久化的计数，不存在时返回全 0
    async fn load(&self, page_id: &str) -> anyhow::Result<StatsCounters>;
}

/// 内存实现（单机部署 / 测试）
#[derive(Default)]
pub struct MemoryStatsStore {
    data: DashMap<String, StatsCounters>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn apply(&self, deltas: Vec<(String, StatsCounters)>) -> anyhow::Result<()> {
        for (page_id, delta) in deltas {
            let mut entry = self.data.entry(page_id).or_default();
            *entry = entry.saturating_add(delta);
        }
        Ok(())
    }

    async fn load(&self, page_id: &str) -> anyhow::Result<StatsCounters> {
        Ok(self.data.get(page_id).map(|c| *c).unwrap_or_default())
    }
}
