//! 访问结果计数
//!
//! - `manager`: 请求路径上的无锁计数缓冲 + 后台刷盘
//! - `sink`: 计数持久化边界
//! - `refresh`: 合并并发刷新请求

pub mod manager;
pub mod refresh;
pub mod sink;

pub use manager::StatsAggregator;
pub use refresh::{RefreshCoalescer, StatsRefresher};
pub use sink::{MemoryStatsStore, StatsStore};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// 决策引擎命中的分支，决定哪些计数器递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    HumanServed,
    BotDetectedFake,
    BotDetectedRedirect,
    /// botAction = block 拦截的机器人
    BotDetectedBlock,
    BlockedKnownBot,
    BlockedDataCenter,
}

impl Outcome {
    /// 该结果对应的计数增量
    pub fn delta(self) -> StatsCounters {
        match self {
            Outcome::HumanServed => StatsCounters {
                views: 1,
                redirects: 1,
                ..StatsCounters::default()
            },
            Outcome::BotDetectedFake => StatsCounters {
                bot_detections: 1,
                ..StatsCounters::default()
            },
            Outcome::BotDetectedRedirect => StatsCounters {
                redirects: 1,
                bot_detections: 1,
                ..StatsCounters::default()
            },
            Outcome::BotDetectedBlock | Outcome::BlockedKnownBot | Outcome::BlockedDataCenter => {
                StatsCounters {
                    bot_detections: 1,
                    blocked_bots: 1,
                    ..StatsCounters::default()
                }
            }
        }
    }
}

/// 单个页面的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsCounters {
    pub views: u64,
    pub redirects: u64,
    pub bot_detections: u64,
    pub blocked_bots: u64,
}

impl StatsCounters {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// 逐项相加（饱和）
    pub fn saturating_add(self, other: Self) -> Self {
        Self {
            views: self.views.saturating_add(other.views),
            redirects: self.redirects.saturating_add(other.redirects),
            bot_detections: self.bot_detections.saturating_add(other.bot_detections),
            blocked_bots: self.blocked_bots.saturating_add(other.blocked_bots),
        }
    }

    /// 逐项取最大值，用于保证读到的计数不回退
    pub fn max(self, other: Self) -> Self {
        Self {
            views: self.views.max(other.views),
            redirects: self.redirects.max(other.redirects),
            bot_detections: self.bot_detections.max(other.bot_detections),
            blocked_bots: self.blocked_bots.max(other.blocked_bots),
        }
    }
}
