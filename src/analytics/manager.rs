//! 访问结果计数聚合器
//!
//! 负责在请求路径上记录结果并异步刷到存储后端：
//! - 每个页面一组原子计数器（DashMap 读锁 + fetch_add，无读-改-写竞争）
//! - 定时刷盘 + 阈值触发刷盘，与请求路径解耦
//! - 刷盘失败时增量回填缓冲区，不丢计数
//! - 读取时合并已持久化和缓冲中的计数，并保证不回退

use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, trace, warn};

use super::sink::StatsStore;
use super::{Outcome, StatsCounters};
use crate::errors::{CloakError, Result};

/// 单个页面的待刷盘增量
#[derive(Default)]
struct PageCounters {
    views: AtomicU64,
    redirects: AtomicU64,
    bot_detections: AtomicU64,
    blocked_bots: AtomicU64,
}

impl PageCounters {
    fn add(&self, delta: &StatsCounters) {
        if delta.views > 0 {
            self.views.fetch_add(delta.views, Ordering::Relaxed);
        }
        if delta.redirects > 0 {
            self.redirects.fetch_add(delta.redirects, Ordering::Relaxed);
        }
        if delta.bot_detections > 0 {
            self.bot_detections
                .fetch_add(delta.bot_detections, Ordering::Relaxed);
        }
        if delta.blocked_bots > 0 {
            self.blocked_bots
                .fetch_add(delta.blocked_bots, Ordering::Relaxed);
        }
    }

    /// 取走当前增量并清零；swap 之后的 fetch_add 留到下一轮
    fn take(&self) -> StatsCounters {
        StatsCounters {
            views: self.views.swap(0, Ordering::AcqRel),
            redirects: self.redirects.swap(0, Ordering::AcqRel),
            bot_detections: self.bot_detections.swap(0, Ordering::AcqRel),
            blocked_bots: self.blocked_bots.swap(0, Ordering::AcqRel),
        }
    }

    fn snapshot(&self) -> StatsCounters {
        StatsCounters {
            views: self.views.load(Ordering::Acquire),
            redirects: self.redirects.load(Ordering::Acquire),
            bot_detections: self.bot_detections.load(Ordering::Acquire),
            blocked_bots: self.blocked_bots.load(Ordering::Acquire),
        }
    }
}

/// 计数缓冲区状态，封装所有可变状态
struct StatsBuffer {
    data: DashMap<Arc<str>, PageCounters>,
    /// 缓冲区中尚未刷盘的结果数（近似值，只用于阈值判断）
    pending_outcomes: AtomicUsize,
    /// 刷盘锁，防止并发刷盘
    flush_lock: Mutex<()>,
    /// 是否有 flush 任务待处理（防止重复 spawn）
    flush_pending: AtomicBool,
}

impl StatsBuffer {
    fn new() -> Self {
        Self {
            data: DashMap::new(),
            pending_outcomes: AtomicUsize::new(0),
            flush_lock: Mutex::new(()),
            flush_pending: AtomicBool::new(false),
        }
    }

    fn add(&self, page_id: &str, delta: &StatsCounters) {
        // 热点页面只走读锁，只有新页面才需要分配 Arc
        if let Some(entry) = self.data.get(page_id) {
            entry.add(delta);
        } else {
            self.data
                .entry(Arc::from(page_id))
                .or_default()
                .add(delta);
        }
    }

    fn record(&self, page_id: &str, delta: &StatsCounters) -> usize {
        self.add(page_id, delta);
        self.pending_outcomes.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn drain(&self) -> Vec<(String, StatsCounters)> {
        let mut updates = Vec::with_capacity(self.data.len());
        for entry in self.data.iter() {
            let delta = entry.value().take();
            if !delta.is_zero() {
                updates.push((entry.key().to_string(), delta));
            }
        }
        self.pending_outcomes.store(0, Ordering::Release);
        updates
    }

    /// 刷盘失败时把增量加回去
    fn restore(&self, updates: Vec<(String, StatsCounters)>) {
        let count = updates.len();
        for (page_id, delta) in updates {
            self.add(&page_id, &delta);
        }
        self.pending_outcomes.fetch_add(count, Ordering::Relaxed);
    }

    fn snapshot(&self, page_id: &str) -> StatsCounters {
        self.data
            .get(page_id)
            .map(|entry| entry.snapshot())
            .unwrap_or_default()
    }
}

/// 计数聚合器
///
/// `record` 是同步、非阻塞的，不会给跳转或拦截增加延迟。
/// Clone 之后共享同一个缓冲区。
#[derive(Clone)]
pub struct StatsAggregator {
    buffer: Arc<StatsBuffer>,
    store: Arc<dyn StatsStore>,
    /// 每个页面最近一次返回给调用方的计数
    published: Arc<DashMap<String, StatsCounters>>,
    flush_interval: Duration,
    max_outcomes_before_flush: usize,
}

impl StatsAggregator {
    pub fn new(
        store: Arc<dyn StatsStore>,
        flush_interval: Duration,
        max_outcomes_before_flush: usize,
    ) -> Self {
        Self {
            buffer: Arc::new(StatsBuffer::new()),
            store,
            published: Arc::new(DashMap::new()),
            flush_interval,
            max_outcomes_before_flush: max_outcomes_before_flush.max(1),
        }
    }

    /// 记录一次访问结果（线程安全，无锁）
    pub fn record(&self, page_id: &str, outcome: Outcome) {
        let pending = self.buffer.record(page_id, &outcome.delta());
        trace!(
            "StatsAggregator: recorded {} for page {}, pending {}",
            outcome.as_ref(),
            page_id,
            pending
        );

        if pending >= self.max_outcomes_before_flush {
            self.spawn_threshold_flush();
        }
    }

    fn spawn_threshold_flush(&self) {
        // 没有运行时（比如同步 benchmark）时交给定时任务
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        // 只有成功把 flush_pending 从 false 设为 true 的调用方才 spawn
        if self
            .buffer
            .flush_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            let buffer = Arc::clone(&self.buffer);
            let store = Arc::clone(&self.store);
            handle.spawn(async move {
                if let Ok(_guard) = buffer.flush_lock.try_lock() {
                    Self::flush_buffer(&buffer, &store).await;
                } else {
                    trace!("StatsAggregator: flush already in progress, skipping");
                }
                buffer.flush_pending.store(false, Ordering::Release);
            });
        }
    }

    /// 后台定时刷盘（作为异步方法运行）
    pub async fn start_background_task(&self) {
        loop {
            sleep(self.flush_interval).await;

            debug!("StatsAggregator: Triggering scheduled flush");
            if let Ok(_guard) = self.buffer.flush_lock.try_lock() {
                Self::flush_buffer(&self.buffer, &self.store).await;
            } else {
                trace!("StatsAggregator: flush already in progress, skipping scheduled flush");
            }
        }
    }

    /// 手动刷盘（阻塞直到完成），返回是否成功
    pub async fn flush(&self) -> bool {
        let _guard = self.buffer.flush_lock.lock().await;
        Self::flush_buffer(&self.buffer, &self.store).await
    }

    async fn flush_buffer(buffer: &StatsBuffer, store: &Arc<dyn StatsStore>) -> bool {
        let updates = buffer.drain();
        if updates.is_empty() {
            trace!("StatsAggregator: Nothing to flush");
            return true;
        }

        let pages = updates.len();
        match store.apply(updates.clone()).await {
            Ok(()) => {
                debug!("StatsAggregator: Flushed counters for {} pages", pages);
                true
            }
            Err(e) => {
                buffer.restore(updates);
                warn!(
                    "StatsAggregator: store apply failed: {}, counters for {} pages kept in buffer",
                    e, pages
                );
                false
            }
        }
    }

    /// 读取页面计数：已持久化 + 缓冲中
    ///
    /// 刷盘过程中增量可能短暂两边都不可见，返回值对每个调用方都不会回退。
    pub async fn get_stats(&self, page_id: &str) -> Result<StatsCounters> {
        let stored = self.store.load(page_id).await.map_err(|e| {
            CloakError::storage(format!("failed to load stats for {}: {}", page_id, e))
        })?;
        let current = stored.saturating_add(self.buffer.snapshot(page_id));

        let mut published = self.published.entry(page_id.to_string()).or_default();
        *published = published.max(current);
        Ok(*published)
    }

    /// 页面删除后丢弃读取水位；缓冲中的增量照常刷盘
    pub fn forget(&self, page_id: &str) {
        self.published.remove(page_id);
    }

    /// 尚未刷盘的结果数（用于监控和关闭前日志）
    pub fn pending(&self) -> usize {
        self.buffer.pending_outcomes.load(Ordering::Relaxed)
    }

    /// 关闭前最后一次刷盘，失败时记录可能丢失的数量
    pub async fn shutdown(&self) {
        let pending = self.pending();
        if !self.flush().await {
            error!(
                "StatsAggregator: final flush failed, up to {} outcomes were not persisted",
                pending
            );
        }
    }
}
