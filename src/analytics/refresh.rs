//! 合并并发刷新
//!
//! 同一时间最多只有一个读取在进行，所有并发调用方共享同一个结果。
//! 读取至少持续 `min_busy`，避免界面上的忙碌状态一闪而过。

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{StatsAggregator, StatsCounters};
use crate::errors::Result;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

pub struct RefreshCoalescer<T> {
    in_flight: Mutex<Option<(u64, SharedFetch<T>)>>,
    next_generation: AtomicU64,
    fetches: AtomicU64,
    min_busy: Duration,
}

impl<T> RefreshCoalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(min_busy: Duration) -> Self {
        Self {
            in_flight: Mutex::new(None),
            next_generation: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            min_busy,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// 实际发起的读取次数
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// 加入进行中的读取，或者发起新的读取。第三个返回值表示是否新发起。
    ///
    /// 新发起的读取由独立任务驱动到结束并清空槽位，调用方中途取消不影响后续刷新。
    fn join_or_start<F, Fut>(self: &Arc<Self>, fetch: F) -> (u64, SharedFetch<T>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut slot = self.in_flight.lock();
        if let Some((generation, shared)) = slot.as_ref() {
            trace!("RefreshCoalescer: joining in-flight fetch #{}", generation);
            return (*generation, shared.clone(), false);
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let min_busy = self.min_busy;
        let fut = fetch();
        let shared = async move {
            let (result, ()) = tokio::join!(fut, tokio::time::sleep(min_busy));
            result
        }
        .boxed()
        .shared();

        *slot = Some((generation, shared.clone()));
        drop(slot);

        let this = Arc::clone(self);
        let driver = shared.clone();
        tokio::spawn(async move {
            let _ = driver.await;
            this.finish(generation);
        });

        (generation, shared, true)
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|(g, _)| *g == generation) {
            *slot = None;
        }
    }

    /// 刷新并等待结果；有读取在进行时直接复用
    pub async fn refresh<F, Fut>(self: &Arc<Self>, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (generation, shared, _) = self.join_or_start(fetch);
        let result = shared.await;
        // 驱动任务也会清空，这里提前清空让紧随其后的刷新一定重新读取
        self.finish(generation);
        result
    }

    /// 不等待结果的触发；已有读取在进行时忽略本次触发并返回 false
    pub fn trigger<F, Fut>(self: &Arc<Self>, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if self.is_busy() {
            return false;
        }
        let (_, _, started) = self.join_or_start(fetch);
        started
    }
}

/// 按页面合并的计数刷新
pub struct StatsRefresher {
    stats: StatsAggregator,
    coalescers: DashMap<String, Arc<RefreshCoalescer<StatsCounters>>>,
    min_busy: Duration,
}

impl StatsRefresher {
    pub fn new(stats: StatsAggregator, min_busy: Duration) -> Self {
        Self {
            stats,
            coalescers: DashMap::new(),
            min_busy,
        }
    }

    fn coalescer(&self, page_id: &str) -> Arc<RefreshCoalescer<StatsCounters>> {
        if let Some(existing) = self.coalescers.get(page_id) {
            return Arc::clone(existing.value());
        }
        let min_busy = self.min_busy;
        Arc::clone(
            self.coalescers
                .entry(page_id.to_string())
                .or_insert_with(|| Arc::new(RefreshCoalescer::new(min_busy)))
                .value(),
        )
    }

    pub async fn refresh(&self, page_id: &str) -> Result<StatsCounters> {
        let stats = self.stats.clone();
        let page = page_id.to_string();
        debug!("StatsRefresher: refresh requested for {}", page_id);
        let coalescer = self.coalescer(page_id);
        coalescer
            .refresh(move || async move { stats.get_stats(&page).await })
            .await
    }

    pub fn trigger(&self, page_id: &str) -> bool {
        let stats = self.stats.clone();
        let page = page_id.to_string();
        self.coalescer(page_id)
            .trigger(move || async move { stats.get_stats(&page).await })
    }

    pub fn is_busy(&self, page_id: &str) -> bool {
        self.coalescers
            .get(page_id)
            .is_some_and(|c| c.value().is_busy())
    }

    /// 页面删除后移除空闲的刷新状态
    pub fn forget(&self, page_id: &str) {
        self.coalescers.remove_if(page_id, |_, c| !c.is_busy());
    }

    pub fn tracked_pages(&self) -> usize {
        self.coalescers.len()
    }

    pub fn fetch_count(&self, page_id: &str) -> u64 {
        self.coalescers
            .get(page_id)
            .map(|c| c.value().fetch_count())
            .unwrap_or(0)
    }
}
