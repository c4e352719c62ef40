//! StatsAggregator 性能基准测试

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pagecloak::analytics::{Outcome, StatsAggregator, StatsCounters, StatsStore};
use tokio::time::Duration;

/// 空 store，只用于测试 record 性能
struct NoopStore;

#[async_trait::async_trait]
impl StatsStore for NoopStore {
    async fn apply(&self, _deltas: Vec<(String, StatsCounters)>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn load(&self, _page_id: &str) -> anyhow::Result<StatsCounters> {
        Ok(StatsCounters::default())
    }
}

fn create_aggregator() -> StatsAggregator {
    StatsAggregator::new(
        Arc::new(NoopStore) as Arc<dyn StatsStore>,
        Duration::from_secs(3600), // 长间隔，避免自动刷盘
        usize::MAX,                // 高阈值，避免阈值刷盘
    )
}

/// 单线程 record 吞吐量
fn bench_record_single_thread(c: &mut Criterion) {
    let stats = create_aggregator();

    c.bench_function("record/single_thread", |b| {
        b.iter(|| {
            stats.record("page", Outcome::HumanServed);
        });
    });
}

/// 单线程 record 多个页面、多种结果
fn bench_record_mixed(c: &mut Criterion) {
    let stats = create_aggregator();
    let pages: Vec<String> = (0..1000).map(|i| format!("page_{}", i)).collect();
    let outcomes = [
        Outcome::HumanServed,
        Outcome::BotDetectedFake,
        Outcome::BlockedKnownBot,
        Outcome::BotDetectedRedirect,
    ];
    let mut idx = 0;

    c.bench_function("record/mixed_pages", |b| {
        b.iter(|| {
            stats.record(&pages[idx % pages.len()], outcomes[idx % outcomes.len()]);
            idx += 1;
        });
    });
}

/// 多线程并发 record
fn bench_concurrent_record(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("record/concurrent");

    for num_tasks in [2, 8, 32] {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::new("tasks", num_tasks),
            &num_tasks,
            |b, &num_tasks| {
                b.to_async(&rt).iter(|| async {
                    let stats = create_aggregator();
                    let mut handles = vec![];

                    for _ in 0..num_tasks {
                        let stats = stats.clone();
                        handles.push(tokio::spawn(async move {
                            for _ in 0..1000 / num_tasks {
                                stats.record("hot_page", Outcome::BotDetectedBlock);
                            }
                        }));
                    }

                    for handle in handles {
                        handle.await.unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

/// 预填充后 flush
fn bench_flush(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("flush");

    for num_pages in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(num_pages as u64));
        group.bench_with_input(
            BenchmarkId::new("pages", num_pages),
            &num_pages,
            |b, &num_pages| {
                b.iter_batched(
                    || {
                        let stats = create_aggregator();
                        for i in 0..num_pages {
                            stats.record(&format!("page_{}", i), Outcome::HumanServed);
                        }
                        stats
                    },
                    |stats| rt.block_on(stats.flush()),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_record_single_thread,
    bench_record_mixed,
    bench_concurrent_record,
    bench_flush,
);
criterion_main!(benches);
