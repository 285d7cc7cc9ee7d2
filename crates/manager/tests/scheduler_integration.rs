use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shingo_core::common::{SignalKind, StrategyType, TimeFrame};
use shingo_core::config::{AnalysisConfig, SchedulerConfig};
use shingo_core::market::entity::{Candle, OpenInterestPoint};
use shingo_core::market::error::MarketError;
use shingo_core::market::port::MarketDataProvider;
use shingo_manager::{BuiltinCategorySource, MemoryResultStore, SignalScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()
}

/// # Summary
/// 为测试提供的模拟行情驱动：平静横盘数据，指定交易对恒定失败，
/// 可选地在每次调用前人为挂起以触发截止时间。
struct MockProvider {
    // 恒定返回网络错误的交易对
    failing_symbol: Option<String>,
    // 每次调用前挂起的时长（虚拟时间）
    delay: Option<std::time::Duration>,
    // 调用计数（验证重试次数）
    calls: AtomicUsize,
}

impl MockProvider {
    fn flat() -> Self {
        Self {
            failing_symbol: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(symbol: &str) -> Self {
        Self {
            failing_symbol: Some(symbol.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(delay: std::time::Duration) -> Self {
        Self {
            failing_symbol: None,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    async fn guard(&self, symbol: &str) -> Result<(), MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_symbol.as_deref() == Some(symbol) {
            return Err(MarketError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    fn flat_candles(timeframe: TimeFrame, limit: usize) -> Vec<Candle> {
        let span = match timeframe {
            TimeFrame::Min15 => Duration::minutes(15),
            TimeFrame::Hour1 => Duration::hours(1),
            TimeFrame::Hour4 => Duration::hours(4),
            TimeFrame::Day1 => Duration::days(1),
        };
        (0..limit)
            .map(|i| {
                let start = base_time() + span * i as i32;
                Candle {
                    open_time: start,
                    close_time: start + span,
                    open: 100.0,
                    high: 100.5,
                    low: 99.5,
                    close: 100.0,
                    volume: 1000.0,
                    quote_volume: 100_000.0,
                    trades_count: 250,
                    taker_buy_volume: 500.0,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn get_klines(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        self.guard(symbol).await?;
        Ok(Self::flat_candles(timeframe, limit))
    }

    async fn get_ticker(&self, symbol: &str) -> Result<f64, MarketError> {
        self.guard(symbol).await?;
        Ok(100.0)
    }

    async fn get_funding_rate(&self, symbol: &str) -> Result<f64, MarketError> {
        self.guard(symbol).await?;
        Ok(0.0001)
    }

    async fn get_open_interest_hist(
        &self,
        symbol: &str,
        _period: TimeFrame,
        limit: usize,
    ) -> Result<Vec<OpenInterestPoint>, MarketError> {
        self.guard(symbol).await?;
        Ok((0..limit)
            .map(|i| OpenInterestPoint {
                timestamp: base_time() + Duration::hours(i as i64),
                open_interest: 1_000_000.0,
            })
            .collect())
    }
}

fn scheduler_config(symbols: &[&str]) -> SchedulerConfig {
    SchedulerConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        ..SchedulerConfig::default()
    }
}

fn build(
    provider: Arc<MockProvider>,
    store: Arc<MemoryResultStore>,
    config: SchedulerConfig,
) -> Arc<SignalScheduler> {
    SignalScheduler::new(
        provider,
        Arc::new(BuiltinCategorySource::new()),
        store,
        AnalysisConfig::default(),
        config,
    )
}

#[tokio::test]
async fn quiet_market_publishes_wait_results_for_both_strategies() {
    let store = Arc::new(MemoryResultStore::new());
    let scheduler = build(
        Arc::new(MockProvider::flat()),
        store.clone(),
        scheduler_config(&["BTCUSDT"]),
    );
    let results = scheduler.scan_all(base_time()).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.signal == SignalKind::Wait));
    assert!(results.iter().all(|r| r.error.is_none()));

    let v3 = store.get("BTCUSDT", StrategyType::V3).unwrap();
    assert_eq!(v3.signal, SignalKind::Wait);
    assert!(v3.breakdown.is_object());
    let ict = store.get("BTCUSDT", StrategyType::Ict).unwrap();
    assert_eq!(ict.signal, SignalKind::Wait);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn one_failing_symbol_does_not_poison_the_batch() {
    let store = Arc::new(MemoryResultStore::new());
    let scheduler = build(
        Arc::new(MockProvider::failing("FAILUSDT")),
        store.clone(),
        scheduler_config(&["FAILUSDT", "BTCUSDT"]),
    );
    let results = scheduler.scan_all(base_time()).await;
    assert_eq!(results.len(), 4);

    // 失败交易对：观望 + 诊断字段记录上游错误
    let failed = store.get("FAILUSDT", StrategyType::V3).unwrap();
    assert_eq!(failed.signal, SignalKind::Wait);
    let diagnostic = failed.error.unwrap();
    assert!(diagnostic.contains("upstream unavailable"));

    // 健康交易对照常产出，不受影响
    let healthy = store.get("BTCUSDT", StrategyType::V3).unwrap();
    assert!(healthy.error.is_none());
    assert!(healthy.breakdown.is_object());
}

#[tokio::test(start_paused = true)]
async fn deadline_overrun_degrades_to_wait() {
    let store = Arc::new(MemoryResultStore::new());
    let mut config = scheduler_config(&["BTCUSDT"]);
    config.symbol_deadline_secs = 1;
    let scheduler = build(
        Arc::new(MockProvider::slow(std::time::Duration::from_secs(120))),
        store.clone(),
        config,
    );
    let results = scheduler.scan_all(base_time()).await;
    assert_eq!(results.len(), 2);
    for result in results {
        assert_eq!(result.signal, SignalKind::Wait);
        assert_eq!(result.error.as_deref(), Some("deadline exceeded"));
    }
}

#[tokio::test]
async fn transient_failures_are_retried_with_a_bounded_cap() {
    let store = Arc::new(MemoryResultStore::new());
    let provider = Arc::new(MockProvider::failing("FAILUSDT"));
    let config = scheduler_config(&["FAILUSDT"]);
    let retry_attempts = config.retry_attempts;
    let scheduler = build(provider.clone(), store, config);
    let _results = scheduler.scan_all(base_time()).await;

    // 7 个并发请求，每个最多 retry_attempts 次
    let calls = provider.calls.load(Ordering::SeqCst);
    assert!(calls <= 7 * retry_attempts);
    assert!(calls >= 7);
}

#[tokio::test]
async fn rescanning_the_same_snapshot_is_idempotent() {
    let store = Arc::new(MemoryResultStore::new());
    let scheduler = build(
        Arc::new(MockProvider::flat()),
        store,
        scheduler_config(&["BTCUSDT"]),
    );
    let now = base_time();
    let mut first = scheduler.scan_all(now).await;
    let mut second = scheduler.scan_all(now).await;
    let key = |r: &shingo_core::analysis::entity::StrategyResult| {
        (r.symbol.clone(), format!("{}", r.strategy_type))
    };
    first.sort_by_key(key);
    second.sort_by_key(key);
    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}
