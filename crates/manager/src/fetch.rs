use shingo_core::common::TimeFrame;
use shingo_core::config::SchedulerConfig;
use shingo_core::market::entity::{Candle, MarketSnapshot, OpenInterestPoint};
use shingo_core::market::error::MarketError;
use shingo_core::market::port::MarketDataProvider;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// # Summary
/// 快照抓取器：一次调用抓齐单个交易对的全部分析输入。
///
/// # Invariants
/// - 各接口调用并发执行；每个调用独立地做有界重试（指数退避），
///   只对瞬时错误重试，永久错误立即失败。
/// - 抓取结果组装为不可变快照，供 V3 与 ICT 只读共享。
pub struct SnapshotFetcher {
    // 行情数据端口
    provider: Arc<dyn MarketDataProvider>,
    // 重试与窗口参数
    config: SchedulerConfig,
}

impl SnapshotFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: SchedulerConfig) -> Self {
        Self { provider, config }
    }

    /// # Summary
    /// 抓取一个交易对的完整行情快照。
    ///
    /// # Logic
    /// 1. 并发请求 1d/4h/1h/15m K 线、最新价、资金费率与持仓量历史。
    /// 2. 任一请求在重试耗尽后仍失败，则整个快照失败
    ///    （由调度层恢复为观望结果）。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    ///
    /// # Returns
    /// 成功返回 MarketSnapshot。
    pub async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, MarketError> {
        let (daily, h4, h1, m15, price, funding_rate, open_interest) = tokio::join!(
            self.klines(symbol, TimeFrame::Day1, self.config.limit_daily),
            self.klines(symbol, TimeFrame::Hour4, self.config.limit_h4),
            self.klines(symbol, TimeFrame::Hour1, self.config.limit_h1),
            self.klines(symbol, TimeFrame::Min15, self.config.limit_m15),
            self.ticker(symbol),
            self.funding(symbol),
            self.open_interest(symbol),
        );
        Ok(MarketSnapshot {
            symbol: symbol.to_string(),
            price: price?,
            funding_rate: funding_rate?,
            open_interest: open_interest?,
            daily: daily?,
            h4: h4?,
            h1: h1?,
            m15: m15?,
        })
    }

    async fn klines(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        self.with_retry(|| self.provider.get_klines(symbol, timeframe, limit))
            .await
    }

    async fn ticker(&self, symbol: &str) -> Result<f64, MarketError> {
        self.with_retry(|| self.provider.get_ticker(symbol)).await
    }

    async fn funding(&self, symbol: &str) -> Result<f64, MarketError> {
        self.with_retry(|| self.provider.get_funding_rate(symbol))
            .await
    }

    async fn open_interest(&self, symbol: &str) -> Result<Vec<OpenInterestPoint>, MarketError> {
        self.with_retry(|| {
            self.provider
                .get_open_interest_hist(symbol, TimeFrame::Hour1, self.config.oi_limit)
        })
        .await
    }

    /// # Summary
    /// 有界重试：瞬时错误按指数退避重试，永久错误与耗尽次数直接返回。
    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T, MarketError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, MarketError>>,
    {
        let mut attempt = 0usize;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.config.retry_attempts => {
                    let backoff =
                        Duration::from_millis(self.config.retry_backoff_ms << attempt.min(6));
                    tracing::warn!(attempt, error = %err, "transient fetch error, backing off");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
