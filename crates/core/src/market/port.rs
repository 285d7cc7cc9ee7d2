use crate::common::TimeFrame;
use crate::market::entity::{Candle, OpenInterestPoint};
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 所有方法必须可以按交易对并发调用，实现内部不得持有跨调用可变状态。
/// - 返回的 K 线序列必须按 `open_time` 升序排列。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取特定交易对在指定周期下的最近 K 线序列。
    ///
    /// # Logic
    /// 1. 构建数据源请求 (symbol, interval, limit)。
    /// 2. 执行网络请求并解析响应数据。
    /// 3. 按时间升序返回，最后一根可能尚未收盘。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    /// * `timeframe`: K 线周期。
    /// * `limit`: 请求的数量上限。
    ///
    /// # Returns
    /// 成功返回 K 线列表，失败返回 MarketError。
    async fn get_klines(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError>;

    /// # Summary
    /// 获取当前最新成交价。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    ///
    /// # Returns
    /// 成功返回最新价格。
    async fn get_ticker(&self, symbol: &str) -> Result<f64, MarketError>;

    /// # Summary
    /// 获取当前资金费率。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    ///
    /// # Returns
    /// 成功返回资金费率（小数形式，例如 0.0001 = 0.01%）。
    async fn get_funding_rate(&self, symbol: &str) -> Result<f64, MarketError>;

    /// # Summary
    /// 获取持仓量历史序列。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    /// * `period`: 采样周期。
    /// * `limit`: 样本数量上限。
    ///
    /// # Returns
    /// 成功返回按时间升序的持仓量采样点列表。
    async fn get_open_interest_hist(
        &self,
        symbol: &str,
        period: TimeFrame,
        limit: usize,
    ) -> Result<Vec<OpenInterestPoint>, MarketError>;
}
