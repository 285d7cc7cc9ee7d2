use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动（合约市场口径）。
///
/// # Invariants
/// - `high` 必须大于或等于 `max(open, close)`，`low` 必须小于或等于 `min(open, close)`。
/// - 序列由数据提供者按 `open_time` 升序产出。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    // K 线开始时间
    pub open_time: DateTime<Utc>,
    // K 线结束时间
    pub close_time: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量（标的数量）
    pub volume: f64,
    // 成交额（计价货币）
    pub quote_volume: f64,
    // 成交笔数
    pub trades_count: u64,
    // 主动买入成交量，用于推导 Delta 买卖盘比
    pub taker_buy_volume: f64,
}

impl Candle {
    /// 实体部分（收盘价 - 开盘价），符号即 K 线方向。
    pub fn body(&self) -> f64 {
        self.close - self.open
    }

    /// 全幅（最高价 - 最低价）。
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bull(&self) -> bool {
        self.close > self.open
    }

    /// 典型价 (H+L+C)/3，VWAP 的基础输入。
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// 主动卖出成交量（总量 - 主动买入）。
    pub fn taker_sell_volume(&self) -> f64 {
        self.volume - self.taker_buy_volume
    }

    /// # Summary
    /// 校验 K 线是否为结构良好的有效数据。
    ///
    /// # Logic
    /// 1. 所有价格字段必须为有限正数。
    /// 2. 成交量必须为有限非负数。
    /// 3. high/low 必须包住 open/close。
    ///
    /// # Returns
    /// 有效返回 true，否则 false（由指标层过滤并告警计数）。
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return false;
        }
        if !self.taker_buy_volume.is_finite() || self.taker_buy_volume < 0.0 {
            return false;
        }
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// # Summary
/// 持仓量历史采样点。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenInterestPoint {
    // 采样时间
    pub timestamp: DateTime<Utc>,
    // 全市场未平仓合约数量
    pub open_interest: f64,
}

/// # Summary
/// 单个交易对的行情快照：一次分析所需的全部市场数据。
/// 由调度层抓取一次后以只读方式共享给 V3 与 ICT 两条流水线。
///
/// # Invariants
/// - 各周期 K 线均按时间升序排列。
/// - 快照构建后不再变更（幂等性：同一快照 + 同一 `now` 必须产生相同结果）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    // 交易对代码（例如 BTCUSDT）
    pub symbol: String,
    // 最新成交价
    pub price: f64,
    // 当前资金费率
    pub funding_rate: f64,
    // 持仓量历史（1h 周期，含 6 小时变化所需样本）
    pub open_interest: Vec<OpenInterestPoint>,
    // 日线 K 线
    pub daily: Vec<Candle>,
    // 4 小时 K 线
    pub h4: Vec<Candle>,
    // 1 小时 K 线
    pub h1: Vec<Candle>,
    // 15 分钟 K 线
    pub m15: Vec<Candle>,
}

impl MarketSnapshot {
    /// # Summary
    /// 计算持仓量在最近 6 小时内的相对变化。
    ///
    /// # Logic
    /// 1. 取样本序列首尾（序列按时间升序，1h 采样下 7 个点覆盖 6 小时）。
    /// 2. 变化率 = (末值 - 首值) / 首值。
    ///
    /// # Returns
    /// 样本不足或首值非正时返回 None。
    pub fn oi_change_6h(&self) -> Option<f64> {
        let first = self.open_interest.first()?;
        let last = self.open_interest.last()?;
        if self.open_interest.len() < 2 || first.open_interest <= 0.0 {
            return None;
        }
        Some((last.open_interest - first.open_interest) / first.open_interest)
    }
}
