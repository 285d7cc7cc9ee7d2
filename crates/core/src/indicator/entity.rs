use serde::{Deserialize, Serialize};

/// # Summary
/// 布林带指标值。
///
/// # Invariants
/// - `upper >= middle >= lower`。
/// - `bandwidth = (upper - lower) / middle`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BollingerBands {
    // 上轨（中轨 + k 倍标准差）
    pub upper: f64,
    // 中轨（周期均线）
    pub middle: f64,
    // 下轨（中轨 - k 倍标准差）
    pub lower: f64,
    // 带宽比例
    pub bandwidth: f64,
}

/// # Summary
/// 指标快照：一个固定长度 K 线窗口上派生出的全部只读指标值。
/// 每次分析调用重新计算，从不作为可变状态持久化。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    // 20 周期简单均线
    pub ma20: f64,
    // 50 周期简单均线
    pub ma50: f64,
    // 200 周期简单均线
    pub ma200: f64,
    // 20 周期指数均线
    pub ema20: f64,
    // 50 周期指数均线
    pub ema50: f64,
    // 14 周期平均趋向指数
    pub adx14: f64,
    // 正向趋向指标
    pub di_plus: f64,
    // 负向趋向指标
    pub di_minus: f64,
    // 布林带 (20, 2)
    pub bollinger: BollingerBands,
    // 窗口滚动 VWAP
    pub vwap: f64,
    // 14 周期平均真实波幅
    pub atr14: f64,
}
