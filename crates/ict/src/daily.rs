use serde::{Deserialize, Serialize};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::MarketRegime;
use shingo_core::config::IctConfig;
use shingo_core::market::entity::Candle;
use shingo_indicator as indicator;

/// # Summary
/// 日线趋势评分（3 分制，带符号）。
///
/// # Invariants
/// - `total = structure + ma_alignment + volume`，取值范围 [-2, +3]。
/// - 横盘判定会让整条 ICT 流水线短路为观望。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTrend {
    // 结构因子：HH+HL 为 +1，LH+LL 为 -1
    pub structure: i8,
    // 均线排列因子：close>MA20>MA50 为 +1，反向为 -1
    pub ma_alignment: i8,
    // 放量因子：高于 1.2 倍均量为 +1
    pub volume: i8,
    // 总分
    pub total: i8,
    // 趋势判定
    pub trend: MarketRegime,
}

/// # Summary
/// 计算日线趋势评分。
///
/// # Logic
/// 1. 结构：最近 10 根 K 线对半切分，后半段同时抬高高点与低点记 +1，
///    同时压低记 -1，否则 0。
/// 2. 均线排列：close>MA20>MA50 记 +1，close<MA20<MA50 记 -1。
/// 3. 成交量：当前量 > 1.2 × 20 期均量记 +1（只加分不减分）。
/// 总分 ≥ +2 判多头，≤ -2 判空头，其余横盘。
///
/// # Returns
/// 成功返回 DailyTrend；窗口不足返回 InsufficientData。
pub fn evaluate(daily: &[Candle], config: &IctConfig) -> Result<DailyTrend, AnalysisError> {
    let lookback = config.structure_lookback;
    if daily.len() < lookback.max(51) {
        return Err(AnalysisError::InsufficientData {
            required: lookback.max(51),
            actual: daily.len(),
        });
    }

    let recent = &daily[daily.len() - lookback..];
    let (earlier, later) = recent.split_at(lookback / 2);
    let earlier_high = earlier.iter().fold(f64::MIN, |acc, c| acc.max(c.high));
    let later_high = later.iter().fold(f64::MIN, |acc, c| acc.max(c.high));
    let earlier_low = earlier.iter().fold(f64::MAX, |acc, c| acc.min(c.low));
    let later_low = later.iter().fold(f64::MAX, |acc, c| acc.min(c.low));

    let structure = if later_high > earlier_high && later_low > earlier_low {
        1
    } else if later_high < earlier_high && later_low < earlier_low {
        -1
    } else {
        0
    };

    let ma20 = indicator::sma(daily, 20)?;
    let ma50 = indicator::sma(daily, 50)?;
    let close = daily[daily.len() - 1].close;
    let ma_alignment = if close > ma20 && ma20 > ma50 {
        1
    } else if close < ma20 && ma20 < ma50 {
        -1
    } else {
        0
    };

    let volume = i8::from(indicator::volume_ratio(daily, 20)? >= config.daily_volume_ratio);

    let total = structure + ma_alignment + volume;
    let trend = if total >= config.daily_min_score {
        MarketRegime::TrendUp
    } else if total <= -config.daily_min_score {
        MarketRegime::TrendDown
    } else {
        MarketRegime::Ranging
    };

    Ok(DailyTrend {
        structure,
        ma_alignment,
        volume,
        total,
        trend,
    })
}
