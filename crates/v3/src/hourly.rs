use shingo_core::analysis::entity::{FactorBreakdown, FactorValue, HourlyScore, WeightTable};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::{Direction, SignalKind};
use shingo_core::config::HourlyConfig;
use shingo_core::market::entity::Candle;
use shingo_indicator as indicator;

/// 1H 打分的输入切片（由上层从快照中整理好的已过滤数据）。
#[derive(Debug, Clone, Copy)]
pub struct HourlyInputs<'a> {
    // 最新成交价
    pub price: f64,
    // 4H K 线（突破回看）
    pub h4: &'a [Candle],
    // 1H K 线（VWAP 与量比）
    pub h1: &'a [Candle],
    // 15m K 线（量比与 Delta）
    pub m15: &'a [Candle],
    // 当前资金费率
    pub funding_rate: f64,
    // 持仓量 6 小时变化
    pub oi_change: Option<f64>,
}

/// # Summary
/// 1H 多因子打分器（6 分制），仅在 4H 判定为趋势市时运行。
///
/// # Logic
/// 1. VWAP 硬门槛：价格必须位于 1H VWAP 的趋势侧；不满足则直接归零观望，
///    不给任何部分分。门槛通过本身计入第 1 分。
/// 2. 其余 5 个因子各 0-1 分：
///    - 突破：价格越过最近 20 根 4H K 线的高/低点（按方向取边）。
///    - 双重放量：15m 量比与 1h 量比同时达标（二者缺一不可）。
///    - 持仓量：做多需 6h 变化 ≥ +2%，做空需 ≤ -3%（非对称设计）。
///    - 资金费率：绝对值在上限以内。
///    - Delta：买卖盘比做多 ≥1.2、做空 ≤0.8。
/// 3. 入场许可 = 门槛通过且原始分 ≥ 3。分类加权只产出报告用强度，不参与门槛。
///
/// # Returns
/// 成功返回 HourlyScore；任一窗口不足返回 InsufficientData。
pub fn evaluate(
    inputs: &HourlyInputs<'_>,
    direction: Direction,
    weights: &WeightTable,
    config: &HourlyConfig,
) -> Result<HourlyScore, AnalysisError> {
    if inputs.h4.len() < config.breakout_lookback + 1 {
        return Err(AnalysisError::InsufficientData {
            required: config.breakout_lookback + 1,
            actual: inputs.h4.len(),
        });
    }
    let vwap_1h = indicator::vwap(inputs.h1, 24.min(inputs.h1.len()))?;
    let gate = match direction {
        Direction::Bull => inputs.price > vwap_1h,
        Direction::Bear => inputs.price < vwap_1h,
    };

    let mut factors = FactorBreakdown::new();
    factors.insert("vwap".to_string(), FactorValue::Bool(gate));

    if !gate {
        // 硬门槛：价格在 VWAP 的错误一侧，其余因子再有利也不给分
        return Ok(HourlyScore::wait(false, factors));
    }

    // 突破回看不含最新一根未收盘 K 线
    let prior_h4 = &inputs.h4[..inputs.h4.len() - 1];
    let breakout = match direction {
        Direction::Bull => {
            inputs.price > indicator::highest_high(prior_h4, config.breakout_lookback)?
        }
        Direction::Bear => {
            inputs.price < indicator::lowest_low(prior_h4, config.breakout_lookback)?
        }
    };

    let vol_15m = indicator::volume_ratio(inputs.m15, 20)?;
    let vol_1h = indicator::volume_ratio(inputs.h1, 20)?;
    let volume = vol_15m >= config.vol15m_ratio && vol_1h >= config.vol1h_ratio;

    let oi = match (direction, inputs.oi_change) {
        (Direction::Bull, Some(change)) => change >= config.oi_long_min,
        (Direction::Bear, Some(change)) => change <= config.oi_short_max,
        (_, None) => false,
    };

    let funding = inputs.funding_rate.abs() <= config.funding_abs_max;

    let delta = indicator::delta_ratio(inputs.m15, config.delta_window)?;
    let delta_ok = match direction {
        Direction::Bull => delta >= config.delta_long_min,
        Direction::Bear => delta <= config.delta_short_max,
    };

    factors.insert("breakout".to_string(), FactorValue::Bool(breakout));
    factors.insert("volume".to_string(), FactorValue::Bool(volume));
    factors.insert("volume_15m".to_string(), FactorValue::Ratio(vol_15m));
    factors.insert("volume_1h".to_string(), FactorValue::Ratio(vol_1h));
    factors.insert("oi".to_string(), FactorValue::Bool(oi));
    factors.insert("funding".to_string(), FactorValue::Bool(funding));
    factors.insert("delta".to_string(), FactorValue::Ratio(delta));

    let score = 1
        + u8::from(breakout)
        + u8::from(volume)
        + u8::from(oi)
        + u8::from(funding)
        + u8::from(delta_ok);

    // 报告用加权强度：六个规范因子按分类模板加权
    let weighted_strength = weights.weight("vwap")
        + weights.weight("breakout") * f64::from(u8::from(breakout))
        + weights.weight("volume") * f64::from(u8::from(volume))
        + weights.weight("oi") * f64::from(u8::from(oi))
        + weights.weight("funding") * f64::from(u8::from(funding))
        + weights.weight("delta") * f64::from(u8::from(delta_ok));

    let signal = if score >= config.min_score {
        SignalKind::from_direction(direction)
    } else {
        SignalKind::Wait
    };

    Ok(HourlyScore {
        vwap_gate_passed: true,
        score,
        signal,
        factors,
        weighted_strength,
    })
}
