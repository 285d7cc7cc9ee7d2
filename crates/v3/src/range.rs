use shingo_core::analysis::entity::{
    BoundaryScore, FactorBreakdown, FactorValue, FakeBreakout, RangeEdge, WeightTable,
};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::Direction;
use shingo_core::config::RangeConfig;
use shingo_core::market::entity::Candle;
use shingo_indicator as indicator;

/// 区间分析的输入切片。
#[derive(Debug, Clone, Copy)]
pub struct RangeInputs<'a> {
    // 1H K 线（布林带边界、VWAP、量比、触碰统计）
    pub h1: &'a [Candle],
    // 15m K 线（Delta 与假突破检测）
    pub m15: &'a [Candle],
    // 持仓量 6 小时变化
    pub oi_change: Option<f64>,
}

/// # Summary
/// 1H 区间边界有效性评估：6 因子加权打分（双尺度设计）。
///
/// # Logic
/// 因子：VWAP 贴近区间中轴、近 6 小时触碰 ≥2 次、低量确认区间、
/// Delta 接近平衡、持仓量稳定、近期无边界收盘突破
/// （最后一项只在主流币模板中持有权重）。
/// 门槛比较原始因子计数（6 分制 ≥3，先于加权）；
/// 加权分由分类模板决定贡献构成，仅进入报告。
///
/// # Returns
/// (上轨评估, 下轨评估)。
pub fn evaluate_boundaries(
    inputs: &RangeInputs<'_>,
    weights: &WeightTable,
    config: &RangeConfig,
) -> Result<(BoundaryScore, BoundaryScore), AnalysisError> {
    let bands = indicator::bollinger(inputs.h1, 20, 2.0)?;
    let vwap_1h = indicator::vwap(inputs.h1, 24.min(inputs.h1.len()))?;
    let vol_1h = indicator::volume_ratio(inputs.h1, 20)?;
    let delta = indicator::delta_ratio(inputs.m15, config.delta_window)?;

    // 边界无关的共享因子
    let vwap_mid = (vwap_1h - bands.middle).abs() / bands.middle <= config.vwap_mid_tolerance;
    let low_volume = vol_1h <= config.low_volume_max;
    let delta_ok = (delta - 1.0).abs() <= config.delta_band;
    let oi_ok = inputs
        .oi_change
        .map(|change| change.abs() <= config.oi_stability_band)
        .unwrap_or(false);

    let shared = SharedFactors {
        vwap_mid,
        low_volume,
        delta_ok,
        oi_ok,
        delta,
    };
    let recent = &inputs.h1[inputs.h1.len().saturating_sub(config.touch_lookback)..];
    let upper = score_edge(RangeEdge::Upper, bands.upper, recent, &shared, weights, config);
    let lower = score_edge(RangeEdge::Lower, bands.lower, recent, &shared, weights, config);
    Ok((upper, lower))
}

// 与边界无关、对上下轨共享的因子取值
#[derive(Debug, Clone, Copy)]
struct SharedFactors {
    vwap_mid: bool,
    low_volume: bool,
    delta_ok: bool,
    oi_ok: bool,
    delta: f64,
}

fn score_edge(
    edge: RangeEdge,
    level: f64,
    recent: &[Candle],
    shared: &SharedFactors,
    weights: &WeightTable,
    config: &RangeConfig,
) -> BoundaryScore {
    let SharedFactors {
        vwap_mid,
        low_volume,
        delta_ok,
        oi_ok,
        delta,
    } = *shared;
    let touches = recent
        .iter()
        .filter(|c| match edge {
            RangeEdge::Upper => c.high >= level * (1.0 - config.touch_tolerance),
            RangeEdge::Lower => c.low <= level * (1.0 + config.touch_tolerance),
        })
        .count();
    let touch_ok = touches >= config.min_touches;

    let no_breakout = recent.iter().all(|c| match edge {
        RangeEdge::Upper => c.close <= level,
        RangeEdge::Lower => c.close >= level,
    });

    let checks = [vwap_mid, touch_ok, low_volume, delta_ok, oi_ok, no_breakout];
    let raw_score = checks.iter().map(|b| u8::from(*b)).sum::<u8>();

    let weighted_score = weights.weight("vwap_mid") * f64::from(u8::from(vwap_mid))
        + weights.weight("touch") * f64::from(u8::from(touch_ok))
        + weights.weight("volume") * f64::from(u8::from(low_volume))
        + weights.weight("delta") * f64::from(u8::from(delta_ok))
        + weights.weight("oi") * f64::from(u8::from(oi_ok))
        + weights.weight("no_breakout") * f64::from(u8::from(no_breakout));

    let mut factors = FactorBreakdown::new();
    factors.insert("vwap_mid".to_string(), FactorValue::Bool(vwap_mid));
    factors.insert("touch".to_string(), FactorValue::Bool(touch_ok));
    factors.insert("volume".to_string(), FactorValue::Bool(low_volume));
    factors.insert("delta".to_string(), FactorValue::Ratio(delta));
    factors.insert("oi".to_string(), FactorValue::Bool(oi_ok));
    factors.insert("no_breakout".to_string(), FactorValue::Bool(no_breakout));

    BoundaryScore {
        edge,
        level,
        valid: raw_score >= config.boundary_min_score,
        raw_score,
        weighted_score,
        factors,
    }
}

/// # Summary
/// 15m 假突破入场检测。
///
/// # Logic
/// 1. 15m 布林带宽必须低于窄带阈值（5%）。
/// 2. 前一根 K 线突破某个「有效」边界，当前 K 线收回界内：
///    上轨假突破做空、下轨假突破做多。
/// 3. 量比必须落在 [1.0, 2.0]——过高说明是真突破，反而失效。
/// 4. 置信度 = 0.6 基础 + 0.2 放量确认 + 0.2 突破幅度落在 [1%, 3%]。
///
/// # Returns
/// 检出返回 Some（两边同时触发时取置信度更高者）。
pub fn detect_fake_breakout(
    inputs: &RangeInputs<'_>,
    upper: &BoundaryScore,
    lower: &BoundaryScore,
    config: &RangeConfig,
) -> Result<Option<FakeBreakout>, AnalysisError> {
    let m15 = inputs.m15;
    if m15.len() < 22 {
        return Err(AnalysisError::InsufficientData {
            required: 22,
            actual: m15.len(),
        });
    }
    let bands = indicator::bollinger(m15, 20, 2.0)?;
    if bands.bandwidth >= config.narrow_bandwidth {
        return Ok(None);
    }

    let volume = indicator::volume_ratio(m15, 20)?;
    if volume < config.volume_min || volume > config.volume_max {
        return Ok(None);
    }

    let prev = &m15[m15.len() - 2];
    let current = &m15[m15.len() - 1];

    let mut best: Option<FakeBreakout> = None;
    if upper.valid && prev.high > upper.level && current.close < upper.level {
        let breach_ratio = (prev.high - upper.level) / upper.level;
        best = pick(best, build(Direction::Bear, upper.level, current.close, breach_ratio, volume, config));
    }
    if lower.valid && prev.low < lower.level && current.close > lower.level {
        let breach_ratio = (lower.level - prev.low) / lower.level;
        best = pick(best, build(Direction::Bull, lower.level, current.close, breach_ratio, volume, config));
    }
    Ok(best)
}

fn build(
    direction: Direction,
    boundary: f64,
    entry_price: f64,
    breach_ratio: f64,
    volume_ratio: f64,
    config: &RangeConfig,
) -> FakeBreakout {
    let confidence = 0.6
        + 0.2 * f64::from(u8::from(volume_ratio >= 1.2))
        + 0.2 * f64::from(u8::from(
            breach_ratio >= config.breach_min && breach_ratio <= config.breach_max,
        ));
    FakeBreakout {
        direction,
        boundary,
        entry_price,
        breach_ratio,
        volume_ratio,
        confidence,
    }
}

fn pick(best: Option<FakeBreakout>, candidate: FakeBreakout) -> Option<FakeBreakout> {
    match best {
        Some(prev) if prev.confidence >= candidate.confidence => Some(prev),
        _ => Some(candidate),
    }
}
