use shingo_core::analysis::entity::{ExecutionMode, ExecutionSignal};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::Direction;
use shingo_core::config::ExecutionConfig;
use shingo_core::market::entity::Candle;
use shingo_indicator as indicator;

/// # Summary
/// 15m 执行分析器：两个互斥入场模式的独立评估。
///
/// # Logic
/// - 模式 A（回踩确认）：价格贴近 1H VWAP、位于 EMA20/EMA50 的正确一侧、
///   前一根 K 线关系成立、量比达标。四个子项按权重累加置信度，
///   置信度 ≥ 0.6 才有效。
/// - 模式 B（动能突破）：收盘突破设置 K 线高/低点、量比 ≥1.5、
///   突破距离 > 0.1%。前三项即决定有效性；「收盘守住突破位」只加置信度。
/// - 两个模式同时有效时取置信度更高者。
///
/// # Arguments
/// * `m15`: 已过滤的 15m K 线（末根为当前 K 线，倒数第二根为设置 K 线）。
/// * `h1`: 已过滤的 1H K 线（VWAP 锚点）。
/// * `direction`: 小时级打分给出的方向。
///
/// # Returns
/// 有入场信号返回 Some，否则 None；窗口不足返回 InsufficientData。
pub fn evaluate(
    m15: &[Candle],
    h1: &[Candle],
    direction: Direction,
    config: &ExecutionConfig,
) -> Result<Option<ExecutionSignal>, AnalysisError> {
    if m15.len() < 52 {
        return Err(AnalysisError::InsufficientData {
            required: 52,
            actual: m15.len(),
        });
    }
    let current = &m15[m15.len() - 1];
    let setup = &m15[m15.len() - 2];
    let entry = current.close;

    let volume = indicator::volume_ratio(m15, 20)?;
    let pullback = evaluate_pullback(m15, h1, direction, entry, volume, config)?;
    let breakout = evaluate_breakout(current, setup, direction, entry, volume, config);

    let signal = match (pullback, breakout) {
        (Some(a), Some(b)) => Some(if a.confidence >= b.confidence { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };
    Ok(signal)
}

fn evaluate_pullback(
    m15: &[Candle],
    h1: &[Candle],
    direction: Direction,
    entry: f64,
    volume: f64,
    config: &ExecutionConfig,
) -> Result<Option<ExecutionSignal>, AnalysisError> {
    let vwap_1h = indicator::vwap(h1, 24.min(h1.len()))?;
    let ema20 = indicator::ema(m15, 20)?;
    let ema50 = indicator::ema(m15, 50)?;
    let current = &m15[m15.len() - 1];
    let prior = &m15[m15.len() - 2];

    let near_vwap = (entry - vwap_1h).abs() / vwap_1h <= config.vwap_tolerance;
    let ema_side = match direction {
        Direction::Bull => entry > ema20 && entry > ema50,
        Direction::Bear => entry < ema20 && entry < ema50,
    };
    let prior_confirm = match direction {
        Direction::Bull => current.close > prior.high,
        Direction::Bear => current.close < prior.low,
    };
    let volume_ok = volume >= config.pullback_volume_ratio;

    let confidence = 0.3 * f64::from(u8::from(near_vwap))
        + 0.3 * f64::from(u8::from(ema_side))
        + 0.2 * f64::from(u8::from(prior_confirm))
        + 0.2 * f64::from(u8::from(volume_ok));

    if confidence < config.min_confidence {
        return Ok(None);
    }
    Ok(Some(ExecutionSignal {
        mode: ExecutionMode::Pullback,
        direction,
        entry_price: entry,
        setup_high: prior.high,
        setup_low: prior.low,
        confidence,
    }))
}

fn evaluate_breakout(
    current: &Candle,
    setup: &Candle,
    direction: Direction,
    entry: f64,
    volume: f64,
    config: &ExecutionConfig,
) -> Option<ExecutionSignal> {
    let (broke, distance) = match direction {
        Direction::Bull => (
            current.close > setup.high,
            (current.close - setup.high) / setup.high,
        ),
        Direction::Bear => (
            current.close < setup.low,
            (setup.low - current.close) / setup.low,
        ),
    };
    let volume_ok = volume >= config.breakout_volume_ratio;
    let distance_ok = distance > config.min_breakout_distance;

    if !(broke && volume_ok && distance_ok) {
        return None;
    }

    // 收盘守住：K 线实体与突破方向一致
    let holds = match direction {
        Direction::Bull => current.body() > 0.0,
        Direction::Bear => current.body() < 0.0,
    };
    let confidence = 0.6 + 0.2 * f64::from(u8::from(holds)) + 0.2 * f64::from(u8::from(volume >= 2.0));

    Some(ExecutionSignal {
        mode: ExecutionMode::Breakout,
        direction,
        entry_price: entry,
        setup_high: setup.high,
        setup_low: setup.low,
        confidence,
    })
}
