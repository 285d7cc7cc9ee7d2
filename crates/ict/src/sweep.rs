use shingo_core::analysis::entity::SweepEvent;
use shingo_core::common::Direction;
use shingo_core::market::entity::Candle;

/// 扫荡检测参数：宏观 (4H) 与微观 (15m) 共用同一算法、不同阈值。
#[derive(Debug, Clone, Copy)]
pub struct SweepParams {
    // 摆动点检测回看根数
    pub lookback: usize,
    // 摆动点两侧窗口宽度
    pub window: usize,
    // 最小摆动幅度（相对价格）
    pub min_swing_pct: f64,
    // 收回 K 线数上限
    pub max_bars: usize,
    // 速度阈值 = speed_atr_ratio × ATR(周期)
    pub speed_atr_ratio: f64,
}

/// # Summary
/// 检测窗口内全部已完成的流动性扫荡事件（刺穿后已收回）。
///
/// # Logic
/// 1. 摆动高点：高点严格高于两侧窗口内的所有高点，且摆动幅度
///    （高点相对邻域最低点）≥ 最小摆动幅度。摆动低点取镜像。
/// 2. 自摆动点之后扫描首个刺穿 K 线；自刺穿起计数，直到首根收盘
///    回到摆动位另一侧的 K 线为止（含），即 `bars_to_return`。
/// 3. `exceed_amount` 取刺穿期间的最大越界幅度，
///    `speed = exceed_amount / bars_to_return`。
/// 有效性（bars ≤ 上限 且 speed ≥ 阈值×ATR）由调用方经
/// [`SweepEvent::is_valid`] 判定，本函数产出全部完成的事件以供诊断。
///
/// # Returns
/// 全部完成的扫荡事件，按摆动点时间升序。
pub fn detect_sweeps(candles: &[Candle], params: &SweepParams) -> Vec<SweepEvent> {
    let mut events = Vec::new();
    let n = candles.len();
    if n < 2 * params.window + 2 {
        return events;
    }
    let start = n.saturating_sub(params.lookback);

    for i in (start + params.window)..(n - params.window) {
        if let Some(event) = sweep_of_high(candles, i, params) {
            events.push(event);
        }
        if let Some(event) = sweep_of_low(candles, i, params) {
            events.push(event);
        }
    }
    events
}

/// 有效事件中速度最高者（引擎以其方向为偏置）。
pub fn best_valid_sweep(
    events: &[SweepEvent],
    max_bars: usize,
    min_speed: f64,
) -> Option<SweepEvent> {
    events
        .iter()
        .filter(|e| e.is_valid(max_bars, min_speed))
        .max_by(|a, b| a.speed.total_cmp(&b.speed))
        .cloned()
}

fn is_swing_high(candles: &[Candle], i: usize, params: &SweepParams) -> bool {
    let level = candles[i].high;
    let before = &candles[i - params.window..i];
    let after = &candles[i + 1..=i + params.window];
    if !before.iter().chain(after.iter()).all(|c| c.high < level) {
        return false;
    }
    let neighborhood_low = before
        .iter()
        .chain(after.iter())
        .fold(candles[i].low, |acc, c| acc.min(c.low));
    (level - neighborhood_low) / level >= params.min_swing_pct
}

fn is_swing_low(candles: &[Candle], i: usize, params: &SweepParams) -> bool {
    let level = candles[i].low;
    let before = &candles[i - params.window..i];
    let after = &candles[i + 1..=i + params.window];
    if !before.iter().chain(after.iter()).all(|c| c.low > level) {
        return false;
    }
    let neighborhood_high = before
        .iter()
        .chain(after.iter())
        .fold(candles[i].high, |acc, c| acc.max(c.high));
    (neighborhood_high - level) / level >= params.min_swing_pct
}

/// 摆动高点扫荡：刺穿前高后快速收回 => 空头偏置。
fn sweep_of_high(candles: &[Candle], i: usize, params: &SweepParams) -> Option<SweepEvent> {
    if !is_swing_high(candles, i, params) {
        return None;
    }
    let level = candles[i].high;
    let pierce = (i + params.window + 1..candles.len()).find(|&j| candles[j].high > level)?;

    let mut exceed = 0.0f64;
    for (offset, candle) in candles[pierce..].iter().enumerate() {
        exceed = exceed.max(candle.high - level);
        if candle.close < level {
            let bars = offset + 1;
            return Some(SweepEvent {
                swing_level: level,
                direction: Direction::Bear,
                exceed_amount: exceed,
                bars_to_return: bars,
                speed: exceed / bars as f64,
            });
        }
    }
    None
}

/// 摆动低点扫荡：刺穿前低后快速收回 => 多头偏置。
fn sweep_of_low(candles: &[Candle], i: usize, params: &SweepParams) -> Option<SweepEvent> {
    if !is_swing_low(candles, i, params) {
        return None;
    }
    let level = candles[i].low;
    let pierce = (i + params.window + 1..candles.len()).find(|&j| candles[j].low < level)?;

    let mut exceed = 0.0f64;
    for (offset, candle) in candles[pierce..].iter().enumerate() {
        exceed = exceed.max(level - candle.low);
        if candle.close > level {
            let bars = offset + 1;
            return Some(SweepEvent {
                swing_level: level,
                direction: Direction::Bull,
                exceed_amount: exceed,
                bars_to_return: bars,
                speed: exceed / bars as f64,
            });
        }
    }
    None
}
