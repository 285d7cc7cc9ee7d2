use chrono::{Duration, TimeZone, Utc};
use shingo_core::analysis::entity::{RangeEdge, WeightTable};
use shingo_core::common::Direction;
use shingo_core::config::AnalysisConfig;
use shingo_core::market::entity::Candle;
use shingo_v3::range::{self, RangeInputs};

fn candle(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64);
    Candle {
        open_time: start,
        close_time: start + Duration::hours(1),
        open,
        high,
        low,
        close,
        volume,
        quote_volume: close * volume,
        trades_count: 300,
        taker_buy_volume: volume / 2.0,
    }
}

/// 规整震荡的 1H 序列：收盘在 99/101 间交替，布林带 ≈ [98, 102]，
/// 上下影线反复触碰两侧边界。
fn oscillating_h1(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close: f64 = if i % 2 == 0 { 99.0 } else { 101.0 };
            candle(i, 100.0, close.max(100.0) + 0.6, close.min(100.0) - 0.6, close, 1000.0)
        })
        .collect()
}

fn balanced_m15(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| candle(i, 100.0, 100.3, 99.7, 100.0, 1000.0))
        .collect()
}

fn weights() -> WeightTable {
    WeightTable::new(&[
        ("vwap_mid", 0.2),
        ("touch", 0.2),
        ("volume", 0.2),
        ("delta", 0.15),
        ("oi", 0.15),
        ("no_breakout", 0.1),
    ])
}

#[test]
fn calm_oscillation_validates_both_boundaries() {
    let config = AnalysisConfig::default();
    let h1 = oscillating_h1(48);
    let m15 = balanced_m15(48);
    let inputs = RangeInputs {
        h1: &h1,
        m15: &m15,
        oi_change: Some(0.01),
    };
    let (upper, lower) = range::evaluate_boundaries(&inputs, &weights(), &config.range).unwrap();
    assert_eq!(upper.edge, RangeEdge::Upper);
    assert!(upper.valid && lower.valid);
    assert_eq!(upper.raw_score, 6);
    assert_eq!(lower.raw_score, 6);
    assert!((upper.weighted_score - 1.0).abs() < 1e-9);
    assert!(upper.level > lower.level);
}

#[test]
fn gate_uses_raw_count_not_weighted_score() {
    let config = AnalysisConfig::default();
    let mut h1 = oscillating_h1(48);
    // 量、Delta、OI 三个因子全部破坏：量比 2.0、买盘失衡、OI 剧烈波动
    let last = h1.len() - 1;
    h1[last].volume = 2000.0;
    h1[last].taker_buy_volume = 1000.0;
    let mut m15 = balanced_m15(48);
    let len = m15.len();
    for c in &mut m15[len - 6..] {
        c.taker_buy_volume = c.volume * 0.65; // 买卖盘比 ≈ 1.86
    }
    let inputs = RangeInputs {
        h1: &h1,
        m15: &m15,
        oi_change: Some(0.08),
    };
    // 剩余 3 个真因子只持有 0.5 的权重
    let skewed = WeightTable::new(&[
        ("vwap_mid", 0.1),
        ("touch", 0.2),
        ("volume", 0.2),
        ("delta", 0.15),
        ("oi", 0.15),
        ("no_breakout", 0.2),
    ]);
    let (upper, _) = range::evaluate_boundaries(&inputs, &skewed, &config.range).unwrap();
    assert_eq!(upper.raw_score, 3);
    // 加权分远低于 3，但门槛比较的是原始计数：边界仍然有效
    assert!(upper.weighted_score < 1.0);
    assert!(upper.valid);
}

#[test]
fn fake_breakout_of_upper_boundary_signals_short() {
    let config = AnalysisConfig::default();
    let h1 = oscillating_h1(48);
    let mut m15 = balanced_m15(48);
    let len = m15.len();
    // 倒数第二根上破上轨 102 后，末根收回界内并温和放量
    m15[len - 2] = candle(len - 2, 100.0, 102.5, 99.8, 101.5, 1000.0);
    m15[len - 1] = candle(len - 1, 101.5, 101.8, 100.6, 100.9, 1300.0);
    let inputs = RangeInputs {
        h1: &h1,
        m15: &m15,
        oi_change: Some(0.01),
    };
    let (upper, lower) = range::evaluate_boundaries(&inputs, &weights(), &config.range).unwrap();
    assert!(upper.valid);

    let breakout = range::detect_fake_breakout(&inputs, &upper, &lower, &config.range)
        .unwrap()
        .unwrap();
    assert_eq!(breakout.direction, Direction::Bear);
    assert_eq!(breakout.boundary, upper.level);
    assert_eq!(breakout.entry_price, 100.9);
    // 0.6 基础 + 0.2 放量；突破幅度 ≈0.49% 不在 [1%, 3%] 区间
    assert!((breakout.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn excessive_volume_invalidates_fake_breakout() {
    let config = AnalysisConfig::default();
    let h1 = oscillating_h1(48);
    let mut m15 = balanced_m15(48);
    let len = m15.len();
    m15[len - 2] = candle(len - 2, 100.0, 102.5, 99.8, 101.5, 1000.0);
    // 量比 2.5 > 2.0：更像真突破
    m15[len - 1] = candle(len - 1, 101.5, 101.8, 100.6, 100.9, 2500.0);
    let inputs = RangeInputs {
        h1: &h1,
        m15: &m15,
        oi_change: Some(0.01),
    };
    let (upper, lower) = range::evaluate_boundaries(&inputs, &weights(), &config.range).unwrap();
    let breakout = range::detect_fake_breakout(&inputs, &upper, &lower, &config.range).unwrap();
    assert!(breakout.is_none());
}
