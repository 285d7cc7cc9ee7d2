use chrono::{Duration, TimeZone, Utc};
use shingo_core::analysis::entity::ExecutionMode;
use shingo_core::common::Direction;
use shingo_core::config::AnalysisConfig;
use shingo_core::market::entity::Candle;
use shingo_v3::execution;

fn candle(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::minutes(15 * i as i64);
    Candle {
        open_time: start,
        close_time: start + Duration::minutes(15),
        open,
        high,
        low,
        close,
        volume,
        quote_volume: close * volume,
        trades_count: 150,
        taker_buy_volume: volume / 2.0,
    }
}

fn flat_m15(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| candle(i, price, price + 0.5, price - 0.5, price, 1000.0))
        .collect()
}

fn flat_h1(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| candle(i, price, price + 0.5, price - 0.5, price, 1000.0))
        .collect()
}

#[test]
fn breakout_mode_wins_when_both_modes_are_valid() {
    let config = AnalysisConfig::default();
    let mut m15 = flat_m15(60, 100.0);
    // 末根放量收出突破设置 K 线高点的阳线：距离 0.3/100.5 ≈ 0.3% > 0.1%
    let last = m15.len() - 1;
    m15[last] = candle(last, 100.0, 100.9, 99.8, 100.8, 2000.0);
    let h1 = flat_h1(48, 100.0);

    let signal = execution::evaluate(&m15, &h1, Direction::Bull, &config.execution)
        .unwrap()
        .unwrap();
    assert_eq!(signal.mode, ExecutionMode::Breakout);
    assert_eq!(signal.direction, Direction::Bull);
    assert_eq!(signal.entry_price, 100.8);
    // 0.6 基础 + 0.2 收盘守住 + 0.2 量比 ≥ 2
    assert!((signal.confidence - 1.0).abs() < 1e-9);
    // 设置 K 线为倒数第二根
    assert_eq!(signal.setup_high, 100.5);
    assert_eq!(signal.setup_low, 99.5);
}

#[test]
fn pullback_mode_triggers_near_vwap_without_breakout() {
    let config = AnalysisConfig::default();
    let mut m15 = flat_m15(60, 100.0);
    // 贴近 VWAP 的确认阳线：未突破设置高点，量比 1.3
    let last = m15.len() - 1;
    m15[last] = candle(last, 100.0, 100.2, 99.9, 100.1, 1300.0);
    let h1 = flat_h1(48, 100.0);

    let signal = execution::evaluate(&m15, &h1, Direction::Bull, &config.execution)
        .unwrap()
        .unwrap();
    assert_eq!(signal.mode, ExecutionMode::Pullback);
    // 0.3 VWAP + 0.3 EMA + 0.2 量比；前高确认未达成
    assert!((signal.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn quiet_market_produces_no_signal() {
    let config = AnalysisConfig::default();
    let m15 = flat_m15(60, 100.0);
    let h1 = flat_h1(48, 100.0);
    let signal = execution::evaluate(&m15, &h1, Direction::Bull, &config.execution).unwrap();
    assert!(signal.is_none());
}

#[test]
fn short_breakout_mirrors_the_long_path() {
    let config = AnalysisConfig::default();
    let mut m15 = flat_m15(60, 100.0);
    let last = m15.len() - 1;
    // 跌破设置 K 线低点 99.5，距离 (99.5-99.2)/99.5 ≈ 0.3%
    m15[last] = candle(last, 100.0, 100.1, 99.1, 99.2, 2000.0);
    let h1 = flat_h1(48, 100.0);

    let signal = execution::evaluate(&m15, &h1, Direction::Bear, &config.execution)
        .unwrap()
        .unwrap();
    assert_eq!(signal.mode, ExecutionMode::Breakout);
    assert_eq!(signal.direction, Direction::Bear);
}

#[test]
fn short_window_is_reported_as_insufficient_data() {
    let config = AnalysisConfig::default();
    let m15 = flat_m15(30, 100.0);
    let h1 = flat_h1(48, 100.0);
    let result = execution::evaluate(&m15, &h1, Direction::Bull, &config.execution);
    assert!(matches!(
        result,
        Err(shingo_core::analysis::error::AnalysisError::InsufficientData { .. })
    ));
}
