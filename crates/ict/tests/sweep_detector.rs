use chrono::{Duration, TimeZone, Utc};
use shingo_core::common::Direction;
use shingo_core::market::entity::Candle;
use shingo_ict::sweep::{self, SweepParams};

fn candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap() + Duration::hours(4 * i as i64);
    Candle {
        open_time: start,
        close_time: start + Duration::hours(4),
        open,
        high,
        low,
        close,
        volume: 1000.0,
        quote_volume: close * 1000.0,
        trades_count: 400,
        taker_buy_volume: 500.0,
    }
}

fn flat(i: usize) -> Candle {
    candle(i, 100.0, 100.5, 99.5, 100.0)
}

fn params() -> SweepParams {
    SweepParams {
        lookback: 50,
        window: 2,
        min_swing_pct: 0.01,
        max_bars: 2,
        speed_atr_ratio: 0.4,
    }
}

/// 摆动高点 103 被刺穿 0.8 后，第二根 K 线才收回 => bars=2, speed=0.4。
fn swept_high_series() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..60).map(flat).collect();
    candles[40] = candle(40, 100.0, 103.0, 99.5, 100.0);
    candles[50] = candle(50, 100.0, 103.8, 99.5, 103.4);
    candles[51] = candle(51, 103.4, 103.5, 99.5, 100.0);
    candles
}

#[test]
fn sweep_speed_is_exceed_over_bars_exactly() {
    let events = sweep::detect_sweeps(&swept_high_series(), &params());
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.direction, Direction::Bear);
    assert_eq!(event.swing_level, 103.0);
    assert!((event.exceed_amount - 0.8).abs() < 1e-9);
    assert_eq!(event.bars_to_return, 2);
    assert_eq!(event.speed, event.exceed_amount / event.bars_to_return as f64);
}

#[test]
fn validity_is_the_conjunction_of_bars_and_speed() {
    let events = sweep::detect_sweeps(&swept_high_series(), &params());
    let event = &events[0];
    // bars=2, speed=0.4
    assert!(event.is_valid(2, 0.3));
    assert!(!event.is_valid(1, 0.3)); // 收回太慢
    assert!(!event.is_valid(2, 0.5)); // 速度不足
}

#[test]
fn same_bar_wick_rejection_counts_one_bar() {
    let mut candles: Vec<Candle> = (0..60).map(flat).collect();
    candles[40] = candle(40, 100.0, 103.0, 99.5, 100.0);
    // 刺穿与收回发生在同一根：影线上破 0.6 后收盘回到位下
    candles[50] = candle(50, 100.0, 103.6, 99.5, 100.2);
    let events = sweep::detect_sweeps(&candles, &params());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bars_to_return, 1);
    assert!((events[0].speed - 0.6).abs() < 1e-9);
}

#[test]
fn swing_low_sweep_yields_bullish_bias() {
    let mut candles: Vec<Candle> = (0..60).map(flat).collect();
    candles[40] = candle(40, 100.0, 100.5, 97.0, 100.0);
    candles[50] = candle(50, 100.0, 100.5, 96.0, 100.1);
    let events = sweep::detect_sweeps(&candles, &params());
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.direction, Direction::Bull);
    assert_eq!(event.swing_level, 97.0);
    assert!((event.exceed_amount - 1.0).abs() < 1e-9);
    assert_eq!(event.bars_to_return, 1);
}

#[test]
fn tiny_swings_below_one_percent_are_ignored() {
    let mut candles: Vec<Candle> = (0..60).map(flat).collect();
    // 局部高点只比邻域最低点高 0.97%，低于 1% 的最小摆动幅度
    candles[40] = candle(40, 100.0, 100.55, 99.58, 100.0);
    for c in candles.iter_mut().take(43).skip(38) {
        if c.low < 99.58 {
            c.low = 99.58;
        }
    }
    candles[50] = candle(50, 100.0, 101.0, 99.6, 100.0);
    let events = sweep::detect_sweeps(&candles, &params());
    assert!(events.is_empty());
}

#[test]
fn unreturned_pierce_is_not_a_sweep() {
    let mut candles: Vec<Candle> = (0..60).map(flat).collect();
    candles[40] = candle(40, 100.0, 103.0, 99.5, 100.0);
    // 上破后一直收在位上方：没有收回就没有扫荡
    for i in 50..60 {
        candles[i] = candle(i, 103.5, 104.5, 103.2, 104.0);
    }
    let events = sweep::detect_sweeps(&candles, &params());
    assert!(events.is_empty());
}
