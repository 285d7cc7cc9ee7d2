use chrono::{DateTime, Duration, TimeZone, Utc};
use shingo_core::analysis::entity::{BlockKind, OrderBlock};
use shingo_core::config::AnalysisConfig;
use shingo_core::market::entity::Candle;
use shingo_ict::structure;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
}

fn candle(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    let start = base_time() + Duration::hours(4 * i as i64);
    Candle {
        open_time: start,
        close_time: start + Duration::hours(4),
        open,
        high,
        low,
        close,
        volume,
        quote_volume: close * volume,
        trades_count: 400,
        taker_buy_volume: volume / 2.0,
    }
}

fn flat(i: usize, price: f64) -> Candle {
    candle(i, price, price + 0.5, price - 0.5, price, 1000.0)
}

/// 低量停顿 + 两侧强方向性运动的订单块教科书形态：
/// 10 根横盘、3 根 +3 拉升、1 根停顿（量 0.4 倍、实体占比 0.13）、
/// 3 根 +3 拉升、随后横盘。
fn bullish_ob_series() -> Vec<Candle> {
    let mut candles = Vec::new();
    for i in 0..10 {
        candles.push(flat(i, 100.0));
    }
    let mut close = 100.0;
    for i in 10..13 {
        let open = close;
        close += 3.0;
        candles.push(candle(i, open, close + 0.5, open - 0.5, close, 1000.0));
    }
    // 停顿候选：open 109, close 109.2, 区间 [108.7, 110.2]
    candles.push(candle(13, 109.0, 110.2, 108.7, 109.2, 400.0));
    let mut close = 109.2;
    for i in 14..17 {
        let open = close;
        close += 3.0;
        candles.push(candle(i, open, close + 0.5, open - 0.5, close, 1000.0));
    }
    for i in 17..30 {
        candles.push(flat(i, close));
    }
    candles
}

fn now_at_end(candles: &[Candle]) -> DateTime<Utc> {
    candles[candles.len() - 1].close_time
}

#[test]
fn textbook_pause_is_detected_as_bullish_order_block() {
    let config = AnalysisConfig::default();
    let candles = bullish_ob_series();
    let blocks = structure::detect_order_blocks(&candles, 2.0, now_at_end(&candles), &config.ict);
    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.kind, BlockKind::Bullish);
    assert_eq!(block.high, 110.2);
    assert_eq!(block.low, 108.7);
    assert!((block.height - 1.5).abs() < 1e-9);
    assert!(block.volume_ratio < 0.8);
    assert!(block.age_days < 3.0);
}

#[test]
fn loud_pause_candle_is_not_an_order_block() {
    let config = AnalysisConfig::default();
    let mut candles = bullish_ob_series();
    // 停顿 K 线放量到与邻域同级：不再是机构低量吸筹
    candles[13].volume = 1000.0;
    let blocks = structure::detect_order_blocks(&candles, 2.0, now_at_end(&candles), &config.ict);
    assert!(blocks.is_empty());
}

#[test]
fn order_block_validity_is_monotonic_in_height_and_age() {
    let block = OrderBlock {
        timestamp: base_time(),
        high: 101.0,
        low: 100.0,
        kind: BlockKind::Bullish,
        height: 1.0,
        volume_ratio: 0.5,
        age_days: 10.0,
    };
    let min_height = 0.5;
    let max_age = 60.0;
    assert!(block.is_valid(min_height, max_age));

    // 高度单调：加高永不致失效
    let mut taller = block.clone();
    for height in [1.0, 2.0, 5.0, 50.0] {
        taller.height = height;
        assert!(taller.is_valid(min_height, max_age));
    }

    // 年龄反单调：越过上限立即失效
    let mut older = block.clone();
    older.age_days = 59.9;
    assert!(older.is_valid(min_height, max_age));
    older.age_days = 60.1;
    assert!(!older.is_valid(min_height, max_age));
}

#[test]
fn quality_prefers_fresher_blocks() {
    let config = AnalysisConfig::default();
    let fresh = OrderBlock {
        timestamp: base_time(),
        high: 101.0,
        low: 100.0,
        kind: BlockKind::Bullish,
        height: 1.0,
        volume_ratio: 0.5,
        age_days: 1.0,
    };
    let stale = OrderBlock {
        age_days: 55.0,
        ..fresh.clone()
    };
    let q_fresh = structure::order_block_quality(&fresh, 2.0, &config.ict);
    let q_stale = structure::order_block_quality(&stale, 2.0, &config.ict);
    assert!(q_fresh > q_stale);
    let blocks = vec![stale, fresh.clone()];
    let best = structure::best_order_block(&blocks, 2.0, &config.ict).unwrap();
    assert_eq!(best.age_days, fresh.age_days);
}

/// 三 K 线缺口 + 放量中间 K 线 + 后续半回补。
fn bullish_fvg_series() -> Vec<Candle> {
    let mut candles = Vec::new();
    for i in 0..20 {
        candles.push(flat(i, 100.0));
    }
    // c1 高点 100.5，c2 放量拉升，c3 低点 102：缺口 [100.5, 102]
    candles.push(candle(20, 100.0, 103.5, 99.8, 103.0, 2000.0));
    candles.push(candle(21, 103.0, 103.4, 102.0, 103.2, 1000.0));
    // 后续回踩到 101.25：回补 (102 - 101.25) / 1.5 = 50%
    candles.push(candle(22, 103.2, 103.3, 101.25, 102.5, 1000.0));
    candles.push(candle(23, 102.5, 102.9, 102.2, 102.6, 1000.0));
    candles
}

#[test]
fn three_candle_gap_with_volume_is_a_fair_value_gap() {
    let config = AnalysisConfig::default();
    let candles = bullish_fvg_series();
    let gaps = structure::detect_fair_value_gaps(&candles, 1.5, now_at_end(&candles), &config.ict);
    assert_eq!(gaps.len(), 1);
    let gap = &gaps[0];
    assert_eq!(gap.kind, BlockKind::Bullish);
    assert_eq!(gap.low, 100.5);
    assert_eq!(gap.high, 102.0);
    assert!((gap.size - 1.5).abs() < 1e-9);
    assert!(gap.volume_ratio >= 1.5);
    assert!((gap.fill_percentage - 0.5).abs() < 1e-9);
}

#[test]
fn quiet_gap_candle_is_filtered_out() {
    let config = AnalysisConfig::default();
    let mut candles = bullish_fvg_series();
    // 中间 K 线缩量：缺口不被放量确认
    candles[20].volume = 1000.0;
    let gaps = structure::detect_fair_value_gaps(&candles, 1.5, now_at_end(&candles), &config.ict);
    assert!(gaps.is_empty());
}
