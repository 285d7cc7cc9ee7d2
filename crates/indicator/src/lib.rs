//! # `shingo-indicator` - 指标库
//!
//! 有序 K 线序列上的纯函数指标计算：SMA / EMA / ADX+DI / 布林带 / VWAP / ATR，
//! 以及分析层共用的量比、Delta 买卖盘比与极值辅助函数。
//!
//! ## 契约
//! - 窗口过短一律返回 [`IndicatorError::InsufficientData`]，从不 panic。
//! - 输入残留非有限值返回 [`IndicatorError::InvalidInput`]；
//!   调用方应先经 [`sanitize`] 过滤原始数据（过滤数量以告警计数暴露）。
//! - 所有函数无副作用，同一输入必然产生同一输出。

use shingo_core::indicator::entity::{BollingerBands, IndicatorSnapshot};
use shingo_core::indicator::error::IndicatorError;
use shingo_core::market::entity::Candle;

/// # Summary
/// 过滤结构非法的 K 线（非有限/非正价格、负成交量、高低价不包实体）。
///
/// # Logic
/// 1. 保留 `is_well_formed` 的 K 线。
/// 2. 丢弃数量大于零时记录告警。
///
/// # Arguments
/// * `candles`: 原始 K 线序列。
///
/// # Returns
/// (有效 K 线, 丢弃数量)。
pub fn sanitize(candles: &[Candle]) -> (Vec<Candle>, usize) {
    let valid: Vec<Candle> = candles
        .iter()
        .filter(|c| c.is_well_formed())
        .cloned()
        .collect();
    let dropped = candles.len() - valid.len();
    if dropped > 0 {
        tracing::warn!(dropped, total = candles.len(), "dropped malformed candles");
    }
    (valid, dropped)
}

fn check_window(candles: &[Candle], required: usize) -> Result<(), IndicatorError> {
    if candles.len() < required {
        return Err(IndicatorError::InsufficientData {
            required,
            actual: candles.len(),
        });
    }
    if let Some(bad) = candles.iter().find(|c| !c.is_well_formed()) {
        return Err(IndicatorError::InvalidInput(format!(
            "malformed candle at {}",
            bad.open_time
        )));
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Wilder 平滑序列：首值为前 `period` 个值的简单平均，
/// 其后 `(prev * (period - 1) + new) / period`。
fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.len() < period || period == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut acc = values[..period].iter().sum::<f64>() / period as f64;
    out.push(acc);
    for v in &values[period..] {
        acc = (acc * (period as f64 - 1.0) + v) / period as f64;
        out.push(acc);
    }
    out
}

/// # Summary
/// 简单移动平均：窗口末端 `period` 根收盘价的均值。
pub fn sma(candles: &[Candle], period: usize) -> Result<f64, IndicatorError> {
    check_window(candles, period)?;
    let closes: Vec<f64> = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close)
        .collect();
    Ok(mean(&closes))
}

/// # Summary
/// 指数移动平均：以前 `period` 根的 SMA 为种子，逐根迭代至窗口末端。
pub fn ema(candles: &[Candle], period: usize) -> Result<f64, IndicatorError> {
    check_window(candles, period)?;
    let k = 2.0 / (period as f64 + 1.0);
    let seed = candles[..period].iter().map(|c| c.close).sum::<f64>() / period as f64;
    let value = candles[period..]
        .iter()
        .fold(seed, |acc, c| c.close * k + acc * (1.0 - k));
    Ok(value)
}

/// # Summary
/// 平均真实波幅 (Wilder)。
///
/// # Logic
/// 1. TR_i = max(H-L, |H-prevC|, |L-prevC|)，需要前一根收盘价。
/// 2. 首值取前 `period` 个 TR 的简单平均，其后 Wilder 平滑。
///
/// # Returns
/// 窗口末端的 ATR 值；至少需要 `period + 1` 根 K 线。
pub fn atr(candles: &[Candle], period: usize) -> Result<f64, IndicatorError> {
    check_window(candles, period + 1)?;
    let trs = true_ranges(candles);
    let series = wilder_series(&trs, period);
    series
        .last()
        .copied()
        .ok_or(IndicatorError::InsufficientData {
            required: period + 1,
            actual: candles.len(),
        })
}

fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let prev_close = w[0].close;
            let c = &w[1];
            (c.high - c.low)
                .max((c.high - prev_close).abs())
                .max((c.low - prev_close).abs())
        })
        .collect()
}

/// ADX 与方向指标的组合值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxValue {
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
}

/// # Summary
/// 平均趋向指数与正负 DI (Wilder)。
///
/// # Logic
/// 1. 逐根计算 TR、+DM、-DM。
/// 2. 三者分别 Wilder 平滑，得到 DI+ / DI- 序列。
/// 3. DX = 100 × |DI+ - DI-| / (DI+ + DI-)，再对 DX 做一次 Wilder 平滑得 ADX。
///
/// # Returns
/// 窗口末端的 ADX / DI+ / DI-；至少需要 `2 × period + 1` 根 K 线。
pub fn adx(candles: &[Candle], period: usize) -> Result<AdxValue, IndicatorError> {
    let required = 2 * period + 1;
    check_window(candles, required)?;

    let mut trs = Vec::with_capacity(candles.len() - 1);
    let mut plus_dm = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm = Vec::with_capacity(candles.len() - 1);
    for w in candles.windows(2) {
        let (prev, cur) = (&w[0], &w[1]);
        trs.push(
            (cur.high - cur.low)
                .max((cur.high - prev.close).abs())
                .max((cur.low - prev.close).abs()),
        );
        let up = cur.high - prev.high;
        let down = prev.low - cur.low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let smooth_tr = wilder_series(&trs, period);
    let smooth_plus = wilder_series(&plus_dm, period);
    let smooth_minus = wilder_series(&minus_dm, period);

    let mut di_plus_series = Vec::with_capacity(smooth_tr.len());
    let mut di_minus_series = Vec::with_capacity(smooth_tr.len());
    let mut dx = Vec::with_capacity(smooth_tr.len());
    for i in 0..smooth_tr.len() {
        let (dip, dim) = if smooth_tr[i] > 0.0 {
            (
                100.0 * smooth_plus[i] / smooth_tr[i],
                100.0 * smooth_minus[i] / smooth_tr[i],
            )
        } else {
            (0.0, 0.0)
        };
        di_plus_series.push(dip);
        di_minus_series.push(dim);
        let sum = dip + dim;
        dx.push(if sum > 0.0 {
            100.0 * (dip - dim).abs() / sum
        } else {
            0.0
        });
    }

    let adx_series = wilder_series(&dx, period);
    match (adx_series.last(), di_plus_series.last(), di_minus_series.last()) {
        (Some(adx), Some(di_plus), Some(di_minus)) => Ok(AdxValue {
            adx: *adx,
            di_plus: *di_plus,
            di_minus: *di_minus,
        }),
        _ => Err(IndicatorError::InsufficientData {
            required,
            actual: candles.len(),
        }),
    }
}

/// # Summary
/// 布林带 (period, k 倍总体标准差)。带宽 = (上轨 - 下轨) / 中轨。
pub fn bollinger(candles: &[Candle], period: usize, k: f64) -> Result<BollingerBands, IndicatorError> {
    check_window(candles, period)?;
    let closes: Vec<f64> = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close)
        .collect();
    let middle = mean(&closes);
    let variance = closes.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();
    let upper = middle + k * std_dev;
    let lower = middle - k * std_dev;
    if middle <= 0.0 {
        return Err(IndicatorError::InvalidInput(
            "non-positive bollinger middle".to_string(),
        ));
    }
    Ok(BollingerBands {
        upper,
        middle,
        lower,
        bandwidth: (upper - lower) / middle,
    })
}

/// # Summary
/// 最近 `count` 根 K 线各自的布林带宽序列（按时间升序）。
/// 趋势过滤器的扩张因子用它比较近 5 根与前 5 根的均值。
pub fn bandwidth_series(
    candles: &[Candle],
    period: usize,
    k: f64,
    count: usize,
) -> Result<Vec<f64>, IndicatorError> {
    check_window(candles, period + count - 1)?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let end = candles.len() - count + 1 + i;
        let bands = bollinger(&candles[..end], period, k)?;
        out.push(bands.bandwidth);
    }
    Ok(out)
}

/// # Summary
/// 窗口滚动 VWAP：末端 `window` 根 K 线的 Σ(典型价 × 量) / Σ量。
pub fn vwap(candles: &[Candle], window: usize) -> Result<f64, IndicatorError> {
    check_window(candles, window)?;
    let slice = &candles[candles.len() - window..];
    let cum_volume: f64 = slice.iter().map(|c| c.volume).sum();
    if cum_volume <= 0.0 {
        return Err(IndicatorError::InvalidInput(
            "zero cumulative volume in vwap window".to_string(),
        ));
    }
    let cum_pv: f64 = slice.iter().map(|c| c.typical_price() * c.volume).sum();
    Ok(cum_pv / cum_volume)
}

/// # Summary
/// 量比：最新一根成交量 / 之前 `period` 根的平均成交量。
/// 平均量为零时返回 0（视作无放量）。
pub fn volume_ratio(candles: &[Candle], period: usize) -> Result<f64, IndicatorError> {
    check_window(candles, period + 1)?;
    let current = candles[candles.len() - 1].volume;
    let window = &candles[candles.len() - 1 - period..candles.len() - 1];
    let avg = mean(&window.iter().map(|c| c.volume).collect::<Vec<f64>>());
    if avg <= 0.0 {
        return Ok(0.0);
    }
    Ok(current / avg)
}

/// # Summary
/// Delta 买卖盘比：末端 `window` 根 K 线内 主动买入量 / 主动卖出量。
/// 比值截断到 [0, 10]，避免零卖盘时的无穷值污染序列化输出。
pub fn delta_ratio(candles: &[Candle], window: usize) -> Result<f64, IndicatorError> {
    check_window(candles, window)?;
    let slice = &candles[candles.len() - window..];
    let buy: f64 = slice.iter().map(|c| c.taker_buy_volume).sum();
    let sell: f64 = slice.iter().map(|c| c.taker_sell_volume()).sum();
    if sell <= f64::EPSILON {
        return Ok(if buy <= f64::EPSILON { 1.0 } else { 10.0 });
    }
    Ok((buy / sell).clamp(0.0, 10.0))
}

/// 末端 `lookback` 根中的最高价。
pub fn highest_high(candles: &[Candle], lookback: usize) -> Result<f64, IndicatorError> {
    check_window(candles, lookback)?;
    let slice = &candles[candles.len() - lookback..];
    Ok(slice.iter().fold(f64::MIN, |acc, c| acc.max(c.high)))
}

/// 末端 `lookback` 根中的最低价。
pub fn lowest_low(candles: &[Candle], lookback: usize) -> Result<f64, IndicatorError> {
    check_window(candles, lookback)?;
    let slice = &candles[candles.len() - lookback..];
    Ok(slice.iter().fold(f64::MAX, |acc, c| acc.min(c.low)))
}

/// # Summary
/// 一次性计算完整指标快照（4H 趋势过滤器的输入）。
///
/// # Logic
/// 各指标独立计算后装配；任何一项数据不足即整体返回 InsufficientData，
/// 最长需求来自 MA200。
///
/// # Arguments
/// * `candles`: 已过滤的 K 线窗口。
/// * `vwap_window`: VWAP 滚动窗口长度。
pub fn snapshot(candles: &[Candle], vwap_window: usize) -> Result<IndicatorSnapshot, IndicatorError> {
    let adx_value = adx(candles, 14)?;
    Ok(IndicatorSnapshot {
        ma20: sma(candles, 20)?,
        ma50: sma(candles, 50)?,
        ma200: sma(candles, 200)?,
        ema20: ema(candles, 20)?,
        ema50: ema(candles, 50)?,
        adx14: adx_value.adx,
        di_plus: adx_value.di_plus,
        di_minus: adx_value.di_minus,
        bollinger: bollinger(candles, 20, 2.0)?,
        vwap: vwap(candles, vwap_window.min(candles.len()))?,
        atr14: atr(candles, 14)?,
    })
}
