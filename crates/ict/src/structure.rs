use chrono::{DateTime, Utc};
use shingo_core::analysis::entity::{BlockKind, FairValueGap, OrderBlock};
use shingo_core::config::IctConfig;
use shingo_core::market::entity::Candle;

// 订单块候选两侧各取 3 根 K 线衡量方向性运动
const MOVE_SPAN: usize = 3;
// 候选量比的局部均量窗口
const LOCAL_VOLUME_SPAN: usize = 5;

/// # Summary
/// 4H 订单块检测。
///
/// # Logic
/// 候选 K 线需同时满足：
/// 1. 前后各 3 根 K 线形成 ≥ 2×ATR(4H) 的同向运动（穿过停顿区的机构行为）。
/// 2. 候选自身为低量停顿：量 < 0.8 × 局部均量。
/// 3. 实体/全幅 < 0.3（拒绝影线形态）。
/// 通过的候选再按 高度 ≥ 0.25×ATR 与 年龄 ≤ 上限 过滤有效性。
///
/// # Arguments
/// * `h4`: 已过滤的 4H K 线。
/// * `atr4h`: 4H ATR(14)。
/// * `now`: 显式传入的当前时间（年龄过滤的可测试性要求）。
///
/// # Returns
/// 全部有效订单块，按时间升序。
pub fn detect_order_blocks(
    h4: &[Candle],
    atr4h: f64,
    now: DateTime<Utc>,
    config: &IctConfig,
) -> Vec<OrderBlock> {
    let mut blocks = Vec::new();
    if h4.len() < 2 * MOVE_SPAN + 1 || atr4h <= 0.0 {
        return blocks;
    }
    let min_move = config.move_atr_multiple * atr4h;

    for i in MOVE_SPAN..h4.len() - MOVE_SPAN {
        let candidate = &h4[i];
        let move_before = h4[i - 1].close - h4[i - MOVE_SPAN].close;
        let move_after = h4[i + MOVE_SPAN].close - h4[i].close;
        // 两侧同向且都达到运动强度下限
        let directional = move_before.signum() == move_after.signum()
            && move_before.abs() >= min_move
            && move_after.abs() >= min_move;
        if !directional {
            continue;
        }

        let local_start = i.saturating_sub(LOCAL_VOLUME_SPAN);
        let local_end = (i + LOCAL_VOLUME_SPAN + 1).min(h4.len());
        let neighbors: Vec<f64> = h4[local_start..local_end]
            .iter()
            .enumerate()
            .filter(|(j, _)| local_start + j != i)
            .map(|(_, c)| c.volume)
            .collect();
        let local_avg = neighbors.iter().sum::<f64>() / neighbors.len() as f64;
        if local_avg <= 0.0 {
            continue;
        }
        let volume_ratio = candidate.volume / local_avg;
        if volume_ratio >= config.ob_volume_max_ratio {
            continue;
        }

        let range = candidate.range();
        if range <= 0.0 || candidate.body().abs() / range >= config.ob_body_max_ratio {
            continue;
        }

        let kind = if move_after > 0.0 {
            BlockKind::Bullish
        } else {
            BlockKind::Bearish
        };
        let age_days = (now - candidate.open_time).num_seconds() as f64 / 86_400.0;
        let block = OrderBlock {
            timestamp: candidate.open_time,
            high: candidate.high,
            low: candidate.low,
            kind,
            height: range,
            volume_ratio,
            age_days,
        };
        if block.is_valid(config.ob_min_height_atr * atr4h, config.ob_max_age_days) {
            blocks.push(block);
        }
    }
    blocks
}

/// # Summary
/// 订单块质量分：高度、（反）年龄与低量确认的加权组合，用于挑选最优块。
pub fn order_block_quality(block: &OrderBlock, atr4h: f64, config: &IctConfig) -> f64 {
    let height_score = (block.height / atr4h).min(2.0) / 2.0;
    let freshness = (1.0 - block.age_days / config.ob_max_age_days).clamp(0.0, 1.0);
    let volume_score =
        ((config.ob_volume_max_ratio - block.volume_ratio) / config.ob_volume_max_ratio).clamp(0.0, 1.0);
    0.4 * height_score + 0.3 * freshness + 0.3 * volume_score
}

/// # Summary
/// 4H 公允价值缺口检测（三 K 线缺口）。
///
/// # Logic
/// 1. 多头缺口：c1.high < c3.low；空头缺口：c1.low > c3.high。
/// 2. 缺口大小 > 0.5×ATR(4H) 且中间 K 线量 ≥ 1.5 × 前置均量。
/// 3. 回补比例按后续 K 线对缺口区域的最大侵入深度计算。
///
/// # Returns
/// 全部有效缺口，按时间升序。
pub fn detect_fair_value_gaps(
    h4: &[Candle],
    atr4h: f64,
    now: DateTime<Utc>,
    config: &IctConfig,
) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();
    if h4.len() < 3 || atr4h <= 0.0 {
        return gaps;
    }

    for i in 1..h4.len() - 1 {
        let (c1, c2, c3) = (&h4[i - 1], &h4[i], &h4[i + 1]);
        let (kind, zone_low, zone_high) = if c1.high < c3.low {
            (BlockKind::Bullish, c1.high, c3.low)
        } else if c1.low > c3.high {
            (BlockKind::Bearish, c3.high, c1.low)
        } else {
            continue;
        };
        let size = zone_high - zone_low;

        let vol_start = i.saturating_sub(20);
        let prior: Vec<f64> = h4[vol_start..i].iter().map(|c| c.volume).collect();
        let avg = prior.iter().sum::<f64>() / prior.len().max(1) as f64;
        let volume_ratio = if avg > 0.0 { c2.volume / avg } else { 0.0 };

        let fill_percentage = fill_ratio(&h4[i + 2..], kind, zone_low, zone_high, size);
        let age_hours = (now - c2.open_time).num_seconds() as f64 / 3_600.0;

        let gap = FairValueGap {
            timestamp: c2.open_time,
            high: zone_high,
            low: zone_low,
            kind,
            size,
            age_hours,
            fill_percentage,
            volume_ratio,
        };
        if gap.is_valid(config.fvg_min_size_atr * atr4h, config.fvg_volume_ratio) {
            gaps.push(gap);
        }
    }
    gaps
}

/// 后续 K 线对缺口区域的最大侵入比例 [0,1]。
/// 多头缺口自上沿向下回补，空头缺口自下沿向上回补。
fn fill_ratio(later: &[Candle], kind: BlockKind, zone_low: f64, zone_high: f64, size: f64) -> f64 {
    if later.is_empty() || size <= 0.0 {
        return 0.0;
    }
    match kind {
        BlockKind::Bullish => {
            let min_low = later.iter().fold(f64::MAX, |acc, c| acc.min(c.low));
            ((zone_high - min_low) / size).clamp(0.0, 1.0)
        }
        BlockKind::Bearish => {
            let max_high = later.iter().fold(f64::MIN, |acc, c| acc.max(c.high));
            ((max_high - zone_low) / size).clamp(0.0, 1.0)
        }
    }
}

/// # Summary
/// 公允价值缺口质量分：大小、新鲜度与放量确认的加权组合。
pub fn fair_value_gap_quality(gap: &FairValueGap, atr4h: f64, config: &IctConfig) -> f64 {
    let size_score = (gap.size / atr4h).min(2.0) / 2.0;
    let freshness = 1.0 / (1.0 + gap.age_hours / 24.0);
    let volume_score = (gap.volume_ratio / config.fvg_volume_ratio).min(2.0) / 2.0;
    0.4 * size_score + 0.3 * freshness + 0.3 * volume_score
}

/// 按质量分挑选最优订单块。
pub fn best_order_block<'a>(
    blocks: &'a [OrderBlock],
    atr4h: f64,
    config: &IctConfig,
) -> Option<&'a OrderBlock> {
    blocks.iter().max_by(|a, b| {
        order_block_quality(a, atr4h, config)
            .total_cmp(&order_block_quality(b, atr4h, config))
    })
}

/// 按质量分挑选最优缺口。
pub fn best_fair_value_gap<'a>(
    gaps: &'a [FairValueGap],
    atr4h: f64,
    config: &IctConfig,
) -> Option<&'a FairValueGap> {
    gaps.iter().max_by(|a, b| {
        fair_value_gap_quality(a, atr4h, config)
            .total_cmp(&fair_value_gap_quality(b, atr4h, config))
    })
}
