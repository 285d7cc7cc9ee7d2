use shingo_core::analysis::entity::TrendScore;
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::{Direction, MarketRegime};
use shingo_core::config::TrendConfig;
use shingo_core::market::entity::Candle;
use shingo_indicator as indicator;

/// # Summary
/// 4H 趋势过滤器：10 分制打分状态机。
///
/// # Logic
/// 1. 方向 (0-3)：close>MA20、MA20>MA50、MA50>MA200 各 +1（空头取镜像不等式）。
///    任一方向子分 ≥2 才被接受；双双不足则直接判定震荡市，总分 0，
///    其余因子一律不再评估。
/// 2. 稳定性 (0-1)：最近两根 K 线实体方向与趋势一致。
/// 3. 强度 (0-1)：ADX(14) 超过阈值且同向 DI 占优。
/// 4. 扩张 (0-1)：近 5 根布林带宽均值 > 1.05 × 前 5 根均值。
/// 5. 动量 (0-1)：|close-MA20|/MA20 达到下限。
/// 总分 ≥4 判定为趋势市，否则震荡市。方向门槛与强度门槛分离是有意设计：
/// 先问「有没有方向」，再问「强不强到可以交易」。
///
/// # Arguments
/// * `h4`: 已过滤的 4H K 线窗口（MA200 要求至少 200 根）。
/// * `config`: 趋势阈值。
///
/// # Returns
/// 成功返回 TrendScore；窗口不足返回 InsufficientData。
pub fn evaluate(h4: &[Candle], config: &TrendConfig) -> Result<TrendScore, AnalysisError> {
    let snap = indicator::snapshot(h4, 24)?;
    let close = h4[h4.len() - 1].close;

    let bull_score = u8::from(close > snap.ma20)
        + u8::from(snap.ma20 > snap.ma50)
        + u8::from(snap.ma50 > snap.ma200);
    let bear_score = u8::from(close < snap.ma20)
        + u8::from(snap.ma20 < snap.ma50)
        + u8::from(snap.ma50 < snap.ma200);

    let (direction, direction_score) = if bull_score >= config.direction_min_score {
        (Direction::Bull, bull_score)
    } else if bear_score >= config.direction_min_score {
        (Direction::Bear, bear_score)
    } else {
        // 双方向均不成立：总分强制为 0，不评估其余因子
        return Ok(TrendScore {
            direction: None,
            direction_score: 0,
            stability: false,
            strength: false,
            expansion: false,
            momentum: false,
            total_score: 0,
            classification: MarketRegime::Ranging,
        });
    };

    let stability = h4[h4.len() - 2..].iter().all(|c| match direction {
        Direction::Bull => c.body() > 0.0,
        Direction::Bear => c.body() < 0.0,
    });

    let strength = snap.adx14 > config.adx_threshold
        && match direction {
            Direction::Bull => snap.di_plus > snap.di_minus,
            Direction::Bear => snap.di_minus > snap.di_plus,
        };

    let bandwidths = indicator::bandwidth_series(h4, 20, 2.0, 10)?;
    let older = bandwidths[..5].iter().sum::<f64>() / 5.0;
    let recent = bandwidths[5..].iter().sum::<f64>() / 5.0;
    let expansion = older > 0.0 && recent > config.expansion_ratio * older;

    let momentum = (close - snap.ma20).abs() / snap.ma20 >= config.momentum_min_pct;

    let total_score = direction_score
        + u8::from(stability)
        + u8::from(strength)
        + u8::from(expansion)
        + u8::from(momentum);

    let classification = if total_score >= config.trending_min_total {
        MarketRegime::from_direction(direction)
    } else {
        MarketRegime::Ranging
    };

    Ok(TrendScore {
        direction: classification.direction(),
        direction_score,
        stability,
        strength,
        expansion,
        momentum,
        total_score,
        classification,
    })
}
