//! # `shingo-v3` - V3 趋势/震荡多因子流水线
//!
//! 按 4H 趋势过滤 → 1H 多因子打分 → 15m 执行分析 的顺序评估趋势市；
//! 4H 判定震荡时改走 1H 边界有效性 + 15m 假突破路径。
//! 各阶段严格串行，前一阶段的输出是后一阶段的硬门槛。

pub mod execution;
pub mod hourly;
pub mod range;
pub mod trend;

use serde::{Deserialize, Serialize};
use shingo_core::analysis::entity::{
    BoundaryScore, ExecutionSignal, FakeBreakout, HourlyScore, RiskPlan, TrendScore, WeightTable,
};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::{Direction, MarketRegime, SignalKind};
use shingo_core::config::AnalysisConfig;
use shingo_core::market::entity::{Candle, MarketSnapshot};
use shingo_indicator as indicator;
use shingo_risk::RiskPlanBuilder;

use crate::hourly::HourlyInputs;
use crate::range::RangeInputs;

/// # Summary
/// V3 流水线的完整分析产物：市场形态、信号与全部中间评分。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V3Analysis {
    // 市场形态分类
    pub market_type: MarketRegime,
    // 最终交易信号
    pub signal: SignalKind,
    // 置信度 [0,1]
    pub confidence: f64,
    // 4H 趋势过滤器明细
    pub trend: TrendScore,
    // 1H 打分明细（仅趋势市）
    pub hourly: Option<HourlyScore>,
    // 15m 执行信号（仅趋势市且小时级放行）
    pub execution: Option<ExecutionSignal>,
    // 区间上轨评估（仅震荡市）
    pub upper_boundary: Option<BoundaryScore>,
    // 区间下轨评估（仅震荡市）
    pub lower_boundary: Option<BoundaryScore>,
    // 假突破入场（仅震荡市）
    pub fake_breakout: Option<FakeBreakout>,
    // 风控计划（仅入场信号）
    pub risk: Option<RiskPlan>,
    // 数据清洗中丢弃的 K 线数量（诊断）
    pub dropped_candles: usize,
}

/// # Summary
/// V3 分析器：单次调用 = 单交易对快照上的一次无状态求值。
///
/// # Invariants
/// - 不持有任何跨调用状态；同一快照两次调用的结果逐位相同。
pub struct V3Analyzer {
    config: AnalysisConfig,
}

impl V3Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// # Summary
    /// 对一个行情快照执行完整 V3 分析。
    ///
    /// # Logic
    /// 1. 清洗各周期 K 线（丢弃数量计入诊断字段）。
    /// 2. 4H 趋势过滤：趋势市进入 1H 打分，震荡市进入区间分析。
    /// 3. 小时级放行后由 15m 执行分析器给出入场模式与置信度。
    /// 4. 入场信号统一经 RiskPlanBuilder 推导止损/止盈/杠杆。
    ///
    /// # Arguments
    /// * `snapshot`: 只读行情快照。
    /// * `hourly_weights`: 分类对应的 1H 因子权重模板。
    /// * `range_weights`: 分类对应的区间边界权重模板。
    ///
    /// # Returns
    /// 成功返回 V3Analysis；数据不足等错误由调度层恢复为观望结果。
    pub fn analyze(
        &self,
        snapshot: &MarketSnapshot,
        hourly_weights: &WeightTable,
        range_weights: &WeightTable,
    ) -> Result<V3Analysis, AnalysisError> {
        let (h4, dropped_h4) = indicator::sanitize(&snapshot.h4);
        let (h1, dropped_h1) = indicator::sanitize(&snapshot.h1);
        let (m15, dropped_m15) = indicator::sanitize(&snapshot.m15);
        let dropped_candles = dropped_h4 + dropped_h1 + dropped_m15;

        let trend = trend::evaluate(&h4, &self.config.trend)?;

        let mut analysis = V3Analysis {
            market_type: trend.classification,
            signal: SignalKind::Wait,
            confidence: 0.0,
            trend: trend.clone(),
            hourly: None,
            execution: None,
            upper_boundary: None,
            lower_boundary: None,
            fake_breakout: None,
            risk: None,
            dropped_candles,
        };

        match trend.direction {
            Some(direction) => {
                self.analyze_trending(&mut analysis, snapshot, &h4, &h1, &m15, direction, hourly_weights)?;
            }
            None => {
                self.analyze_ranging(&mut analysis, &h1, &m15, snapshot.oi_change_6h(), range_weights)?;
            }
        }
        Ok(analysis)
    }

    fn analyze_trending(
        &self,
        analysis: &mut V3Analysis,
        snapshot: &MarketSnapshot,
        h4: &[Candle],
        h1: &[Candle],
        m15: &[Candle],
        direction: Direction,
        hourly_weights: &WeightTable,
    ) -> Result<(), AnalysisError> {
        let inputs = HourlyInputs {
            price: snapshot.price,
            h4,
            h1,
            m15,
            funding_rate: snapshot.funding_rate,
            oi_change: snapshot.oi_change_6h(),
        };
        let hourly = hourly::evaluate(&inputs, direction, hourly_weights, &self.config.hourly)?;
        let entry_allowed = hourly.signal != SignalKind::Wait;
        analysis.hourly = Some(hourly);
        if !entry_allowed {
            return Ok(());
        }

        let execution = execution::evaluate(m15, h1, direction, &self.config.execution)?;
        let Some(exec) = execution else {
            return Ok(());
        };

        let atr15 = indicator::atr(m15, 14)?;
        let stop_candidates = match direction {
            Direction::Bull => [
                exec.setup_low,
                exec.entry_price - self.config.execution.stop_atr_multiple * atr15,
            ],
            Direction::Bear => [
                exec.setup_high,
                exec.entry_price + self.config.execution.stop_atr_multiple * atr15,
            ],
        };
        let builder = RiskPlanBuilder::new(&self.config.risk);
        match builder.build(
            exec.entry_price,
            direction,
            &stop_candidates,
            self.config.risk.v3_risk_reward,
            None,
        ) {
            Ok(plan) => {
                analysis.signal = SignalKind::from_direction(direction);
                analysis.confidence = exec.confidence;
                analysis.risk = Some(plan);
                analysis.execution = Some(exec);
            }
            Err(err) => {
                // 止损候选全部落在错误一侧时放弃入场，保持观望
                tracing::warn!(symbol = %snapshot.symbol, error = %err, "risk plan rejected");
                analysis.execution = Some(exec);
            }
        }
        Ok(())
    }

    fn analyze_ranging(
        &self,
        analysis: &mut V3Analysis,
        h1: &[Candle],
        m15: &[Candle],
        oi_change: Option<f64>,
        range_weights: &WeightTable,
    ) -> Result<(), AnalysisError> {
        let inputs = RangeInputs { h1, m15, oi_change };
        let (upper, lower) = range::evaluate_boundaries(&inputs, range_weights, &self.config.range)?;
        let fake = range::detect_fake_breakout(&inputs, &upper, &lower, &self.config.range)?;
        analysis.upper_boundary = Some(upper);
        analysis.lower_boundary = Some(lower);

        let Some(breakout) = fake else {
            return Ok(());
        };

        let atr15 = indicator::atr(m15, 14)?;
        // 止损置于被假突破的边界之外再加一个 ATR 的缓冲
        let stop = match breakout.direction {
            Direction::Bull => breakout.boundary - atr15,
            Direction::Bear => breakout.boundary + atr15,
        };
        let builder = RiskPlanBuilder::new(&self.config.risk);
        match builder.build(
            breakout.entry_price,
            breakout.direction,
            &[stop],
            self.config.risk.v3_risk_reward,
            None,
        ) {
            Ok(plan) => {
                analysis.signal = SignalKind::from_direction(breakout.direction);
                analysis.confidence = breakout.confidence;
                analysis.risk = Some(plan);
                analysis.fake_breakout = Some(breakout);
            }
            Err(err) => {
                tracing::warn!(error = %err, "range risk plan rejected");
                analysis.fake_breakout = Some(breakout);
            }
        }
        Ok(())
    }
}
