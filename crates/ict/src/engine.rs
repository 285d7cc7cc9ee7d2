use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shingo_core::analysis::entity::{
    BlockKind, FairValueGap, OrderBlock, RiskPlan, SweepEvent,
};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::common::{Direction, MarketRegime, SignalKind};
use shingo_core::config::AnalysisConfig;
use shingo_core::market::entity::{Candle, MarketSnapshot};
use shingo_indicator as indicator;
use shingo_risk::RiskPlanBuilder;

use crate::daily::{self, DailyTrend};
use crate::structure;
use crate::sweep::{self, SweepParams};

/// # Summary
/// 15m 入场确认明细。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LtfEntry {
    // 吞没形态（实体 ≥ 1.2 × 前实体且方向一致）
    pub engulfing: bool,
    // 微观扫荡确认
    pub micro_sweep: Option<SweepEvent>,
    // 订单块反应确认
    pub ob_reaction: bool,
    // 放量确认（只进置信度）
    pub volume_confirmed: bool,
    // 置信度 [0,1]
    pub confidence: f64,
}

/// # Summary
/// ICT 流水线的完整分析产物。
/// `halted_at` 记录在哪道硬门槛上止步（诊断用），None 表示走完全程。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IctAnalysis {
    // 市场形态（取自日线趋势）
    pub market_type: MarketRegime,
    // 最终交易信号
    pub signal: SignalKind,
    // 置信度 [0,1]
    pub confidence: f64,
    // 日线趋势明细
    pub daily: DailyTrend,
    // 有效订单块
    pub order_blocks: Vec<OrderBlock>,
    // 有效公允价值缺口
    pub fair_value_gaps: Vec<FairValueGap>,
    // 宏观扫荡事件（通过门槛的最优者）
    pub macro_sweep: Option<SweepEvent>,
    // 15m 入场确认
    pub entry: Option<LtfEntry>,
    // 风控计划
    pub risk: Option<RiskPlan>,
    // 止步的门槛名
    pub halted_at: Option<String>,
    // 数据清洗中丢弃的 K 线数量
    pub dropped_candles: usize,
}

/// # Summary
/// ICT 引擎：严格串行的硬门槛状态机，无回溯。
/// DailyTrend → Structure → MacroSweep → LTF 入场 → 风控。
///
/// # Invariants
/// - 任何一道门槛失败立即以观望收尾，后续阶段不再求值。
/// - 年龄类过滤只使用显式传入的 `now`，不读墙钟。
pub struct IctAnalyzer {
    config: AnalysisConfig,
}

impl IctAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// # Summary
    /// 对一个行情快照执行完整 ICT 分析。
    ///
    /// # Arguments
    /// * `snapshot`: 只读行情快照。
    /// * `now`: 显式当前时间（订单块/缺口年龄过滤）。
    ///
    /// # Returns
    /// 成功返回 IctAnalysis；数据不足等错误由调度层恢复为观望结果。
    pub fn analyze(
        &self,
        snapshot: &MarketSnapshot,
        now: DateTime<Utc>,
    ) -> Result<IctAnalysis, AnalysisError> {
        let ict = &self.config.ict;
        let (daily_candles, dropped_daily) = indicator::sanitize(&snapshot.daily);
        let (h4, dropped_h4) = indicator::sanitize(&snapshot.h4);
        let (m15, dropped_m15) = indicator::sanitize(&snapshot.m15);
        let dropped_candles = dropped_daily + dropped_h4 + dropped_m15;

        let daily_trend = daily::evaluate(&daily_candles, ict)?;
        let mut analysis = IctAnalysis {
            market_type: daily_trend.trend,
            signal: SignalKind::Wait,
            confidence: 0.0,
            daily: daily_trend,
            order_blocks: Vec::new(),
            fair_value_gaps: Vec::new(),
            macro_sweep: None,
            entry: None,
            risk: None,
            halted_at: None,
            dropped_candles,
        };

        // 门槛 1：日线横盘直接短路
        let Some(direction) = analysis.daily.trend.direction() else {
            analysis.halted_at = Some("daily_trend".to_string());
            return Ok(analysis);
        };

        // 门槛 2：结构检查（无有效订单块且无有效缺口即止步）
        let atr4h = indicator::atr(&h4, 14)?;
        analysis.order_blocks = structure::detect_order_blocks(&h4, atr4h, now, ict);
        analysis.fair_value_gaps = structure::detect_fair_value_gaps(&h4, atr4h, now, ict);
        if analysis.order_blocks.is_empty() && analysis.fair_value_gaps.is_empty() {
            analysis.halted_at = Some("structure".to_string());
            return Ok(analysis);
        }

        // 门槛 3：宏观扫荡，方向必须与日线偏置一致
        let macro_params = SweepParams {
            lookback: ict.sweep_lookback,
            window: ict.swing_window,
            min_swing_pct: ict.macro_min_swing_pct,
            max_bars: ict.macro_max_bars,
            speed_atr_ratio: ict.macro_speed_atr,
        };
        let macro_events = sweep::detect_sweeps(&h4, &macro_params);
        let macro_sweep =
            sweep::best_valid_sweep(&macro_events, ict.macro_max_bars, ict.macro_speed_atr * atr4h)
                .filter(|e| e.direction == direction);
        let Some(macro_sweep) = macro_sweep else {
            analysis.halted_at = Some("macro_sweep".to_string());
            return Ok(analysis);
        };
        analysis.macro_sweep = Some(macro_sweep);

        // 门槛 4：15m 入场确认
        let atr15 = indicator::atr(&m15, 14)?;
        let best_ob = structure::best_order_block(&analysis.order_blocks, atr4h, ict).cloned();
        let entry = self.confirm_entry(&m15, atr15, direction, best_ob.as_ref())?;
        let Some(entry) = entry else {
            analysis.halted_at = Some("ltf_entry".to_string());
            return Ok(analysis);
        };

        // 风控：订单块边界外扩 1.5×ATR 与 3% 结构止损取更保守者
        let entry_price = m15[m15.len() - 1].close;
        let mut stop_candidates = vec![match direction {
            Direction::Bull => entry_price * (1.0 - ict.structural_stop_pct),
            Direction::Bear => entry_price * (1.0 + ict.structural_stop_pct),
        }];
        if let Some(ob) = best_ob.as_ref().filter(|ob| ob.kind.direction() == direction) {
            stop_candidates.push(match direction {
                Direction::Bull => ob.low - ict.stop_atr_multiple * atr4h,
                Direction::Bear => ob.high + ict.stop_atr_multiple * atr4h,
            });
        }
        let builder = RiskPlanBuilder::new(&self.config.risk);
        match builder.build(
            entry_price,
            direction,
            &stop_candidates,
            ict.risk_reward,
            Some(ict.default_leverage),
        ) {
            Ok(plan) => {
                analysis.signal = SignalKind::from_direction(direction);
                analysis.confidence = entry.confidence;
                analysis.risk = Some(plan);
                analysis.entry = Some(entry);
            }
            Err(err) => {
                tracing::warn!(symbol = %snapshot.symbol, error = %err, "ict risk plan rejected");
                analysis.entry = Some(entry);
                analysis.halted_at = Some("risk".to_string());
            }
        }
        Ok(analysis)
    }

    /// # Summary
    /// 15m 入场确认：吞没 / 微观扫荡 / 订单块反应，放量只加置信度。
    fn confirm_entry(
        &self,
        m15: &[Candle],
        atr15: f64,
        direction: Direction,
        best_ob: Option<&OrderBlock>,
    ) -> Result<Option<LtfEntry>, AnalysisError> {
        let ict = &self.config.ict;
        if m15.len() < 22 {
            return Err(AnalysisError::InsufficientData {
                required: 22,
                actual: m15.len(),
            });
        }
        let current = &m15[m15.len() - 1];
        let prior = &m15[m15.len() - 2];

        let body_matches = match direction {
            Direction::Bull => current.body() > 0.0,
            Direction::Bear => current.body() < 0.0,
        };
        let engulfing = body_matches
            && prior.body().abs() > 0.0
            && current.body().abs() >= ict.engulfing_body_ratio * prior.body().abs();

        let micro_params = SweepParams {
            lookback: ict.sweep_lookback,
            window: ict.swing_window,
            min_swing_pct: ict.micro_min_swing_pct,
            max_bars: ict.micro_max_bars,
            speed_atr_ratio: ict.micro_speed_atr,
        };
        let micro_events = sweep::detect_sweeps(m15, &micro_params);
        let micro_sweep =
            sweep::best_valid_sweep(&micro_events, ict.micro_max_bars, ict.micro_speed_atr * atr15)
                .filter(|e| e.direction == direction);

        let ob_reaction = best_ob
            .filter(|ob| ob.kind.direction() == direction)
            .map(|ob| {
                let touched = match ob.kind {
                    BlockKind::Bullish => current.low <= ob.high && current.low >= ob.low,
                    BlockKind::Bearish => current.high >= ob.low && current.high <= ob.high,
                };
                touched && body_matches
            })
            .unwrap_or(false);

        let triggers =
            u8::from(engulfing) + u8::from(micro_sweep.is_some()) + u8::from(ob_reaction);
        if triggers == 0 {
            return Ok(None);
        }

        let volume_confirmed = indicator::volume_ratio(m15, 20)? >= ict.entry_volume_ratio;
        let confidence = (0.5
            + 0.15 * f64::from(triggers - 1)
            + 0.2 * f64::from(u8::from(volume_confirmed)))
        .min(1.0);

        Ok(Some(LtfEntry {
            engulfing,
            micro_sweep,
            ob_reaction,
            volume_confirmed,
            confidence,
        }))
    }
}
