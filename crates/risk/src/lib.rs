//! # `shingo-risk` - 风控计划构建器
//!
//! V3 与 ICT 两条流水线共用的 RiskPlan 推导：止损候选取最保守者、
//! 固定盈亏比止盈、`floor(1 / (止损比例 + 缓冲))` 杠杆公式与保证金换算。
//! 来源系统在各分析器内重复内联这段算术，这里收敛为单一实现。

use shingo_core::analysis::entity::RiskPlan;
use shingo_core::common::Direction;
use shingo_core::config::RiskConfig;
use thiserror::Error;

/// # Summary
/// 风控构建错误。
///
/// # Invariants
/// - 止损候选必须严格位于入场价的亏损侧，否则拒绝建仓。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid entry price: {0}")]
    InvalidEntry(f64),
    #[error("No stop candidate on the loss side of entry {0}")]
    InvalidStop(f64),
}

/// # Summary
/// RiskPlan 构建器：以 {入场价, 方向, 止损候选, 盈亏比, 杠杆} 参数化。
#[derive(Debug, Clone)]
pub struct RiskPlanBuilder<'a> {
    config: &'a RiskConfig,
}

impl<'a> RiskPlanBuilder<'a> {
    pub fn new(config: &'a RiskConfig) -> Self {
        Self { config }
    }

    /// # Summary
    /// 构建一份不可变的风控计划。
    ///
    /// # Logic
    /// 1. 过滤出严格位于亏损侧的止损候选，取离入场价最远（最保守）的一个。
    /// 2. 止盈 = 入场价 ± 盈亏比 × 止损距离。
    /// 3. 杠杆 = 显式指定值，或 floor(1 / (止损比例 + 保证金缓冲))，并截断到 [1, 上限]。
    /// 4. 保证金 = 单笔最大亏损额 / (止损比例 × 杠杆)。
    ///
    /// # Arguments
    /// * `entry`: 入场价。
    /// * `direction`: 交易方向。
    /// * `stop_candidates`: 止损候选价位（通常为结构位与 ATR 外扩位）。
    /// * `risk_reward`: 盈亏比（V3 为 2，ICT 为 3）。
    /// * `leverage_override`: ICT 使用固定默认杠杆时传入。
    ///
    /// # Returns
    /// 成功返回 RiskPlan；入场价非法或无有效止损候选时返回 RiskError。
    pub fn build(
        &self,
        entry: f64,
        direction: Direction,
        stop_candidates: &[f64],
        risk_reward: f64,
        leverage_override: Option<u32>,
    ) -> Result<RiskPlan, RiskError> {
        if !entry.is_finite() || entry <= 0.0 {
            return Err(RiskError::InvalidEntry(entry));
        }

        let stop_loss = stop_candidates
            .iter()
            .copied()
            .filter(|s| s.is_finite() && *s > 0.0)
            .filter(|s| match direction {
                Direction::Bull => *s < entry,
                Direction::Bear => *s > entry,
            })
            // 最保守 = 距入场价最远
            .fold(None::<f64>, |acc, s| match acc {
                None => Some(s),
                Some(prev) => Some(match direction {
                    Direction::Bull => prev.min(s),
                    Direction::Bear => prev.max(s),
                }),
            })
            .ok_or(RiskError::InvalidStop(entry))?;

        let stop_distance = (entry - stop_loss).abs();
        let stop_pct = stop_distance / entry;
        if stop_pct <= 0.0 {
            return Err(RiskError::InvalidStop(entry));
        }

        let take_profit = entry + direction.sign() * risk_reward * stop_distance;

        let leverage = match leverage_override {
            Some(lev) => lev.clamp(1, self.config.leverage_cap),
            None => {
                let raw = (1.0 / (stop_pct + self.config.margin_buffer)).floor();
                (raw as u32).clamp(1, self.config.leverage_cap)
            }
        };

        let margin = self.config.max_loss_amount / (stop_pct * f64::from(leverage));

        Ok(RiskPlan {
            entry,
            stop_loss,
            take_profit,
            stop_distance,
            risk_reward_ratio: risk_reward,
            leverage,
            margin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RiskConfig {
        RiskConfig {
            v3_risk_reward: 2.0,
            margin_buffer: 0.005,
            leverage_cap: 125,
            max_loss_amount: 50.0,
        }
    }

    #[test]
    fn stop_and_target_sit_on_correct_sides_for_long() {
        let cfg = config();
        let plan = RiskPlanBuilder::new(&cfg)
            .build(100.0, Direction::Bull, &[98.0, 97.0], 2.0, None)
            .unwrap();
        assert!(plan.stop_loss < plan.entry);
        assert!(plan.take_profit > plan.entry);
        // 最保守候选：97 而非 98
        assert_eq!(plan.stop_loss, 97.0);
        // 固定 2R
        assert!((plan.take_profit - 106.0).abs() < 1e-9);
    }

    #[test]
    fn stop_and_target_sit_on_correct_sides_for_short() {
        let cfg = config();
        let plan = RiskPlanBuilder::new(&cfg)
            .build(100.0, Direction::Bear, &[101.5, 103.0], 3.0, None)
            .unwrap();
        assert!(plan.stop_loss > plan.entry);
        assert!(plan.take_profit < plan.entry);
        assert_eq!(plan.stop_loss, 103.0);
        assert!((plan.take_profit - 91.0).abs() < 1e-9);
    }

    #[test]
    fn candidates_on_wrong_side_are_rejected() {
        let cfg = config();
        let result = RiskPlanBuilder::new(&cfg).build(100.0, Direction::Bull, &[101.0], 2.0, None);
        assert!(matches!(result, Err(RiskError::InvalidStop(_))));
    }

    #[test]
    fn leverage_follows_floor_formula_and_cap() {
        let cfg = config();
        // 止损 2% -> floor(1 / 0.025) = 40
        let plan = RiskPlanBuilder::new(&cfg)
            .build(100.0, Direction::Bull, &[98.0], 2.0, None)
            .unwrap();
        assert_eq!(plan.leverage, 40);
        // 止损 0.1% -> floor(1 / 0.006) = 166 -> 截断到 125
        let tight = RiskPlanBuilder::new(&cfg)
            .build(100.0, Direction::Bull, &[99.9], 2.0, None)
            .unwrap();
        assert_eq!(tight.leverage, 125);
    }

    #[test]
    fn override_leverage_is_clamped_not_derived() {
        let cfg = config();
        let plan = RiskPlanBuilder::new(&cfg)
            .build(100.0, Direction::Bear, &[103.0], 3.0, Some(5))
            .unwrap();
        assert_eq!(plan.leverage, 5);
    }

    #[test]
    fn margin_scales_with_max_loss() {
        let cfg = config();
        let plan = RiskPlanBuilder::new(&cfg)
            .build(100.0, Direction::Bull, &[98.0], 2.0, None)
            .unwrap();
        // 50 / (0.02 * 40) = 62.5
        assert!((plan.margin - 62.5).abs() < 1e-9);
    }
}
