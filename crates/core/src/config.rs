use serde::{Deserialize, Serialize};

/// 分析配置：两条流水线用到的全部阈值。
/// 文档值与放宽值并存时，默认采用引擎实际生效的放宽值（如订单块最大年龄）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub trend: TrendConfig,
    pub hourly: HourlyConfig,
    pub execution: ExecutionConfig,
    pub range: RangeConfig,
    pub ict: IctConfig,
    pub risk: RiskConfig,
}

/// 4H 趋势过滤器阈值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    // 方向子分入选下限（3 分制中需 ≥2）
    pub direction_min_score: u8,
    // 总分趋势判定下限（10 分制中需 ≥4）
    pub trending_min_total: u8,
    // ADX 强度阈值
    pub adx_threshold: f64,
    // 布林带扩张比例（近 5 根均值 / 前 5 根均值）
    pub expansion_ratio: f64,
    // 动量下限：|close-MA20|/MA20
    pub momentum_min_pct: f64,
}

/// 1H 多因子打分阈值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyConfig {
    // 4H 突破回看根数
    pub breakout_lookback: usize,
    // 15m 量比下限
    pub vol15m_ratio: f64,
    // 1h 量比下限
    pub vol1h_ratio: f64,
    // 做多所需 OI 6h 最小涨幅
    pub oi_long_min: f64,
    // 做空所需 OI 6h 最大跌幅（非对称设计）
    pub oi_short_max: f64,
    // 资金费率绝对值上限
    pub funding_abs_max: f64,
    // 做多 Delta 买卖盘比下限
    pub delta_long_min: f64,
    // 做空 Delta 买卖盘比上限
    pub delta_short_max: f64,
    // Delta 统计使用的 15m K 线窗口
    pub delta_window: usize,
    // 入场所需最低原始分
    pub min_score: u8,
}

/// 15m 执行分析阈值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    // 模式 A：到 1H VWAP 的相对距离容差
    pub vwap_tolerance: f64,
    // 模式 A：回踩量比下限
    pub pullback_volume_ratio: f64,
    // 模式 B：突破量比下限
    pub breakout_volume_ratio: f64,
    // 模式 B：最小突破距离（相对价格）
    pub min_breakout_distance: f64,
    // 止损 ATR 倍数
    pub stop_atr_multiple: f64,
    // 模式 A 有效所需置信度
    pub min_confidence: f64,
}

/// 区间分析阈值（1H 边界 + 15m 假突破）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    // 1H 边界触碰回看根数（6 小时）
    pub touch_lookback: usize,
    // 触碰次数下限
    pub min_touches: usize,
    // 触碰判定容差（相对边界）
    pub touch_tolerance: f64,
    // VWAP 接近区间中轴的容差
    pub vwap_mid_tolerance: f64,
    // 低量确认：量比上限
    pub low_volume_max: f64,
    // Delta 平衡带宽：|比值-1| 上限
    pub delta_band: f64,
    // Delta 统计使用的 15m K 线窗口
    pub delta_window: usize,
    // OI 稳定带宽：|6h 变化| 上限
    pub oi_stability_band: f64,
    // 边界有效所需原始分（6 因子中 ≥3，门槛用原始尺度）
    pub boundary_min_score: u8,
    // 15m 窄带宽阈值
    pub narrow_bandwidth: f64,
    // 假突破量比下限
    pub volume_min: f64,
    // 假突破量比上限（过高反而失效）
    pub volume_max: f64,
    // 突破幅度置信区间下限
    pub breach_min: f64,
    // 突破幅度置信区间上限
    pub breach_max: f64,
}

/// ICT 流水线阈值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IctConfig {
    // 日线结构回看根数
    pub structure_lookback: usize,
    // 日线放量确认比例
    pub daily_volume_ratio: f64,
    // 日线趋势确认分（|score| ≥ 2）
    pub daily_min_score: i8,
    // 订单块两侧方向性运动的 ATR 倍数
    pub move_atr_multiple: f64,
    // 订单块候选的量比上限（低量停顿）
    pub ob_volume_max_ratio: f64,
    // 订单块候选的实体/全幅上限（拒绝影线）
    pub ob_body_max_ratio: f64,
    // 订单块最小高度的 ATR 比例
    pub ob_min_height_atr: f64,
    // 订单块最大年龄（天）。文档值 30，引擎实际生效 60。
    pub ob_max_age_days: f64,
    // FVG 最小缺口的 ATR 比例
    pub fvg_min_size_atr: f64,
    // FVG 中间 K 线放量比例
    pub fvg_volume_ratio: f64,
    // 摆动点两侧窗口宽度
    pub swing_window: usize,
    // 摆动点检测回看根数
    pub sweep_lookback: usize,
    // 宏观 (4H) 最小摆动幅度
    pub macro_min_swing_pct: f64,
    // 微观 (15m) 最小摆动幅度
    pub micro_min_swing_pct: f64,
    // 宏观收回 K 线数上限
    pub macro_max_bars: usize,
    // 微观收回 K 线数上限
    pub micro_max_bars: usize,
    // 宏观扫荡速度的 ATR 比例阈值
    pub macro_speed_atr: f64,
    // 微观扫荡速度的 ATR 比例阈值
    pub micro_speed_atr: f64,
    // 吞没形态实体比例
    pub engulfing_body_ratio: f64,
    // 15m 入场放量确认比例
    pub entry_volume_ratio: f64,
    // 止损 ATR 倍数（订单块边界外扩）
    pub stop_atr_multiple: f64,
    // 简化结构止损比例
    pub structural_stop_pct: f64,
    // 固定盈亏比
    pub risk_reward: f64,
    // 默认杠杆
    pub default_leverage: u32,
}

/// 风控与杠杆推导参数（V3 与 ICT 共用同一个构建器）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    // V3 固定盈亏比
    pub v3_risk_reward: f64,
    // 杠杆公式中的保证金缓冲（0.5%）
    pub margin_buffer: f64,
    // 杠杆上限
    pub leverage_cap: u32,
    // 单笔最大亏损额（保证金推导用）
    pub max_loss_amount: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend: TrendConfig {
                direction_min_score: 2,
                trending_min_total: 4,
                adx_threshold: 20.0,
                expansion_ratio: 1.05,
                momentum_min_pct: 0.005,
            },
            hourly: HourlyConfig {
                breakout_lookback: 20,
                vol15m_ratio: 1.5,
                vol1h_ratio: 1.2,
                oi_long_min: 0.02,
                oi_short_max: -0.03,
                funding_abs_max: 0.0005,
                delta_long_min: 1.2,
                delta_short_max: 0.8,
                delta_window: 6,
                min_score: 3,
            },
            execution: ExecutionConfig {
                vwap_tolerance: 0.002,
                pullback_volume_ratio: 1.2,
                breakout_volume_ratio: 1.5,
                min_breakout_distance: 0.001,
                stop_atr_multiple: 1.2,
                min_confidence: 0.6,
            },
            range: RangeConfig {
                touch_lookback: 6,
                min_touches: 2,
                touch_tolerance: 0.005,
                vwap_mid_tolerance: 0.01,
                low_volume_max: 1.2,
                delta_band: 0.2,
                delta_window: 6,
                oi_stability_band: 0.02,
                boundary_min_score: 3,
                narrow_bandwidth: 0.05,
                volume_min: 1.0,
                volume_max: 2.0,
                breach_min: 0.01,
                breach_max: 0.03,
            },
            ict: IctConfig {
                structure_lookback: 10,
                daily_volume_ratio: 1.2,
                daily_min_score: 2,
                move_atr_multiple: 2.0,
                ob_volume_max_ratio: 0.8,
                ob_body_max_ratio: 0.3,
                ob_min_height_atr: 0.25,
                ob_max_age_days: 60.0,
                fvg_min_size_atr: 0.5,
                fvg_volume_ratio: 1.5,
                swing_window: 2,
                sweep_lookback: 50,
                macro_min_swing_pct: 0.01,
                micro_min_swing_pct: 0.005,
                macro_max_bars: 2,
                micro_max_bars: 3,
                macro_speed_atr: 0.4,
                micro_speed_atr: 0.2,
                engulfing_body_ratio: 1.2,
                entry_volume_ratio: 1.5,
                stop_atr_multiple: 1.5,
                structural_stop_pct: 0.03,
                risk_reward: 3.0,
                default_leverage: 5,
            },
            risk: RiskConfig {
                v3_risk_reward: 2.0,
                margin_buffer: 0.005,
                leverage_cap: 125,
                max_loss_amount: 50.0,
            },
        }
    }
}

/// 调度配置：交易对清单、抓取窗口与重试参数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    // 分析的交易对清单
    pub symbols: Vec<String>,
    // 扫描周期（秒）
    pub scan_interval_secs: u64,
    // 单交易对分析截止时间（秒）
    pub symbol_deadline_secs: u64,
    // 瞬时错误重试次数上限
    pub retry_attempts: usize,
    // 重试退避基数（毫秒，指数增长）
    pub retry_backoff_ms: u64,
    // 各周期抓取根数
    pub limit_daily: usize,
    pub limit_h4: usize,
    pub limit_h1: usize,
    pub limit_m15: usize,
    // 持仓量采样点数（1h 周期下 7 点覆盖 6 小时）
    pub oi_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                "BTCUSDT".to_string(),
                "ETHUSDT".to_string(),
                "SOLUSDT".to_string(),
                "BNBUSDT".to_string(),
            ],
            scan_interval_secs: 300,
            symbol_deadline_secs: 30,
            retry_attempts: 3,
            retry_backoff_ms: 500,
            limit_daily: 60,
            limit_h4: 250,
            limit_h1: 72,
            limit_m15: 96,
            oi_limit: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.trend.direction_min_score, 2);
        assert_eq!(config.trend.trending_min_total, 4);
        assert_eq!(config.hourly.min_score, 3);
        // 放宽后的生效值，而非文档值 30
        assert_eq!(config.ict.ob_max_age_days, 60.0);
        assert_eq!(config.risk.leverage_cap, 125);
    }

    #[test]
    fn test_default_scheduler_config() {
        let config = SchedulerConfig::default();
        assert!(config.symbols.contains(&"BTCUSDT".to_string()));
        assert_eq!(config.retry_attempts, 3);
        // MA200 需要 4H 窗口至少 200 根
        assert!(config.limit_h4 >= 200);
    }
}
