use crate::common::{Direction, MarketRegime, SignalKind, StrategyType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// 带标签的因子值：布尔门槛因子或比率因子。
/// 替代来源系统中「同一因子字段时而是布尔、时而是数值」的鸭子类型用法，
/// 使因子明细在序列化后仍保留语义。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value")]
pub enum FactorValue {
    // 是否通过某个门槛
    Bool(bool),
    // 连续比率（如量比、买卖盘比）
    Ratio(f64),
}

impl FactorValue {
    pub fn as_bool(self) -> bool {
        match self {
            FactorValue::Bool(b) => b,
            FactorValue::Ratio(r) => r > 0.0,
        }
    }
}

/// 因子名 -> 因子值的明细表，使用 BTreeMap 保证序列化顺序稳定（幂等输出）。
pub type FactorBreakdown = BTreeMap<String, FactorValue>;

/// # Summary
/// 交易对分类，决定各分析的因子权重模板。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    #[serde(rename = "mainstream")]
    Mainstream,
    #[serde(rename = "high-cap-trending")]
    HighCapTrending,
    #[serde(rename = "trending")]
    Trending,
    #[serde(rename = "smallcap")]
    SmallCap,
}

impl std::fmt::Display for SymbolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolCategory::Mainstream => write!(f, "mainstream"),
            SymbolCategory::HighCapTrending => write!(f, "high-cap-trending"),
            SymbolCategory::Trending => write!(f, "trending"),
            SymbolCategory::SmallCap => write!(f, "smallcap"),
        }
    }
}

/// # Summary
/// 权重分析类型：同一分类在不同分析下使用不同模板。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    // 1H 多因子打分
    Hourly,
    // 1H 区间边界有效性
    RangeBoundary,
}

/// # Summary
/// 因子权重表。
///
/// # Invariants
/// - 同一模板内权重之和为 1。
/// - 查询缺失因子时回退到均匀权重，配置缺失永远不是致命错误。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightTable {
    // 因子名 -> 权重
    weights: BTreeMap<String, f64>,
}

impl WeightTable {
    pub fn new(entries: &[(&str, f64)]) -> Self {
        Self {
            weights: entries
                .iter()
                .map(|(name, w)| ((*name).to_string(), *w))
                .collect(),
        }
    }

    /// # Summary
    /// 查询指定因子的权重。
    ///
    /// # Logic
    /// 1. 命中则返回配置值。
    /// 2. 缺失则回退到均匀权重 (1 / 因子数)，并记录告警。
    ///
    /// # Returns
    /// 因子权重。
    pub fn weight(&self, name: &str) -> f64 {
        if let Some(w) = self.weights.get(name) {
            return *w;
        }
        tracing::warn!(factor = name, "weight missing, falling back to uniform");
        if self.weights.is_empty() {
            1.0
        } else {
            1.0 / self.weights.len() as f64
        }
    }

    /// 模板内全部权重之和（校验用）。
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// # Summary
/// 4H 趋势过滤器结果（10 分制）。
///
/// # Invariants
/// - 方向子分 < 2 时 `total_score` 必须为 0 且分类为震荡市，其余因子不参与评估。
/// - 计算一次即为终态，由小时打分器或区间分析器二选一消费。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendScore {
    // 接受的方向；震荡市为 None
    pub direction: Option<Direction>,
    // 方向子分 (0-3)
    pub direction_score: u8,
    // 稳定性因子：最近两根 K 线实体方向一致
    pub stability: bool,
    // 强度因子：ADX > 阈值且 DI 同向
    pub strength: bool,
    // 布林带扩张因子
    pub expansion: bool,
    // 动量因子：|close-MA20|/MA20 达标
    pub momentum: bool,
    // 总分 (0-10)
    pub total_score: u8,
    // 市场形态分类
    pub classification: MarketRegime,
}

/// # Summary
/// 1H 多因子打分结果（6 分制，VWAP 硬门槛）。
///
/// # Invariants
/// - `vwap_gate_passed` 为 false 时 `score` 必须为 0 且信号为观望。
/// - 入场判定使用原始整数分，加权强度仅用于报告。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyScore {
    // VWAP 方向门槛是否通过
    pub vwap_gate_passed: bool,
    // 原始得分 (0-6)
    pub score: u8,
    // 交易信号
    pub signal: SignalKind,
    // 各因子明细
    pub factors: FactorBreakdown,
    // 分类加权后的归一化强度 [0,1]
    pub weighted_strength: f64,
}

impl HourlyScore {
    /// 观望结果（门槛未过或趋势缺失时的统一出口）。
    pub fn wait(vwap_gate_passed: bool, factors: FactorBreakdown) -> Self {
        Self {
            vwap_gate_passed,
            score: 0,
            signal: SignalKind::Wait,
            factors,
            weighted_strength: 0.0,
        }
    }

    /// 强度标签：强 / 中 / 弱（报告用）。
    pub fn strength_label(&self) -> &'static str {
        if self.weighted_strength >= 0.7 {
            "强"
        } else if self.weighted_strength >= 0.4 {
            "中"
        } else {
            "弱"
        }
    }
}

/// # Summary
/// 区间边界（上轨或下轨）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RangeEdge {
    Upper,
    Lower,
}

/// # Summary
/// 1H 区间边界有效性评估（双尺度设计）。
///
/// # Invariants
/// - 有效性门槛比较的是原始因子计数（6 分制中 ≥3），而非加权分。
/// - 加权分由分类模板决定贡献构成，仅用于报告。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryScore {
    // 评估的边界
    pub edge: RangeEdge,
    // 边界价位（布林带上/下轨）
    pub level: f64,
    // 是否有效（原始分门槛）
    pub valid: bool,
    // 原始因子计数 (0-6)
    pub raw_score: u8,
    // 分类加权分
    pub weighted_score: f64,
    // 各因子明细
    pub factors: FactorBreakdown,
}

/// # Summary
/// 15m 假突破入场信号。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FakeBreakout {
    // 入场方向（上轨假突破 -> 做空；下轨 -> 做多）
    pub direction: Direction,
    // 被突破后收回的边界价位
    pub boundary: f64,
    // 入场价
    pub entry_price: f64,
    // 突破幅度（相对边界）
    pub breach_ratio: f64,
    // 量比
    pub volume_ratio: f64,
    // 置信度
    pub confidence: f64,
}

/// # Summary
/// 15m 执行模式。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionMode {
    // 模式 A：回踩确认
    #[serde(rename = "A_pullback")]
    Pullback,
    // 模式 B：动能突破
    #[serde(rename = "B_breakout")]
    Breakout,
}

/// # Summary
/// 15m 执行信号。
///
/// # Invariants
/// - 每次调用、每个方向至多激活一个模式；两者同时有效时取置信度更高者。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionSignal {
    // 激活的执行模式
    pub mode: ExecutionMode,
    // 交易方向
    pub direction: Direction,
    // 入场价
    pub entry_price: f64,
    // 设置 K 线最高价（止损参考）
    pub setup_high: f64,
    // 设置 K 线最低价（止损参考）
    pub setup_low: f64,
    // 置信度 [0,1]
    pub confidence: f64,
}

/// # Summary
/// 订单块类型。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlockKind {
    #[serde(rename = "bullish")]
    Bullish,
    #[serde(rename = "bearish")]
    Bearish,
}

impl BlockKind {
    pub fn direction(self) -> Direction {
        match self {
            BlockKind::Bullish => Direction::Bull,
            BlockKind::Bearish => Direction::Bear,
        }
    }
}

/// # Summary
/// 订单块：强方向性运动之前的低量停顿 K 线区域。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderBlock {
    // 候选 K 线开始时间
    pub timestamp: DateTime<Utc>,
    // 区域上沿
    pub high: f64,
    // 区域下沿
    pub low: f64,
    // 类型
    pub kind: BlockKind,
    // 区域高度 (high - low)
    pub height: f64,
    // 候选 K 线量 / 局部平均量
    pub volume_ratio: f64,
    // 距今天数
    pub age_days: f64,
}

impl OrderBlock {
    /// # Summary
    /// 有效性判定。
    ///
    /// # Logic
    /// 高度单调：提高高度不会使有效块失效；年龄反单调：超过上限即失效。
    ///
    /// # Arguments
    /// * `min_height`: 最小高度（0.25 × ATR(4H)，可调）。
    /// * `max_age_days`: 最大存活天数。
    ///
    /// # Returns
    /// 有效返回 true。
    pub fn is_valid(&self, min_height: f64, max_age_days: f64) -> bool {
        self.height >= min_height && self.age_days <= max_age_days
    }
}

/// # Summary
/// 公允价值缺口：三根 K 线留下的未回补价格空隙。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FairValueGap {
    // 中间 K 线开始时间
    pub timestamp: DateTime<Utc>,
    // 缺口上沿
    pub high: f64,
    // 缺口下沿
    pub low: f64,
    // 类型
    pub kind: BlockKind,
    // 缺口大小
    pub size: f64,
    // 距今小时数
    pub age_hours: f64,
    // 后续 K 线对缺口的回补比例 [0,1]
    pub fill_percentage: f64,
    // 中间 K 线量 / 平均量
    pub volume_ratio: f64,
}

impl FairValueGap {
    /// 有效性：缺口大小超过下限且中间 K 线放量确认。
    pub fn is_valid(&self, min_size: f64, min_volume_ratio: f64) -> bool {
        self.size > min_size && self.volume_ratio >= min_volume_ratio
    }
}

/// # Summary
/// 流动性扫荡事件：摆动高/低点被快速刺穿后收回。
///
/// # Invariants
/// - `speed == exceed_amount / bars_to_return`。
/// - 空头扫荡 = 摆动高点被刺穿后拒绝（方向 Bear）；多头扫荡反之。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepEvent {
    // 被扫荡的摆动点价位
    pub swing_level: f64,
    // 事件蕴含的方向偏置
    pub direction: Direction,
    // 刺穿幅度（绝对价格）
    pub exceed_amount: f64,
    // 收回所用的 K 线数
    pub bars_to_return: usize,
    // 扫荡速度 = exceed_amount / bars_to_return
    pub speed: f64,
}

impl SweepEvent {
    /// 有效性：收回足够快且速度达到 ATR 比例阈值。
    pub fn is_valid(&self, max_bars: usize, min_speed: f64) -> bool {
        self.bars_to_return <= max_bars && self.speed >= min_speed
    }
}

/// # Summary
/// 风控计划：一个被接受信号的完整下单参数。
///
/// # Invariants
/// - 构建后不再变更。
/// - 止损必须严格位于入场价的亏损侧，止盈必须严格位于盈利侧。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskPlan {
    // 入场价
    pub entry: f64,
    // 止损价
    pub stop_loss: f64,
    // 止盈价
    pub take_profit: f64,
    // 止损距离（绝对价格）
    pub stop_distance: f64,
    // 盈亏比
    pub risk_reward_ratio: f64,
    // 杠杆倍数
    pub leverage: u32,
    // 建议保证金
    pub margin: f64,
}

/// # Summary
/// 策略结果：信号装配器产出的版本化记录，交付给持久化/HTTP 边界。
/// 核心自身从不回读。
///
/// # Invariants
/// - 必须可 JSON 序列化，并携带全部中间评分明细以供外层审计。
/// - 除 `timestamp` 外不依赖墙钟；同一快照 + 同一 `now` 必须产出逐位相同的记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    // 交易对代码
    pub symbol: String,
    // 策略流水线类型
    pub strategy_type: StrategyType,
    // 市场形态
    pub market_type: MarketRegime,
    // 交易信号
    pub signal: SignalKind,
    // 风控计划（仅入场信号携带）
    pub risk: Option<RiskPlan>,
    // 置信度 [0,1]
    pub confidence: f64,
    // 中间评分完整明细
    pub breakdown: serde_json::Value,
    // 诊断字段：数据不足 / 上游不可用等被本地恢复的错误
    pub error: Option<String>,
    // 结果时间戳（由调用方显式传入的 now）
    pub timestamp: DateTime<Utc>,
}
