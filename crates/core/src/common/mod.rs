use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 交易时间周期枚举，定义 K 线的时间跨度。
///
/// # Invariants
/// - 字符串形式与交易所 interval 参数一致 (15m/1h/4h/1d)。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    // 15分钟
    Min15,
    // 1小时
    Hour1,
    // 4小时
    Hour4,
    // 1日
    Day1,
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "15m" | "min15" => Ok(TimeFrame::Min15),
            "1h" | "hour1" => Ok(TimeFrame::Hour1),
            "4h" | "hour4" => Ok(TimeFrame::Hour4),
            "1d" | "day1" => Ok(TimeFrame::Day1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeFrame::Min15 => write!(f, "15m"),
            TimeFrame::Hour1 => write!(f, "1h"),
            TimeFrame::Hour4 => write!(f, "4h"),
            TimeFrame::Day1 => write!(f, "1d"),
        }
    }
}

/// # Summary
/// 行情方向，多头或空头。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "BULL")]
    Bull,
    #[serde(rename = "BEAR")]
    Bear,
}

impl Direction {
    /// 方向符号：多头 +1.0，空头 -1.0。用于统一止损/止盈的加减运算。
    pub fn sign(self) -> f64 {
        match self {
            Direction::Bull => 1.0,
            Direction::Bear => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Bull => Direction::Bear,
            Direction::Bear => Direction::Bull,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Bull => write!(f, "BULL"),
            Direction::Bear => write!(f, "BEAR"),
        }
    }
}

/// # Summary
/// 离散交易信号：做多 / 做空 / 观望。
///
/// # Invariants
/// - 序列化形式保持中文标签，供前端与持久层直接展示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignalKind {
    #[serde(rename = "做多")]
    Long,
    #[serde(rename = "做空")]
    Short,
    #[serde(rename = "观望")]
    Wait,
}

impl SignalKind {
    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Bull => SignalKind::Long,
            Direction::Bear => SignalKind::Short,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Long => write!(f, "做多"),
            SignalKind::Short => write!(f, "做空"),
            SignalKind::Wait => write!(f, "观望"),
        }
    }
}

/// # Summary
/// 市场形态分类：多头趋势 / 空头趋势 / 震荡市。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketRegime {
    #[serde(rename = "多头趋势")]
    TrendUp,
    #[serde(rename = "空头趋势")]
    TrendDown,
    #[serde(rename = "震荡市")]
    Ranging,
}

impl MarketRegime {
    /// 趋势形态对应的方向；震荡市没有方向。
    pub fn direction(self) -> Option<Direction> {
        match self {
            MarketRegime::TrendUp => Some(Direction::Bull),
            MarketRegime::TrendDown => Some(Direction::Bear),
            MarketRegime::Ranging => None,
        }
    }

    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Bull => MarketRegime::TrendUp,
            Direction::Bear => MarketRegime::TrendDown,
        }
    }
}

impl std::fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketRegime::TrendUp => write!(f, "多头趋势"),
            MarketRegime::TrendDown => write!(f, "空头趋势"),
            MarketRegime::Ranging => write!(f, "震荡市"),
        }
    }
}

/// # Summary
/// 策略流水线类型。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StrategyType {
    V3,
    #[serde(rename = "ICT")]
    Ict,
}

impl std::fmt::Display for StrategyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyType::V3 => write!(f, "V3"),
            StrategyType::Ict => write!(f, "ICT"),
        }
    }
}
