//! # `shingo-ict` - ICT 结构化流水线
//!
//! 聪明钱概念 (Smart Money Concepts) 的规则化实现：
//! 日线趋势评分 → 4H 结构检测（订单块 / 公允价值缺口）→
//! 宏观流动性扫荡 → 15m 入场确认 → 风控推导。
//! 每一步都是硬门槛，失败即以观望收尾，不回溯。

pub mod daily;
pub mod engine;
pub mod structure;
pub mod sweep;

pub use engine::{IctAnalysis, IctAnalyzer, LtfEntry};
