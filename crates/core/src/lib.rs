//! # `shingo-core` - 领域核心
//!
//! 本 crate 定义 Shingo 信号引擎的领域实体、端口 (Port) 契约与错误类型。
//! 不包含任何具体 I/O 实现：行情适配、指标计算、策略流水线与调度
//! 分别位于 `shingo-feed`、`shingo-indicator`、`shingo-v3` / `shingo-ict`
//! 与 `shingo-manager`。
//!
//! ## 架构职责
//! - `common`: 交易周期、方向、信号等基础值对象
//! - `market`: K 线 / 行情快照实体与行情数据提供者端口
//! - `indicator`: 指标快照实体与指标层错误
//! - `analysis`: 评分实体、风控计划、结果记录与分类/结果端口
//! - `config`: 全部阈值的静态配置（代码级默认值）

pub mod analysis;
pub mod common;
pub mod config;
pub mod indicator;
pub mod market;
