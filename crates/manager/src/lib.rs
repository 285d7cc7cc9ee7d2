//! # `shingo-manager` - 调度与装配层
//!
//! 按交易对并行地抓取行情快照、顺序执行 V3 与 ICT 两条流水线、
//! 把分析产物装配为 [`StrategyResult`] 并发布到结果端口。
//! 单个交易对的失败（数据不足、上游不可用、超时）在本地恢复为观望结果，
//! 永不中断其余交易对的批量分析。
//!
//! [`StrategyResult`]: shingo_core::analysis::entity::StrategyResult

pub mod category;
pub mod fetch;
pub mod scheduler;
pub mod store;

pub use category::BuiltinCategorySource;
pub use scheduler::SignalScheduler;
pub use store::MemoryResultStore;
