use crate::analysis::entity::{AnalysisKind, StrategyResult, SymbolCategory, WeightTable};
use crate::analysis::error::{AnalysisError, SinkError};
use async_trait::async_trait;

/// # Summary
/// 交易对分类与因子权重来源端口。
///
/// # Invariants
/// - 实现必须对任意输入返回可用值：缺失行回退到内建分类表与模板，
///   即 `ConfigMissing` 只作为诊断信息出现，不作为失败路径。
#[async_trait]
pub trait CategorySource: Send + Sync {
    /// # Summary
    /// 查询交易对所属分类。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    ///
    /// # Returns
    /// 成功返回分类；查不到时由实现回退到内建模式匹配表。
    async fn category_of(&self, symbol: &str) -> Result<SymbolCategory, AnalysisError>;

    /// # Summary
    /// 查询指定分类在某类分析下的因子权重模板。
    ///
    /// # Arguments
    /// * `category`: 交易对分类。
    /// * `kind`: 分析类型。
    ///
    /// # Returns
    /// 成功返回权重表（模板内权重之和为 1）。
    async fn factor_weights(
        &self,
        category: SymbolCategory,
        kind: AnalysisKind,
    ) -> Result<WeightTable, AnalysisError>;
}

/// # Summary
/// 策略结果发布端口：核心产出的唯一外发接口。
/// 由持久化/HTTP 边界实现；核心只写不读。
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// # Summary
    /// 发布一条策略结果。
    ///
    /// # Arguments
    /// * `result`: 装配完成的结果记录。
    ///
    /// # Returns
    /// 发布失败返回 SinkError（调度层记录告警，不中断分析）。
    async fn publish(&self, result: StrategyResult) -> Result<(), SinkError>;
}
