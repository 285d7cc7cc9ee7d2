use async_trait::async_trait;
use dashmap::DashMap;
use shingo_core::analysis::entity::StrategyResult;
use shingo_core::analysis::error::SinkError;
use shingo_core::analysis::port::ResultSink;
use shingo_core::common::StrategyType;

/// # Summary
/// 基于 DashMap 的内存结果存储：每个 (交易对, 策略) 只保留最新一条结果。
/// 这是被排除的持久化/HTTP 边界在本仓库内的只读替身。
///
/// # Invariants
/// - 所有操作均通过并发哈希表执行，可被多个分析任务并发写入。
/// - 同 Key 覆盖写入，不保留历史。
pub struct MemoryResultStore {
    // (symbol, strategy) -> 最新结果
    storage: DashMap<(String, StrategyType), StrategyResult>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// # Summary
    /// 读取指定 (交易对, 策略) 的最新结果。
    pub fn get(&self, symbol: &str, strategy: StrategyType) -> Option<StrategyResult> {
        self.storage
            .get(&(symbol.to_string(), strategy))
            .map(|r| r.value().clone())
    }

    /// # Summary
    /// 读取全部最新结果的克隆列表。
    pub fn all(&self) -> Vec<StrategyResult> {
        self.storage.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for MemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultSink for MemoryResultStore {
    /// # Summary
    /// 发布一条结果：按 (symbol, strategy) 覆盖写入。
    async fn publish(&self, result: StrategyResult) -> Result<(), SinkError> {
        self.storage
            .insert((result.symbol.clone(), result.strategy_type), result);
        Ok(())
    }
}
