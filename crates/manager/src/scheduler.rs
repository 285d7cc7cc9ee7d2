use chrono::{DateTime, Utc};
use shingo_core::analysis::entity::{AnalysisKind, StrategyResult, WeightTable};
use shingo_core::analysis::port::{CategorySource, ResultSink};
use shingo_core::common::{MarketRegime, SignalKind, StrategyType};
use shingo_core::config::{AnalysisConfig, SchedulerConfig};
use shingo_core::market::port::MarketDataProvider;
use shingo_ict::{IctAnalysis, IctAnalyzer};
use shingo_v3::{V3Analysis, V3Analyzer};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::fetch::SnapshotFetcher;

/// # Summary
/// 信号调度器：系统的应用服务层门面 (Facade)。
/// 编译期仅依赖 core 中的端口定义，所有具体实现通过构造函数注入。
///
/// # Invariants
/// - 各交易对的分析相互独立、全并行；单交易对内部严格串行。
/// - 单交易对的任何失败都恢复为观望结果并记录诊断，不影响其余交易对。
/// - 除结果自身的时间戳外不读墙钟：`now` 由调用方显式传入并贯穿全程。
pub struct SignalScheduler {
    // 行情快照抓取
    fetcher: SnapshotFetcher,
    // 分类与权重端口
    categories: Arc<dyn CategorySource>,
    // 结果发布端口
    sink: Arc<dyn ResultSink>,
    // V3 流水线
    v3: V3Analyzer,
    // ICT 流水线
    ict: IctAnalyzer,
    // 调度参数
    config: SchedulerConfig,
}

impl SignalScheduler {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        categories: Arc<dyn CategorySource>,
        sink: Arc<dyn ResultSink>,
        analysis_config: AnalysisConfig,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            fetcher: SnapshotFetcher::new(provider, config.clone()),
            categories,
            sink,
            v3: V3Analyzer::new(analysis_config.clone()),
            ict: IctAnalyzer::new(analysis_config),
            config,
        })
    }

    /// # Summary
    /// 按固定间隔持续扫描全部交易对，直到任务被取消。
    pub async fn run_forever(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.scan_interval_secs));
        loop {
            interval.tick().await;
            let results = self.scan_all(Utc::now()).await;
            tracing::info!(count = results.len(), "scan finished");
        }
    }

    /// # Summary
    /// 并行分析全部交易对并发布结果。
    ///
    /// # Logic
    /// 1. 每个交易对 spawn 一个独立协程（JoinSet）。
    /// 2. 协程内部套用单交易对截止时间。
    /// 3. 汇总全部结果并逐条发布到结果端口（发布失败仅告警）。
    ///
    /// # Arguments
    /// * `now`: 显式当前时间，写入结果时间戳并用于年龄过滤。
    ///
    /// # Returns
    /// 本轮产出的全部结果（每个交易对两条：V3 与 ICT）。
    pub async fn scan_all(self: &Arc<Self>, now: DateTime<Utc>) -> Vec<StrategyResult> {
        let mut tasks: JoinSet<Vec<StrategyResult>> = JoinSet::new();
        for symbol in self.config.symbols.clone() {
            let this = self.clone();
            tasks.spawn(async move { this.analyze_symbol(&symbol, now).await });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(mut symbol_results) => results.append(&mut symbol_results),
                Err(err) => tracing::error!(error = %err, "analysis task panicked"),
            }
        }

        for result in &results {
            if let Err(err) = self.sink.publish(result.clone()).await {
                tracing::warn!(symbol = %result.symbol, error = %err, "publish failed");
            }
        }
        results
    }

    /// # Summary
    /// 分析单个交易对，始终返回 V3 与 ICT 各一条结果。
    ///
    /// # Logic
    /// 1. 整个分析套在截止时间内；超时即判为观望并记录诊断。
    /// 2. 快照抓取失败（重试耗尽）同样恢复为观望。
    /// 3. 两条流水线顺序执行，各自的错误独立恢复。
    pub async fn analyze_symbol(&self, symbol: &str, now: DateTime<Utc>) -> Vec<StrategyResult> {
        let deadline = Duration::from_secs(self.config.symbol_deadline_secs);
        match tokio::time::timeout(deadline, self.analyze_symbol_inner(symbol, now)).await {
            Ok(results) => results,
            Err(_) => {
                tracing::warn!(symbol, "symbol analysis exceeded deadline");
                vec![
                    self.wait_result(symbol, StrategyType::V3, "deadline exceeded", now),
                    self.wait_result(symbol, StrategyType::Ict, "deadline exceeded", now),
                ]
            }
        }
    }

    async fn analyze_symbol_inner(&self, symbol: &str, now: DateTime<Utc>) -> Vec<StrategyResult> {
        let snapshot = match self.fetcher.fetch(symbol).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(symbol, error = %err, "snapshot fetch failed");
                let message = format!("upstream unavailable: {err}");
                return vec![
                    self.wait_result(symbol, StrategyType::V3, &message, now),
                    self.wait_result(symbol, StrategyType::Ict, &message, now),
                ];
            }
        };

        let (hourly_weights, range_weights) = self.weights_for(symbol).await;

        let v3_result = match self.v3.analyze(&snapshot, &hourly_weights, &range_weights) {
            Ok(analysis) => self.v3_result(symbol, &analysis, now),
            Err(err) => {
                tracing::warn!(symbol, error = %err, "v3 analysis degraded to wait");
                self.wait_result(symbol, StrategyType::V3, &err.to_string(), now)
            }
        };
        let ict_result = match self.ict.analyze(&snapshot, now) {
            Ok(analysis) => self.ict_result(symbol, &analysis, now),
            Err(err) => {
                tracing::warn!(symbol, error = %err, "ict analysis degraded to wait");
                self.wait_result(symbol, StrategyType::Ict, &err.to_string(), now)
            }
        };
        vec![v3_result, ict_result]
    }

    /// 分类与两张权重模板；端口异常时回退均匀模板（配置缺失永不致命）。
    async fn weights_for(&self, symbol: &str) -> (WeightTable, WeightTable) {
        let uniform = || {
            WeightTable::new(&[
                ("vwap", 1.0 / 6.0),
                ("breakout", 1.0 / 6.0),
                ("volume", 1.0 / 6.0),
                ("oi", 1.0 / 6.0),
                ("funding", 1.0 / 6.0),
                ("delta", 1.0 / 6.0),
            ])
        };
        let category = match self.categories.category_of(symbol).await {
            Ok(category) => category,
            Err(err) => {
                tracing::warn!(symbol, error = %err, "category lookup failed, using defaults");
                return (uniform(), uniform());
            }
        };
        let hourly = self
            .categories
            .factor_weights(category, AnalysisKind::Hourly)
            .await
            .unwrap_or_else(|_| uniform());
        let range = self
            .categories
            .factor_weights(category, AnalysisKind::RangeBoundary)
            .await
            .unwrap_or_else(|_| uniform());
        (hourly, range)
    }

    fn v3_result(&self, symbol: &str, analysis: &V3Analysis, now: DateTime<Utc>) -> StrategyResult {
        StrategyResult {
            symbol: symbol.to_string(),
            strategy_type: StrategyType::V3,
            market_type: analysis.market_type,
            signal: analysis.signal,
            risk: analysis.risk.clone(),
            confidence: analysis.confidence,
            breakdown: to_breakdown(analysis),
            error: None,
            timestamp: now,
        }
    }

    fn ict_result(&self, symbol: &str, analysis: &IctAnalysis, now: DateTime<Utc>) -> StrategyResult {
        StrategyResult {
            symbol: symbol.to_string(),
            strategy_type: StrategyType::Ict,
            market_type: analysis.market_type,
            signal: analysis.signal,
            risk: analysis.risk.clone(),
            confidence: analysis.confidence,
            breakdown: to_breakdown(analysis),
            error: None,
            timestamp: now,
        }
    }

    fn wait_result(
        &self,
        symbol: &str,
        strategy_type: StrategyType,
        error: &str,
        now: DateTime<Utc>,
    ) -> StrategyResult {
        StrategyResult {
            symbol: symbol.to_string(),
            strategy_type,
            market_type: MarketRegime::Ranging,
            signal: SignalKind::Wait,
            risk: None,
            confidence: 0.0,
            breakdown: serde_json::Value::Null,
            error: Some(error.to_string()),
            timestamp: now,
        }
    }
}

fn to_breakdown<T: serde::Serialize>(analysis: &T) -> serde_json::Value {
    serde_json::to_value(analysis).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "breakdown serialization failed");
        serde_json::Value::Null
    })
}
