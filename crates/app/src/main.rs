use std::sync::Arc;

use shingo_core::config::{AnalysisConfig, SchedulerConfig};
use shingo_feed::BinanceProvider;
use shingo_manager::{BuiltinCategorySource, MemoryResultStore, SignalScheduler};
use tracing::info;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 SignalScheduler。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 实例化基础设施层（行情提供者、分类来源、结果存储）。
/// 3. 构造调度器并启动扫描协程。
/// 4. 挂起等待外部信号退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt::init();
    info!("Shingo engine starting...");

    // 2. 实例化基础设施层
    let provider = Arc::new(BinanceProvider::new()?);
    let categories = Arc::new(BuiltinCategorySource::new());
    let store = Arc::new(MemoryResultStore::new());

    // 3. 构造调度器（注入 Core Trait 抽象）
    let scheduler = SignalScheduler::new(
        provider,
        categories,
        store.clone(),
        AnalysisConfig::default(),
        SchedulerConfig::default(),
    );

    // 4. 启动扫描协程
    let scan_task = tokio::spawn(scheduler.run_forever());
    info!("SignalScheduler started. Waiting for signals...");

    // 5. 挂起主线程，等待外部退出信号
    tokio::signal::ctrl_c().await?;
    info!(results = store.len(), "Shutdown signal received. Exiting...");
    scan_task.abort();

    Ok(())
}
