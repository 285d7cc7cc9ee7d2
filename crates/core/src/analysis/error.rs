use crate::indicator::error::IndicatorError;
use crate::market::error::MarketError;
use thiserror::Error;

/// # Summary
/// 分析域错误枚举，覆盖规范定义的四类错误。
///
/// # Invariants
/// - `InsufficientData` 与 `Upstream` 在单个交易对内部被本地恢复为观望结果，
///   从不向外抛出、也从不中断其余交易对的批量分析。
/// - `ConfigMissing` 永远有安全默认值兜底，不是致命错误。
#[derive(Error, Debug)]
pub enum AnalysisError {
    // 窗口内 K 线数量不足
    #[error("Insufficient data: required {required}, actual {actual}")]
    InsufficientData { required: usize, actual: usize },
    // 输入数据非法（非有限/非正价格等）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    // 上游行情源不可用
    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] MarketError),
    // 分类或权重配置缺失（已回退默认值）
    #[error("Config missing: {0}")]
    ConfigMissing(String),
}

impl From<IndicatorError> for AnalysisError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { required, actual } => {
                AnalysisError::InsufficientData { required, actual }
            }
            IndicatorError::InvalidInput(msg) => AnalysisError::InvalidInput(msg),
        }
    }
}

/// # Summary
/// 结果发布端口错误。
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Publish failed: {0}")]
    Publish(String),
}
