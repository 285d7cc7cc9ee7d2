use thiserror::Error;

/// # Summary
/// 指标层错误枚举。
///
/// # Invariants
/// - 窗口过短是预期情况，必须返回 `InsufficientData` 而非 panic。
/// - 输入中残留非有限值属于调用方违约，返回 `InvalidInput` 以便尽早暴露。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    // 窗口长度不足以计算该指标
    #[error("Insufficient data: required {required}, actual {actual}")]
    InsufficientData { required: usize, actual: usize },
    // 输入包含非有限或非正的价格/成交量
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
