use thiserror::Error;

/// # Summary
/// 行情数据域错误枚举，处理网络、解析及数据缺失等问题。
/// 区分瞬时错误（可退避重试）与永久错误（立即失败）。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `is_transient` 的判定决定调度层是否重试，新增变体时必须归类。
#[derive(Error, Debug)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 服务端返回非 2xx 状态码
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    // 数据解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 交易对不存在或不可交易
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    // 请求的数据未找到 (404 或内容为空)
    #[error("Data not found")]
    NotFound,
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl MarketError {
    /// # Summary
    /// 判断错误是否为瞬时性（网络抖动 / 服务端过载 / 限频）。
    ///
    /// # Logic
    /// 1. 网络错误一律视为瞬时。
    /// 2. HTTP 5xx 与 429 视为瞬时，其余状态码视为永久。
    /// 3. 解析错误、无效交易对与数据缺失均为永久错误。
    ///
    /// # Returns
    /// 瞬时错误返回 true，调用方可在退避后重试。
    pub fn is_transient(&self) -> bool {
        match self {
            MarketError::Network(_) => true,
            MarketError::Http { status, .. } => *status >= 500 || *status == 429,
            MarketError::Parse(_)
            | MarketError::InvalidSymbol(_)
            | MarketError::NotFound
            | MarketError::Unknown(_) => false,
        }
    }
}
