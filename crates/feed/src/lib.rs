//! # `shingo-feed` - 行情数据适配层
//!
//! Binance USDⓈ-M 合约行情的 [`MarketDataProvider`] 实现。
//! 使用 `reqwest` 异步客户端访问公共接口（K 线 / 最新价 / 资金费率 / 持仓量历史），
//! 并把 HTTP 与解析失败映射进 `MarketError` 的瞬时/永久分类。
//!
//! [`MarketDataProvider`]: shingo_core::market::port::MarketDataProvider

pub mod binance;

pub use binance::BinanceProvider;
