use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use shingo_core::common::TimeFrame;
use shingo_core::market::entity::{Candle, OpenInterestPoint};
use shingo_core::market::error::MarketError;
use shingo_core::market::port::MarketDataProvider;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

/// # Summary
/// Binance USDⓈ-M 合约行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，固定 10 秒超时。
/// - 只访问公共只读接口，不持有任何可变状态，可被多个分析并发共享。
#[derive(Clone)]
pub struct BinanceProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 接口基址（测试时可指向本地桩服务）
    base_url: String,
}

impl BinanceProvider {
    /// # Summary
    /// 创建一个指向生产环境的 BinanceProvider。
    pub fn new() -> Result<Self, MarketError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// # Summary
    /// 创建一个指向指定基址的 BinanceProvider。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时。
    /// 2. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `base_url`: 接口基址。
    ///
    /// # Returns
    /// 成功返回初始化后的实例；客户端构建失败返回 MarketError。
    pub fn with_base_url(base_url: &str) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MarketError::Unknown(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, MarketError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // Binance 对无效交易对返回 400 + code -1121
            if status.as_u16() == 400 && body.contains("-1121") {
                return Err(MarketError::InvalidSymbol(body));
            }
            return Err(MarketError::Http {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))
    }
}

/// /fapi/v1/ticker/price 响应。
#[derive(Deserialize, Debug)]
struct TickerPrice {
    price: String,
}

/// /fapi/v1/premiumIndex 响应（仅取资金费率字段）。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    last_funding_rate: String,
}

/// /futures/data/openInterestHist 响应行。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OpenInterestRow {
    sum_open_interest: String,
    timestamp: i64,
}

fn ts_ms_to_utc(ms: i64) -> Result<DateTime<Utc>, MarketError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| MarketError::Parse(format!("invalid timestamp: {ms}")))
}

fn parse_number(value: &Value) -> Option<f64> {
    value.as_str()?.parse().ok()
}

/// # Summary
/// 解析 /fapi/v1/klines 的单行数组为 Candle。
///
/// # Logic
/// 接口返回定长数组：[开盘时间, 开, 高, 低, 收, 量, 收盘时间, 成交额,
/// 成交笔数, 主动买入量, 主动买入额, 保留]，价格与量均为字符串数字。
///
/// # Returns
/// 字段缺失或无法解析时返回 None（由调用方整体判定为 Parse 错误）。
fn parse_kline_row(row: &[Value]) -> Option<Candle> {
    if row.len() < 11 {
        return None;
    }
    Some(Candle {
        open_time: Utc.timestamp_millis_opt(row[0].as_i64()?).single()?,
        close_time: Utc.timestamp_millis_opt(row[6].as_i64()?).single()?,
        open: parse_number(&row[1])?,
        high: parse_number(&row[2])?,
        low: parse_number(&row[3])?,
        close: parse_number(&row[4])?,
        volume: parse_number(&row[5])?,
        quote_volume: parse_number(&row[7])?,
        trades_count: row[8].as_u64()?,
        taker_buy_volume: parse_number(&row[9])?,
    })
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    /// # Summary
    /// 抓取指定周期的最近 K 线序列。
    ///
    /// # Logic
    /// 1. 请求 /fapi/v1/klines。
    /// 2. 逐行解析定长数组为 Candle；任何一行解析失败整体视为 Parse 错误，
    ///    避免悄悄返回残缺窗口。
    /// 3. 接口本身按时间升序返回。
    async fn get_klines(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        let json = self
            .get_json(
                "/fapi/v1/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", timeframe.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        let rows = json
            .as_array()
            .ok_or_else(|| MarketError::Parse("klines: expected array".to_string()))?;
        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            let row = row
                .as_array()
                .ok_or_else(|| MarketError::Parse("klines: expected row array".to_string()))?;
            let candle = parse_kline_row(row)
                .ok_or_else(|| MarketError::Parse("klines: malformed row".to_string()))?;
            candles.push(candle);
        }
        Ok(candles)
    }

    /// # Summary
    /// 获取最新成交价。
    async fn get_ticker(&self, symbol: &str) -> Result<f64, MarketError> {
        let json = self
            .get_json("/fapi/v1/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        let ticker: TickerPrice =
            serde_json::from_value(json).map_err(|e| MarketError::Parse(e.to_string()))?;
        ticker
            .price
            .parse()
            .map_err(|e| MarketError::Parse(format!("ticker price: {e}")))
    }

    /// # Summary
    /// 获取当前资金费率。
    async fn get_funding_rate(&self, symbol: &str) -> Result<f64, MarketError> {
        let json = self
            .get_json("/fapi/v1/premiumIndex", &[("symbol", symbol.to_string())])
            .await?;
        let premium: PremiumIndex =
            serde_json::from_value(json).map_err(|e| MarketError::Parse(e.to_string()))?;
        premium
            .last_funding_rate
            .parse()
            .map_err(|e| MarketError::Parse(format!("funding rate: {e}")))
    }

    /// # Summary
    /// 获取持仓量历史序列（按时间升序）。
    async fn get_open_interest_hist(
        &self,
        symbol: &str,
        period: TimeFrame,
        limit: usize,
    ) -> Result<Vec<OpenInterestPoint>, MarketError> {
        let json = self
            .get_json(
                "/futures/data/openInterestHist",
                &[
                    ("symbol", symbol.to_string()),
                    ("period", period.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        let rows: Vec<OpenInterestRow> =
            serde_json::from_value(json).map_err(|e| MarketError::Parse(e.to_string()))?;
        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            points.push(OpenInterestPoint {
                timestamp: ts_ms_to_utc(row.timestamp)?,
                open_interest: row
                    .sum_open_interest
                    .parse()
                    .map_err(|e| MarketError::Parse(format!("open interest: {e}")))?,
            });
        }
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }
}
