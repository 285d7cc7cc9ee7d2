use async_trait::async_trait;
use shingo_core::analysis::entity::{AnalysisKind, SymbolCategory, WeightTable};
use shingo_core::analysis::error::AnalysisError;
use shingo_core::analysis::port::CategorySource;

/// # Summary
/// 内建分类与权重模板来源：按符号模式表分类，按分类取静态权重模板。
///
/// # Invariants
/// - 对任意输入都能给出可用值：未知符号回退到 smallcap 分类，
///   模板内权重之和恒为 1。
pub struct BuiltinCategorySource;

// 主流币
const MAINSTREAM: &[&str] = &["BTCUSDT", "ETHUSDT"];
// 高市值强趋势
const HIGH_CAP_TRENDING: &[&str] = &["SOLUSDT", "BNBUSDT", "XRPUSDT", "ADAUSDT"];
// 热点币
const TRENDING: &[&str] = &["DOGEUSDT", "AVAXUSDT", "LINKUSDT", "DOTUSDT", "LTCUSDT"];

impl BuiltinCategorySource {
    pub fn new() -> Self {
        Self
    }

    fn classify(symbol: &str) -> SymbolCategory {
        let upper = symbol.to_uppercase();
        if MAINSTREAM.contains(&upper.as_str()) {
            SymbolCategory::Mainstream
        } else if HIGH_CAP_TRENDING.contains(&upper.as_str()) {
            SymbolCategory::HighCapTrending
        } else if TRENDING.contains(&upper.as_str()) {
            SymbolCategory::Trending
        } else {
            tracing::debug!(symbol, "unknown symbol, defaulting to smallcap");
            SymbolCategory::SmallCap
        }
    }

    fn hourly_weights(category: SymbolCategory) -> WeightTable {
        // 因子：vwap / breakout / volume / oi / funding / delta
        let entries: &[(&str, f64)] = match category {
            SymbolCategory::Mainstream => &[
                ("vwap", 0.25),
                ("breakout", 0.20),
                ("volume", 0.20),
                ("oi", 0.15),
                ("funding", 0.10),
                ("delta", 0.10),
            ],
            SymbolCategory::HighCapTrending => &[
                ("vwap", 0.20),
                ("breakout", 0.25),
                ("volume", 0.20),
                ("oi", 0.15),
                ("funding", 0.10),
                ("delta", 0.10),
            ],
            SymbolCategory::Trending => &[
                ("vwap", 0.15),
                ("breakout", 0.30),
                ("volume", 0.25),
                ("oi", 0.10),
                ("funding", 0.10),
                ("delta", 0.10),
            ],
            SymbolCategory::SmallCap => &[
                ("vwap", 0.10),
                ("breakout", 0.30),
                ("volume", 0.30),
                ("oi", 0.10),
                ("funding", 0.10),
                ("delta", 0.10),
            ],
        };
        WeightTable::new(entries)
    }

    fn range_weights(category: SymbolCategory) -> WeightTable {
        // 因子：vwap_mid / touch / volume / delta / oi / no_breakout。
        // 「近期无突破」只在主流币模板中持有权重。
        let entries: &[(&str, f64)] = match category {
            SymbolCategory::Mainstream => &[
                ("vwap_mid", 0.20),
                ("touch", 0.20),
                ("volume", 0.20),
                ("delta", 0.15),
                ("oi", 0.15),
                ("no_breakout", 0.10),
            ],
            SymbolCategory::HighCapTrending => &[
                ("vwap_mid", 0.25),
                ("touch", 0.25),
                ("volume", 0.20),
                ("delta", 0.15),
                ("oi", 0.15),
                ("no_breakout", 0.0),
            ],
            SymbolCategory::Trending => &[
                ("vwap_mid", 0.20),
                ("touch", 0.30),
                ("volume", 0.20),
                ("delta", 0.15),
                ("oi", 0.15),
                ("no_breakout", 0.0),
            ],
            SymbolCategory::SmallCap => &[
                ("vwap_mid", 0.15),
                ("touch", 0.35),
                ("volume", 0.25),
                ("delta", 0.15),
                ("oi", 0.10),
                ("no_breakout", 0.0),
            ],
        };
        WeightTable::new(entries)
    }
}

impl Default for BuiltinCategorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategorySource for BuiltinCategorySource {
    /// # Summary
    /// 按内建模式表查询交易对分类。
    async fn category_of(&self, symbol: &str) -> Result<SymbolCategory, AnalysisError> {
        Ok(Self::classify(symbol))
    }

    /// # Summary
    /// 查询分类在指定分析类型下的权重模板。
    async fn factor_weights(
        &self,
        category: SymbolCategory,
        kind: AnalysisKind,
    ) -> Result<WeightTable, AnalysisError> {
        Ok(match kind {
            AnalysisKind::Hourly => Self::hourly_weights(category),
            AnalysisKind::RangeBoundary => Self::range_weights(category),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_classify_by_pattern_table() {
        assert_eq!(BuiltinCategorySource::classify("BTCUSDT"), SymbolCategory::Mainstream);
        assert_eq!(BuiltinCategorySource::classify("solusdt"), SymbolCategory::HighCapTrending);
        assert_eq!(BuiltinCategorySource::classify("DOGEUSDT"), SymbolCategory::Trending);
        assert_eq!(BuiltinCategorySource::classify("PEPEUSDT"), SymbolCategory::SmallCap);
    }

    #[test]
    fn every_template_sums_to_one() {
        let categories = [
            SymbolCategory::Mainstream,
            SymbolCategory::HighCapTrending,
            SymbolCategory::Trending,
            SymbolCategory::SmallCap,
        ];
        for category in categories {
            let hourly = BuiltinCategorySource::hourly_weights(category);
            assert!((hourly.total() - 1.0).abs() < 1e-9, "{category} hourly");
            let range = BuiltinCategorySource::range_weights(category);
            assert!((range.total() - 1.0).abs() < 1e-9, "{category} range");
        }
    }

    #[test]
    fn no_breakout_weight_is_mainstream_only() {
        let mainstream = BuiltinCategorySource::range_weights(SymbolCategory::Mainstream);
        assert!(mainstream.weight("no_breakout") > 0.0);
        let smallcap = BuiltinCategorySource::range_weights(SymbolCategory::SmallCap);
        assert_eq!(smallcap.weight("no_breakout"), 0.0);
    }
}
