use shingo_core::common::TimeFrame;
use shingo_core::market::port::MarketDataProvider;
use shingo_feed::BinanceProvider;

// 真实网络集成测试：默认忽略，本地联网时用
// `cargo test -p shingo-feed -- --ignored` 手工执行。

#[tokio::test]
#[ignore]
async fn fetches_ordered_klines_from_production() {
    let provider = BinanceProvider::new().unwrap();
    let candles = provider
        .get_klines("BTCUSDT", TimeFrame::Hour4, 50)
        .await
        .unwrap();
    assert_eq!(candles.len(), 50);
    assert!(candles.windows(2).all(|w| w[0].open_time < w[1].open_time));
    assert!(candles.iter().all(|c| c.is_well_formed()));
}

#[tokio::test]
#[ignore]
async fn fetches_ticker_funding_and_open_interest() {
    let provider = BinanceProvider::new().unwrap();
    let price = provider.get_ticker("BTCUSDT").await.unwrap();
    assert!(price > 0.0);

    let funding = provider.get_funding_rate("BTCUSDT").await.unwrap();
    assert!(funding.abs() < 0.05);

    let points = provider
        .get_open_interest_hist("BTCUSDT", TimeFrame::Hour1, 7)
        .await
        .unwrap();
    assert!(!points.is_empty());
    assert!(points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
#[ignore]
async fn invalid_symbol_maps_to_permanent_error() {
    let provider = BinanceProvider::new().unwrap();
    let result = provider.get_ticker("DEFINITELYNOTASYMBOL").await;
    let err = result.unwrap_err();
    assert!(!err.is_transient());
}
