use nairex::App;
use nairex::config::AppConfig;
use nairex::core::asset::Asset;
use nairex::core::entry::{EntryKind, EntryMetadata};
use nairex::core::error::TradeError;
use nairex::rates::RateSource;
use nairex::store::{LedgerFilter, LedgerStore};
use rust_decimal_macros::dec;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Mock CoinGecko server answering `/simple/price` with `body`.
    pub async fn create_price_server(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn config_for(base_url: &str) -> String {
        format!(
            r#"
provider:
  base_url: "{base_url}"
  timeout_secs: 2
"#
        )
    }
}

fn app_for_server(uri: &str) -> App {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(config_file.path(), test_utils::config_for(uri)).expect("Failed to write config");
    let config =
        AppConfig::load_from_path(config_file.path()).expect("Failed to load config");
    App::build(&config).expect("Failed to build app")
}

#[test_log::test(tokio::test)]
async fn test_full_buy_sell_flow_with_live_rates() {
    let body = r#"{"bitcoin":{"ngn":85000000},"ethereum":{"ngn":5000000},"tether":{"ngn":1570}}"#;
    let mock_server = test_utils::create_price_server(body, 200).await;
    let app = app_for_server(&mock_server.uri());

    app.engine.provision_account("ada").await.unwrap();

    let buy = app.engine.buy("ada", Asset::Btc, dec!(50000)).await.unwrap();
    info!(crypto_amount = %buy.crypto_amount, "Buy settled");
    assert_eq!(buy.rate, dec!(85000000));
    assert_eq!(buy.fee, dec!(500));
    assert_eq!(buy.crypto_amount, dec!(0.00058824));
    assert_eq!(buy.new_balances.naira, dec!(49500));

    let sell = app
        .engine
        .sell("ada", Asset::Btc, buy.crypto_amount)
        .await
        .unwrap();
    assert_eq!(sell.naira_value, dec!(50000.40));
    assert_eq!(sell.new_balances.crypto, dec!(0));

    // Two trades, each with a linked fee entry
    let page = app
        .store
        .entries("ada", &LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items[0].kind, EntryKind::Fee);
    match &page.items[0].metadata {
        EntryMetadata::Fee {
            parent_reference, ..
        } => assert_eq!(parent_reference, &sell.entry.reference),
        other => panic!("Unexpected metadata: {other:?}"),
    }

    let portfolio = app.portfolio.get_portfolio("ada").await.unwrap();
    assert_eq!(portfolio.crypto[&Asset::Btc].balance, dec!(0));
    assert_eq!(portfolio.fiat.balance, sell.new_balances.naira);
}

#[test_log::test(tokio::test)]
async fn test_rates_degrade_to_fallback_when_upstream_errors() {
    let mock_server = test_utils::create_price_server("upstream exploded", 500).await;
    let app = app_for_server(&mock_server.uri());

    let quote = app.rates.get_rate(Asset::Btc).await;
    assert_eq!(quote.source, RateSource::Fallback);
    assert!(quote.rate > dec!(0));

    // Trading continues on the fallback rate and audits it.
    app.engine.provision_account("ada").await.unwrap();
    let buy = app.engine.buy("ada", Asset::Btc, dec!(50000)).await.unwrap();
    assert_eq!(buy.entry.rate, Some(quote.rate));
}

#[test_log::test(tokio::test)]
async fn test_rate_is_cached_across_requests() {
    let body = r#"{"tether":{"ngn":1570}}"#;
    let mock_server = test_utils::create_price_server(body, 200).await;
    let app = app_for_server(&mock_server.uri());

    for _ in 0..5 {
        let quote = app.rates.get_rate(Asset::Usdt).await;
        assert_eq!(quote.rate, dec!(1570));
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_rejected_sell_changes_nothing() {
    let body = r#"{"bitcoin":{"ngn":1000}}"#;
    let mock_server = test_utils::create_price_server(body, 200).await;
    let app = app_for_server(&mock_server.uri());

    app.engine.provision_account("ada").await.unwrap();
    // Hand the account some BTC without going through a buy.
    app.store
        .with_transaction(
            "ada",
            Box::new(|txn| {
                txn.credit_asset(Asset::Btc, dec!(0.1));
                Ok(())
            }),
        )
        .await
        .unwrap();

    // 0.1 BTC at rate 1000 is worth 100, under the 2000 minimum.
    let err = app.engine.sell("ada", Asset::Btc, dec!(0.1)).await.unwrap_err();
    assert!(matches!(err, TradeError::BelowMinimum { .. }));
    assert_eq!(err.code(), "below_minimum");

    let account = app.store.get_account("ada").await.unwrap();
    assert_eq!(account.fiat, dec!(100000));
    assert_eq!(account.holding(Asset::Btc), dec!(0.1));
    let page = app
        .store
        .entries("ada", &LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test_log::test(tokio::test)]
async fn test_accounts_are_isolated() {
    let body = r#"{"bitcoin":{"ngn":85000000}}"#;
    let mock_server = test_utils::create_price_server(body, 200).await;
    let app = app_for_server(&mock_server.uri());

    app.engine.provision_account("ada").await.unwrap();
    app.engine.provision_account("bola").await.unwrap();

    app.engine.buy("ada", Asset::Btc, dec!(50000)).await.unwrap();

    let bola = app.store.get_account("bola").await.unwrap();
    assert_eq!(bola.fiat, dec!(100000));
    let page = app
        .store
        .entries("bola", &LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}
