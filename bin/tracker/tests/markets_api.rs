use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracker::coingecko::{CoinGeckoClient, MarketQuery, MarketSource};
use tracker::config::CoinGeckoConfig;
use tracker::errors::FetchError;

const MARKETS_BODY: &str = r#"[
    {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":64000.0,
     "market_cap":1260000000000,"market_cap_rank":1,"total_volume":28000000000,
     "price_change_percentage_24h":1.5},
    {"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":3100.0,
     "market_cap":373000000000,"market_cap_rank":2,"total_volume":14000000000,
     "price_change_percentage_24h":-2.25},
    {"id":"tether","symbol":"usdt","name":"Tether","current_price":1.0,
     "market_cap":110000000000,"market_cap_rank":3,"total_volume":50000000000,
     "price_change_percentage_24h":null}
]"#;

#[derive(Clone)]
struct MockMarkets {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn markets(
    State(mock): State<MockMarkets>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    mock.seen.lock().unwrap().push(params);
    (mock.status, mock.body)
}

/// Serve `/api/v3/coins/markets` on an ephemeral port; returns the base URL
async fn spawn_mock(mock: MockMarkets) -> String {
    let app = Router::new()
        .route("/api/v3/coins/markets", get(markets))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v3/", addr)
}

fn client_for(base_url: String) -> CoinGeckoClient {
    CoinGeckoClient::new(&CoinGeckoConfig {
        base_url,
        timeout_secs: 10,
        ..Default::default()
    })
    .unwrap()
}

fn mock(status: StatusCode, body: &'static str) -> MockMarkets {
    MockMarkets {
        status,
        body,
        seen: Arc::new(Mutex::new(Vec::new())),
    }
}

#[tokio::test]
async fn test_fetch_markets_success() {
    let mock = mock(StatusCode::OK, MARKETS_BODY);
    let seen = mock.seen.clone();
    let client = client_for(spawn_mock(mock).await);

    let table = client
        .fetch_markets(&MarketQuery::new(50, "USD").unwrap())
        .await
        .unwrap();

    assert_eq!(table.currency, "usd");
    assert_eq!(table.len(), 3);
    let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Bitcoin", "Ethereum", "Tether"]);
    let ranks: Vec<_> = table.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, [1, 2, 3]);
    assert_eq!(table.records[1].symbol, "ETH");
    assert_eq!(table.records[2].price_change_24h, 0.0);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["vs_currency"], "usd");
    assert_eq!(seen[0]["order"], "market_cap_desc");
    assert_eq!(seen[0]["per_page"], "50");
    assert_eq!(seen[0]["page"], "1");
    assert_eq!(seen[0]["sparkline"], "false");
}

#[tokio::test]
async fn test_fetch_truncates_to_requested_count() {
    let client = client_for(spawn_mock(mock(StatusCode::OK, MARKETS_BODY)).await);

    let table = client
        .fetch_markets(&MarketQuery::new(2, "usd").unwrap())
        .await
        .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.records[1].name, "Ethereum");
}

#[tokio::test]
async fn test_empty_array_is_valid() {
    let client = client_for(spawn_mock(mock(StatusCode::OK, "[]")).await);

    let table = client.fetch_markets(&MarketQuery::default()).await.unwrap();

    assert!(table.is_empty());
}

#[tokio::test]
async fn test_rate_limited_is_http_error() {
    let mock = mock(StatusCode::TOO_MANY_REQUESTS, r#"{"status":{"error_code":429}}"#);
    let seen = mock.seen.clone();
    let client = client_for(spawn_mock(mock).await);

    let err = client.fetch_markets(&MarketQuery::default()).await.unwrap_err();

    assert!(matches!(err, FetchError::Http { status: 429 }));
    // Single attempt, no retry
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let client = client_for(spawn_mock(mock(StatusCode::OK, r#"{"error":"oops"}"#)).await);

    let err = client.fetch_markets(&MarketQuery::default()).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}/api/v3", addr));
    let err = client.fetch_markets(&MarketQuery::default()).await.unwrap_err();

    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn test_client_as_market_source() {
    let client = client_for(spawn_mock(mock(StatusCode::OK, MARKETS_BODY)).await);
    let source: &dyn MarketSource = &client;

    assert_eq!(source.name(), "coingecko");
    let table = source.fetch_markets(&MarketQuery::default()).await.unwrap();
    assert_eq!(table.len(), 3);
}
