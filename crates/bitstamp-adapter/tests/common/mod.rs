/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for bitstamp-adapter tests

#![allow(dead_code)]

use bitstamp_adapter::{BitstampClient, ClientConfig, Credentials};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> BitstampClient {
    BitstampClient::with_config(ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Deterministic credentials for signed calls
pub fn test_credentials() -> Credentials {
    Credentials::new("123456", "test-key", "test-secret").expect("credentials")
}

/// Ticker payload as returned by `/api/v2/ticker/btcusd/`
pub fn ticker_body() -> serde_json::Value {
    serde_json::json!({
        "high": "9000.00",
        "last": "8500.00",
        "timestamp": "1600000000",
        "bid": "8499.00",
        "vwap": "8600.00",
        "volume": "1234.5",
        "low": "8000.00",
        "ask": "8501.00",
        "open": "8400.00",
        "open_24": "8300.00",
        "percent_change_24": "2.41",
        "pair": "BTC/USD"
    })
}
