/*
[INPUT]:  Currency pair identifiers and query parameters
[OUTPUT]: Market data (tickers, order book, transactions, conversion rate)
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use crate::http::client::ApiRequest;
use crate::http::{BitstampClient, BitstampError, Result};
use crate::types::{ConversionRate, OrderBook, OrderBookGroup, Ticker, Transaction, TransactionInterval};

/// Currency pairs are short lowercase-or-uppercase ASCII symbols such as `btcusd`
pub(crate) fn validate_pair(pair: &str) -> Result<()> {
    if pair.is_empty() || !pair.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(BitstampError::validation(format!(
            "currency pair must be non-empty and alphanumeric, got {pair:?}"
        )));
    }
    Ok(())
}

impl BitstampClient {
    /// Latest ticker for a currency pair
    ///
    /// GET /api/v2/ticker/{pair}/
    pub async fn ticker(&self, pair: &str) -> Result<Ticker> {
        validate_pair(pair)?;
        self.dispatch(ApiRequest::get(format!("/api/v2/ticker/{pair}/")))
            .await
    }

    /// Hourly ticker for a currency pair
    ///
    /// GET /api/v2/ticker_hour/{pair}/
    pub async fn hourly_ticker(&self, pair: &str) -> Result<Ticker> {
        validate_pair(pair)?;
        self.dispatch(ApiRequest::get(format!("/api/v2/ticker_hour/{pair}/")))
            .await
    }

    /// Order book snapshot with a raw grouping mode.
    ///
    /// `group` must be 0, 1 or 2; anything else fails before a request is made.
    ///
    /// GET /api/v2/order_book/{pair}/?group={group}
    pub async fn order_book(&self, pair: &str, group: u8) -> Result<OrderBook> {
        let group = OrderBookGroup::try_from(group)?;
        self.order_book_grouped(pair, group).await
    }

    /// Order book snapshot with a typed grouping mode
    pub async fn order_book_grouped(&self, pair: &str, group: OrderBookGroup) -> Result<OrderBook> {
        validate_pair(pair)?;
        let request = ApiRequest::get(format!("/api/v2/order_book/{pair}/"))
            .query("group", group.as_u8().to_string());
        self.dispatch(request).await
    }

    /// Trades for the given time window, newest first
    ///
    /// GET /api/v2/transactions/{pair}/?time={minute|hour|day}
    pub async fn transactions(
        &self,
        pair: &str,
        interval: TransactionInterval,
    ) -> Result<Vec<Transaction>> {
        validate_pair(pair)?;
        let request = ApiRequest::get(format!("/api/v2/transactions/{pair}/"))
            .query("time", interval.as_str());
        self.dispatch(request).await
    }

    /// EUR/USD conversion rate
    ///
    /// GET /api/v2/eur_usd/
    pub async fn conversion_rate(&self) -> Result<ConversionRate> {
        self.dispatch(ApiRequest::get("/api/v2/eur_usd/")).await
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Credentials;
    use crate::http::{BitstampClient, BitstampError, ClientConfig};
    use crate::types::{PriceLevel, TransactionInterval, TransactionSide};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BitstampClient {
        BitstampClient::with_config(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client init")
    }

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("decimal")
    }

    #[tokio::test]
    async fn test_ticker() {
        let server = MockServer::start().await;
        let mock_response = r#"{"high":"9000.0","last":"8950.5","timestamp":"1234567890","bid":"8949","vwap":"8975","volume":"120.5","low":"8800","ask":"8951","open":"8900"}"#;

        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/ticker/btcusd/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(mock_response, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let ticker = client_for(&server)
            .ticker("btcusd")
            .await
            .expect("ticker failed");

        assert_eq!(ticker.high, Some(dec("9000.0")));
        assert_eq!(ticker.last, Some(dec("8950.5")));
        assert_eq!(ticker.timestamp, Some(1_234_567_890));
        assert_eq!(ticker.volume, Some(dec("120.5")));
        assert_eq!(ticker.open, Some(dec("8900")));
    }

    #[tokio::test]
    async fn test_hourly_ticker() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/ticker_hour/ethusd/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "last": "2000.10",
                "vwap": "1999.5"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ticker = client_for(&server)
            .hourly_ticker("ethusd")
            .await
            .expect("hourly_ticker failed");

        assert_eq!(ticker.last, Some(dec("2000.10")));
        assert_eq!(ticker.vwap, Some(dec("1999.5")));
        assert_eq!(ticker.high, None);
    }

    #[tokio::test]
    async fn test_ticker_not_found() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/ticker/unknownpair/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .ticker("unknownpair")
            .await
            .expect_err("should be not found");

        match err {
            BitstampError::NotFound { endpoint } => {
                assert_eq!(endpoint, "/api/v2/ticker/unknownpair/");
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_order_book_preserves_level_order() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/order_book/btcusd/"))
            .and(query_param("group", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timestamp": "1700000000",
                "microtimestamp": "1700000000000001",
                "bids": [["100.00", "1.5"], ["99.50", "2.0"]],
                "asks": [["100.50", "0.7"], ["101.00", "1.1"]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let book = client_for(&server)
            .order_book("btcusd", 1)
            .await
            .expect("order_book failed");

        assert_eq!(
            book.bids,
            vec![
                PriceLevel::new(dec("100.00"), dec("1.5")),
                PriceLevel::new(dec("99.50"), dec("2.0")),
            ]
        );
        assert_eq!(
            book.asks,
            vec![
                PriceLevel::new(dec("100.50"), dec("0.7")),
                PriceLevel::new(dec("101.00"), dec("1.1")),
            ]
        );
        assert_eq!(book.timestamp, Some(1_700_000_000));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[tokio::test]
    async fn test_order_book_accepts_each_group(#[case] group: u8) {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/order_book/btcusd/"))
            .and(query_param("group", group.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bids": [], "asks": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let book = client_for(&server)
            .order_book("btcusd", group)
            .await
            .expect("order_book failed");
        assert!(book.bids.is_empty());
    }

    #[tokio::test]
    async fn test_order_book_invalid_group_sends_nothing() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .order_book("btcusd", 3)
            .await
            .expect_err("group 3 should be rejected");

        assert!(matches!(err, BitstampError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invalid_pair_sends_nothing() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(client.ticker("").await, Err(BitstampError::Validation(_))));
        assert!(matches!(
            client.ticker("btc/usd").await,
            Err(BitstampError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_transactions() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/transactions/btcusd/"))
            .and(query_param("time", "minute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "1700000060", "tid": "11", "amount": "0.10", "type": "0", "price": "100.5"},
                {"date": "1700000001", "tid": "10", "amount": "0.20", "type": "1", "price": "100.4"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let trades = client_for(&server)
            .transactions("btcusd", TransactionInterval::Minute)
            .await
            .expect("transactions failed");

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].tid, Some(11));
        assert_eq!(trades[0].side, Some(TransactionSide::Buy));
        assert_eq!(trades[1].date, Some(1_700_000_001));
        assert_eq!(trades[1].side, Some(TransactionSide::Sell));
    }

    #[tokio::test]
    async fn test_conversion_rate() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/eur_usd/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "buy": "1.0870", "sell": "1.0790"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rate = client_for(&server)
            .conversion_rate()
            .await
            .expect("conversion_rate failed");

        assert_eq!(rate.buy, Some(dec("1.0870")));
        assert_eq!(rate.sell, Some(dec("1.0790")));
    }

    #[tokio::test]
    async fn test_public_calls_never_send_auth_headers() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/v2/eur_usd/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials::new("123", "key", "secret").expect("credentials");
        let client = client_for(&server).with_credentials(credentials);
        client.conversion_rate().await.expect("conversion_rate failed");

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("x-auth"));
        assert!(!requests[0].headers.contains_key("x-auth-signature"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Nothing listens on port 9 on the loopback interface.
        let client = BitstampClient::with_config(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ClientConfig::default()
        })
        .expect("client init");

        let err = client.ticker("btcusd").await.expect_err("should fail");
        match err {
            BitstampError::Transport { method, endpoint, .. } => {
                assert_eq!(method.as_str(), "GET");
                assert_eq!(endpoint, "/api/v2/ticker/btcusd/");
            }
            other => panic!("Expected Transport, got {other:?}"),
        }
    }
}
