/*
[INPUT]:  Parsed subcommand, configured REST client or WebSocket settings
[OUTPUT]: JSON results for REST calls; raw frames for streams
[POS]:    Command layer - maps CLI subcommands onto adapter calls
[UPDATE]: When adding subcommands or changing their output
*/

use anyhow::{Context, Result, bail};
use bitstamp_adapter::{
    BitstampClient, BitstampWebSocket, ConnectionState, OrderBookGroup, ReconnectPolicy,
    TransactionInterval, WsConfig,
};
use clap::Subcommand;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Latest ticker for a currency pair
    Ticker { pair: String },
    /// Hourly ticker for a currency pair
    HourlyTicker { pair: String },
    /// Order book snapshot
    OrderBook {
        pair: String,
        /// 0 = ungrouped, 1 = grouped by price, 2 = individual orders
        #[arg(long, default_value_t = 1)]
        group: u8,
    },
    /// Recent trades
    Transactions {
        pair: String,
        /// minute, hour or day
        #[arg(long, default_value = "hour")]
        time: TransactionInterval,
    },
    /// EUR/USD conversion rate
    ConversionRate,
    /// Account balances (signed)
    Balance {
        #[arg(long)]
        pair: Option<String>,
    },
    /// Status of one order (signed)
    OrderStatus { id: String },
    /// Print live frames for the given channels until interrupted
    Stream {
        #[arg(required = true)]
        channels: Vec<String>,
        /// Reconnect with exponential backoff when the connection drops
        #[arg(long)]
        reconnect: bool,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ticker { .. } => "ticker",
            Command::HourlyTicker { .. } => "hourly-ticker",
            Command::OrderBook { .. } => "order-book",
            Command::Transactions { .. } => "transactions",
            Command::ConversionRate => "conversion-rate",
            Command::Balance { .. } => "balance",
            Command::OrderStatus { .. } => "order-status",
            Command::Stream { .. } => "stream",
        }
    }

    pub fn requires_credentials(&self) -> bool {
        matches!(self, Command::Balance { .. } | Command::OrderStatus { .. })
    }

    /// Argument checks that need no network access
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::OrderBook { group, .. } => {
                OrderBookGroup::try_from(*group)?;
            }
            Command::OrderStatus { id } if id.trim().is_empty() => {
                bail!("order id must not be empty");
            }
            Command::Stream { channels, .. } if channels.iter().any(|c| c.trim().is_empty()) => {
                bail!("channel names must not be empty");
            }
            _ => {}
        }
        Ok(())
    }

    /// Run a REST subcommand and return its result as JSON
    pub async fn execute(&self, client: &BitstampClient) -> Result<Value> {
        let value = match self {
            Command::Ticker { pair } => serde_json::to_value(client.ticker(pair).await?)?,
            Command::HourlyTicker { pair } => {
                serde_json::to_value(client.hourly_ticker(pair).await?)?
            }
            Command::OrderBook { pair, group } => {
                serde_json::to_value(client.order_book(pair, *group).await?)?
            }
            Command::Transactions { pair, time } => {
                serde_json::to_value(client.transactions(pair, *time).await?)?
            }
            Command::ConversionRate => serde_json::to_value(client.conversion_rate().await?)?,
            Command::Balance { pair: None } => {
                serde_json::to_value(client.account_balance().await?)?
            }
            Command::Balance { pair: Some(pair) } => {
                serde_json::to_value(client.pair_balance(pair).await?)?
            }
            Command::OrderStatus { id } => serde_json::to_value(client.order_status(id).await?)?,
            Command::Stream { .. } => bail!("stream is not a REST command"),
        };
        Ok(value)
    }
}

/// Print every inbound frame until `shutdown` fires or the connection ends
pub async fn stream(
    config: WsConfig,
    channels: Vec<String>,
    reconnect: bool,
    shutdown: CancellationToken,
) -> Result<ConnectionState> {
    let mut ws = BitstampWebSocket::with_config(config, channels, |message: &str| {
        println!("{message}");
    });
    let handle = ws.handle();

    let stopper = tokio::spawn(async move {
        shutdown.cancelled().await;
        handle.stop();
    });

    let state = if reconnect {
        ws.run_with_reconnect(&ReconnectPolicy::default()).await
    } else {
        ws.run().await
    };
    stopper.abort();
    info!(?state, "stream finished");

    if state == ConnectionState::Error {
        bail!("stream ended with an error");
    }
    Ok(state)
}

pub fn render(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("render result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstamp_adapter::ClientConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn validate_rejects_bad_group_and_empty_id() {
        let command = Command::OrderBook {
            pair: "btcusd".to_string(),
            group: 3,
        };
        assert!(command.validate().is_err());

        let command = Command::OrderStatus {
            id: " ".to_string(),
        };
        assert!(command.validate().is_err());
        assert!(command.requires_credentials());

        let command = Command::Transactions {
            pair: "btcusd".to_string(),
            time: TransactionInterval::Day,
        };
        assert!(command.validate().is_ok());
        assert!(!command.requires_credentials());
    }

    #[tokio::test]
    async fn execute_order_book_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/order_book/btcusd/"))
            .and(query_param("group", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timestamp": "1600000000",
                "microtimestamp": "1600000000000000",
                "bids": [["100.0", "1.0", "11"]],
                "asks": [["101.0", "2.0", "12"]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BitstampClient::with_config(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client");

        let command = Command::OrderBook {
            pair: "btcusd".to_string(),
            group: 2,
        };
        let value = command.execute(&client).await.expect("execute");
        assert_eq!(value["bids"][0]["price"], "100.0");
        assert_eq!(value["asks"][0]["order_id"], "12");
        assert!(render(&value).expect("render").contains("\"bids\""));
    }

    #[tokio::test]
    async fn execute_rejects_stream() {
        let client = BitstampClient::new().expect("client");
        let command = Command::Stream {
            channels: vec!["live_trades_btcusd".to_string()],
            reconnect: false,
        };
        assert!(command.execute(&client).await.is_err());
    }
}
