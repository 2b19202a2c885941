/*
[INPUT]:  Live trade channel names
[OUTPUT]: Raw trade frames printed to stdout
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use bitstamp_adapter::*;
use tokio::time::{Duration, sleep};

/// Example: stream XRP trades for 30 seconds, then stop
#[tokio::main]
async fn main() {
    println!("=== Bitstamp WebSocket Example ===\n");

    let channels = vec![
        "live_trades_xrpusd".to_string(),
        "live_trades_xrpeur".to_string(),
    ];
    let mut ws = BitstampWebSocket::new(channels, |message: &str| println!("{message}"));
    let handle = ws.handle();

    tokio::spawn(async move {
        sleep(Duration::from_secs(30)).await;
        println!("\nStopping stream...");
        handle.stop();
    });

    let state = ws.run().await;
    println!("\n✓ WebSocket example finished in state {:?}", state);
}
