/*
[INPUT]:  Currency pair identifiers (e.g., "btcusd")
[OUTPUT]: Market data (order book, ticker, conversion rate)
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use bitstamp_adapter::*;

/// Example: Query market data (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== Bitstamp Market Data Example ===\n");

    let client = match BitstampClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created (no auth required for public endpoints)\n");

    println!("Querying ungrouped order book for daiusd...");
    match client.order_book("daiusd", 0).await {
        Ok(book) => println!(
            "✓ Order book: {} bids, {} asks, best bid {:?}, best ask {:?}",
            book.bids.len(),
            book.asks.len(),
            book.best_bid().map(|level| level.price),
            book.best_ask().map(|level| level.price),
        ),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying ticker for btcusd...");
    match client.ticker("btcusd").await {
        Ok(ticker) => println!("✓ Ticker: {:?}", ticker),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying hourly ticker for btcusd...");
    match client.hourly_ticker("btcusd").await {
        Ok(ticker) => println!("✓ Hourly ticker: {:?}", ticker),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying EUR/USD conversion rate...");
    match client.conversion_rate().await {
        Ok(rate) => println!("✓ Conversion rate: {:?}", rate),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
