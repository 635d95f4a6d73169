use chrono::{Datelike, Local};
use dividend_screener::config::SyncConfig;
use dividend_screener::services::dividends::dividend_metrics;
use dividend_screener::services::screener::{derive_dividend_yield, normalize_payout_ratio, normalize_ticker};
use dividend_screener::services::yahoo::{SecurityDataProvider, YahooClient};
use dotenv::dotenv;
use log::{error, info};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let ticker = normalize_ticker(&env::args().nth(1).unwrap_or_else(|| "VZ".to_string()));
    info!("Testing Yahoo Finance lookups for {}...", ticker);

    let config = SyncConfig::default();
    let client = YahooClient::new(config.yahoo.clone())?;

    let quote = match client.quote_summary(&ticker).await {
        Ok(quote) => quote,
        Err(e) => {
            error!("ERROR: Failed to fetch quote summary: {:#}", e);
            return Err(e.into());
        }
    };
    info!("SUCCESS: quote summary {:?}", quote);
    info!(
        "Derived yield: {:?} | payout ratio: {}",
        derive_dividend_yield(&quote),
        normalize_payout_ratio(quote.payout_ratio)
    );

    let payments = client.dividend_history(&ticker, config.history_years).await?;
    info!("Fetched {} dividend payments", payments.len());

    let metrics = dividend_metrics(&payments, Local::now().year());
    info!(
        "{} consecutive years | {:.2}% 5Y growth",
        metrics.consecutive_years,
        metrics.growth_5y * 100.0
    );

    Ok(())
}
