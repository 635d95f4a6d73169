// src/services/screener.rs
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use log::{info, warn};

use crate::config::SyncConfig;
use crate::models::{DividendMetrics, QuoteSummary, SecurityRecord};
use crate::services::dividends::fetch_dividend_metrics;
use crate::services::yahoo::SecurityDataProvider;

const DEFAULT_SECTOR: &str = "Unknown";
const DEFAULT_DESCRIPTION: &str = "No description available.";

/// Yahoo uses `-` where the exchange listing uses `.` (BRK.B -> BRK-B).
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().replace('.', "-")
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

pub fn quote_price(quote: &QuoteSummary) -> Option<f64> {
    quote.current_price.or(quote.previous_close)
}

/// Dividend yield as a fraction: rate over price when both are known,
/// then the trailing annual yield, then the raw yield field (which some
/// responses give as a percentage).
pub fn derive_dividend_yield(quote: &QuoteSummary) -> Option<f64> {
    if let (Some(rate), Some(price)) = (non_zero(quote.dividend_rate), non_zero(quote_price(quote))) {
        return Some(rate / price);
    }
    if let Some(trailing) = quote.trailing_annual_dividend_yield {
        return Some(trailing);
    }
    quote.dividend_yield.map(|y| if y > 1.0 { y / 100.0 } else { y })
}

/// Payout ratios above 2.0 are percentages (58.0, 689.0); anything else is
/// already a fraction.
pub fn normalize_payout_ratio(payout: Option<f64>) -> f64 {
    match payout {
        Some(p) if p > 2.0 => p / 100.0,
        Some(p) => p,
        None => 0.0,
    }
}

pub fn build_record(
    ticker: &str,
    quote: &QuoteSummary,
    dividend_yield: f64,
    metrics: DividendMetrics,
    today: NaiveDate,
) -> SecurityRecord {
    SecurityRecord {
        ticker: ticker.to_string(),
        name: quote.short_name.clone()
            .or_else(|| quote.long_name.clone())
            .unwrap_or_else(|| ticker.to_string()),
        price: quote_price(quote).unwrap_or(0.0),
        dividend_yield,
        payout_ratio: normalize_payout_ratio(quote.payout_ratio),
        consecutive_years: metrics.consecutive_years,
        pe_ratio: quote.forward_pe.or(quote.trailing_pe).unwrap_or(0.0),
        roe: quote.return_on_equity.unwrap_or(0.0),
        debt_to_equity: non_zero(quote.debt_to_equity).map(|d| d / 100.0).unwrap_or(0.0),
        low_52: quote.fifty_two_week_low.unwrap_or(0.0),
        high_52: quote.fifty_two_week_high.unwrap_or(0.0),
        sector: quote.sector.clone().unwrap_or_else(|| DEFAULT_SECTOR.to_string()),
        dividend_growth_5y: metrics.growth_5y,
        description: quote.long_business_summary.clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        last_updated: today.format("%Y-%m-%d").to_string(),
    }
}

/// Looks up one ticker. `Ok(None)` means it was fetched but yields too little.
pub async fn screen_security<P: SecurityDataProvider>(
    provider: &P,
    raw_ticker: &str,
    config: &SyncConfig,
    today: NaiveDate,
) -> Result<Option<SecurityRecord>> {
    let ticker = normalize_ticker(raw_ticker);
    let quote = provider.quote_summary(&ticker).await?;

    let dividend_yield = match derive_dividend_yield(&quote) {
        Some(y) if y >= config.yield_threshold => y,
        _ => return Ok(None),
    };

    let metrics = fetch_dividend_metrics(provider, &ticker, config.history_years, today.year()).await;
    info!(
        "Found: {} ({:.2}%) | {} Years | {:.2}% Growth",
        ticker,
        dividend_yield * 100.0,
        metrics.consecutive_years,
        metrics.growth_5y * 100.0
    );

    Ok(Some(build_record(&ticker, &quote, dividend_yield, metrics, today)))
}

#[derive(Debug, Default)]
pub struct ScreenResult {
    pub records: Vec<SecurityRecord>,
    pub below_threshold: usize,
    pub skipped: usize,
}

/// Screens every ticker in order. Lookup failures are logged and skipped.
pub async fn screen_universe<P: SecurityDataProvider>(
    provider: &P,
    tickers: &[String],
    config: &SyncConfig,
    today: NaiveDate,
) -> ScreenResult {
    info!(
        "Analyzing {} stocks for >{:.0}% yield...",
        tickers.len(),
        config.yield_threshold * 100.0
    );

    let mut result = ScreenResult::default();
    for (i, ticker) in tickers.iter().enumerate() {
        info!("[{}/{}] Checking {}...", i, tickers.len(), ticker);

        match screen_security(provider, ticker, config, today).await {
            Ok(Some(record)) => result.records.push(record),
            Ok(None) => result.below_threshold += 1,
            Err(e) => {
                warn!("Skipping {}: {:#}", ticker, e);
                result.skipped += 1;
            }
        }
    }
    result
}
