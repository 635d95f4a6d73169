// src/services/yahoo.rs
use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::OnceCell;

use crate::config::YahooConfig;
use crate::error::ProviderError;
use crate::models::{DividendPayment, QuoteSummary};

const QUOTE_MODULES: &str = "price,summaryDetail,financialData,defaultKeyStatistics,assetProfile";

/// Source of per-security quotes and dividend history.
#[allow(async_fn_in_trait)]
pub trait SecurityDataProvider {
    async fn quote_summary(&self, ticker: &str) -> Result<QuoteSummary>;

    /// Payments over the last `years` years, oldest first.
    async fn dividend_history(&self, ticker: &str, years: u32) -> Result<Vec<DividendPayment>>;
}

pub struct YahooClient {
    client: Client,
    config: YahooConfig,
    crumb: OnceCell<String>,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(YahooClient {
            client,
            config,
            crumb: OnceCell::new(),
        })
    }

    async fn crumb(&self) -> Result<&str> {
        let crumb = self.crumb.get_or_try_init(|| self.fetch_crumb()).await?;
        Ok(crumb.as_str())
    }

    async fn fetch_crumb(&self) -> Result<String> {
        // Only the Set-Cookie matters here; this endpoint usually answers 404.
        match self.client.get(&self.config.cookie_url).send().await {
            Ok(resp) => debug!("Cookie endpoint answered {}", resp.status()),
            Err(e) => debug!("Cookie endpoint failed: {}", e),
        }

        let url = format!("{}/v1/test/getcrumb", self.config.query_base);
        let crumb = self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?
            .trim()
            .to_string();

        if crumb.is_empty() || crumb.contains('<') {
            return Err(ProviderError::new("Yahoo returned no usable crumb").into());
        }
        info!("Obtained Yahoo session crumb");
        Ok(crumb)
    }
}

impl SecurityDataProvider for YahooClient {
    async fn quote_summary(&self, ticker: &str) -> Result<QuoteSummary> {
        let crumb = self.crumb().await?;
        let url = format!("{}/v10/finance/quoteSummary/{}", self.config.query_base, ticker);

        let resp = self.client
            .get(&url)
            .query(&[("modules", QUOTE_MODULES), ("crumb", crumb)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        parse_quote_summary(&body)
            .with_context(|| format!("quote summary for {} (HTTP {})", ticker, status))
    }

    async fn dividend_history(&self, ticker: &str, years: u32) -> Result<Vec<DividendPayment>> {
        let url = format!("{}/v8/finance/chart/{}", self.config.query_base, ticker);
        let range = format!("{}y", years);

        let resp = self.client
            .get(&url)
            .query(&[("range", range.as_str()), ("interval", "1d"), ("events", "div")])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        parse_dividend_chart(&body)
            .with_context(|| format!("dividend history for {} (HTTP {})", ticker, status))
    }
}

/// `{"raw": ..., "fmt": ...}`. `raw` is usually a number but can be a
/// string such as `"Infinity"`; those read as missing.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<Value>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref()
        .and_then(|v| v.raw.as_ref())
        .and_then(Value::as_f64)
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    code: Option<String>,
    description: Option<String>,
}

impl YahooApiError {
    fn into_error(self) -> anyhow::Error {
        ProviderError::new(format!(
            "{}: {}",
            self.code.unwrap_or_else(|| "Error".to_string()),
            self.description.unwrap_or_default()
        ))
        .into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteModules>>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteModules {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    financial_data: Option<FinancialDataModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<RawValue>,
    regular_market_previous_close: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetailModule {
    previous_close: Option<RawValue>,
    dividend_rate: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    payout_ratio: Option<RawValue>,
    trailing_annual_dividend_yield: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialDataModule {
    current_price: Option<RawValue>,
    return_on_equity: Option<RawValue>,
    debt_to_equity: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyStatisticsModule {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AssetProfileModule {
    sector: Option<String>,
    long_business_summary: Option<String>,
}

impl From<QuoteModules> for QuoteSummary {
    fn from(modules: QuoteModules) -> Self {
        let price = modules.price.unwrap_or_default();
        let detail = modules.summary_detail.unwrap_or_default();
        let financial = modules.financial_data.unwrap_or_default();
        let stats = modules.default_key_statistics.unwrap_or_default();
        let profile = modules.asset_profile.unwrap_or_default();

        QuoteSummary {
            current_price: raw(&financial.current_price).or(raw(&price.regular_market_price)),
            previous_close: raw(&detail.previous_close).or(raw(&price.regular_market_previous_close)),
            dividend_rate: raw(&detail.dividend_rate),
            trailing_annual_dividend_yield: raw(&detail.trailing_annual_dividend_yield),
            dividend_yield: raw(&detail.dividend_yield),
            payout_ratio: raw(&detail.payout_ratio),
            short_name: price.short_name,
            long_name: price.long_name,
            forward_pe: raw(&detail.forward_pe).or(raw(&stats.forward_pe)),
            trailing_pe: raw(&detail.trailing_pe),
            return_on_equity: raw(&financial.return_on_equity),
            debt_to_equity: raw(&financial.debt_to_equity),
            fifty_two_week_low: raw(&detail.fifty_two_week_low),
            fifty_two_week_high: raw(&detail.fifty_two_week_high),
            sector: profile.sector,
            long_business_summary: profile.long_business_summary,
        }
    }
}

pub fn parse_quote_summary(body: &str) -> Result<QuoteSummary> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.quote_summary.error {
        return Err(err.into_error());
    }

    envelope.quote_summary.result
        .and_then(|results| results.into_iter().next())
        .map(QuoteSummary::from)
        .ok_or_else(|| ProviderError::new("Empty quote summary result").into())
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

/// Dividend events from a chart response, sorted by date. A chart with no
/// dividend events yields an empty history.
pub fn parse_dividend_chart(body: &str) -> Result<Vec<DividendPayment>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.chart.error {
        return Err(err.into_error());
    }

    let result = envelope.chart.result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::new("Empty chart result"))?;

    let mut payments = result.events
        .map(|events| events.dividends.into_values().collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|event| -> Result<DividendPayment> {
            let date = DateTime::from_timestamp(event.date, 0)
                .ok_or_else(|| anyhow!("Invalid dividend timestamp {}", event.date))?
                .date_naive();
            Ok(DividendPayment { date, amount: event.amount })
        })
        .collect::<Result<Vec<_>>>()?;

    payments.sort_by_key(|p| p.date);
    Ok(payments)
}
