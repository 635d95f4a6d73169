// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;

/// A single dividend payment as reported by the data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Total dividends paid in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualDividend {
    pub year: i32,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividendMetrics {
    pub consecutive_years: u32,
    pub growth_5y: f64,
}

impl DividendMetrics {
    pub const DEFAULT_GROWTH: f64 = 0.05;

    /// Returned whenever the history is too short or could not be read.
    pub fn sentinel() -> Self {
        DividendMetrics {
            consecutive_years: 0,
            growth_5y: Self::DEFAULT_GROWTH,
        }
    }
}

/// Quote and fundamental fields for one security. Every field is optional
/// because the provider omits whatever it does not have.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSummary {
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub trailing_annual_dividend_yield: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub forward_pe: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub sector: Option<String>,
    pub long_business_summary: Option<String>,
}

/// One entry of the published snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRecord {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub dividend_yield: f64,
    pub payout_ratio: f64,
    pub consecutive_years: u32,
    pub pe_ratio: f64,
    pub roe: f64,
    pub debt_to_equity: f64,
    #[serde(rename = "low52")]
    pub low_52: f64,
    #[serde(rename = "high52")]
    pub high_52: f64,
    pub sector: String,
    #[serde(rename = "dividendGrowth5Y")]
    pub dividend_growth_5y: f64,
    pub description: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockScores {
    pub overall: u32,
    pub dividend: u32,
    pub fundamentals: u32,
}
