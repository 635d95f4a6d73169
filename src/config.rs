// src/config.rs
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const SP500_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

pub const FALLBACK_TICKERS: [&str; 10] = [
    "VZ", "T", "PFE", "MO", "KMB", "CVX", "XOM", "IBM", "MMM", "BEN",
];

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_OUTPUT_PATH: &str = "public/data.json";

/// Where the universe comes from and what to use when it can't be fetched.
#[derive(Debug, Clone)]
pub struct UniverseConfig {
    pub url: String,
    pub fallback: Vec<String>,
    pub user_agent: String,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        UniverseConfig {
            url: SP500_URL.to_string(),
            fallback: FALLBACK_TICKERS.iter().map(|t| t.to_string()).collect(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Hit once to obtain the session cookie.
    pub cookie_url: String,
    /// Base for the `v1/test/getcrumb`, `v10/finance/quoteSummary` and `v8/finance/chart` endpoints.
    pub query_base: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        YahooConfig {
            cookie_url: "https://fc.yahoo.com".to_string(),
            query_base: "https://query1.finance.yahoo.com".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub universe: UniverseConfig,
    pub yahoo: YahooConfig,
    /// Minimum derived dividend yield, as a fraction.
    pub yield_threshold: f64,
    pub history_years: u32,
    pub output_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            universe: UniverseConfig::default(),
            yahoo: YahooConfig::default(),
            yield_threshold: 0.04,
            history_years: 10,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl SyncConfig {
    /// Defaults, with the output path optionally taken from `OUTPUT_PATH`
    /// (a `.env` file is honoured).
    pub fn from_env() -> Self {
        dotenv().ok();

        let output_path = env::var("OUTPUT_PATH").unwrap_or_else(|_| {
            warn!("$OUTPUT_PATH not set, defaulting to {}", DEFAULT_OUTPUT_PATH);
            DEFAULT_OUTPUT_PATH.to_string()
        });
        info!("Using output path: {}", output_path);

        SyncConfig {
            output_path: PathBuf::from(output_path),
            ..SyncConfig::default()
        }
    }
}
