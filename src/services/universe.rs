// src/services/universe.rs
use anyhow::{anyhow, bail, Result};
use log::{error, info, warn};
use regex::Regex;
use reqwest::{header::USER_AGENT, Client};
use scraper::{ElementRef, Html, Selector};

use crate::config::UniverseConfig;

/// Tickers listed on the constituents page, or the fallback list if the page
/// can't be fetched or parsed. Never fails.
pub async fn fetch_universe(client: &Client, config: &UniverseConfig) -> Vec<String> {
    info!("Fetching S&P 500 list from {}", config.url);

    match fetch_constituents(client, config).await {
        Ok(tickers) => {
            info!("Successfully fetched {} tickers.", tickers.len());
            tickers
        }
        Err(e) => {
            error!("Error fetching symbols: {}. Using {} fallback tickers.", e, config.fallback.len());
            config.fallback.clone()
        }
    }
}

async fn fetch_constituents(client: &Client, config: &UniverseConfig) -> Result<Vec<String>> {
    let html = client
        .get(&config.url)
        .header(USER_AGENT, config.user_agent.as_str())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    info!("Universe page received ({} bytes). Parsing HTML...", html.len());

    parse_constituents_table(&html)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {}: {:?}", css, e))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Reads the `Symbol` column of the first table that has one.
pub fn parse_constituents_table(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let header_sel = selector("th")?;
    let cell_sel = selector("td")?;
    let symbol_re = Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$")?;

    for table in document.select(&table_sel) {
        let mut rows = table.select(&row_sel);

        let symbol_idx = rows.by_ref().find_map(|row| {
            row.select(&header_sel).position(|th| cell_text(th) == "Symbol")
        });
        let symbol_idx = match symbol_idx {
            Some(idx) => idx,
            None => continue,
        };

        let (tickers, rejected): (Vec<String>, Vec<String>) = rows
            .filter_map(|row| row.select(&cell_sel).nth(symbol_idx))
            .map(cell_text)
            .filter(|symbol| !symbol.is_empty())
            .partition(|symbol| symbol_re.is_match(symbol));

        if !rejected.is_empty() {
            warn!("Ignoring {} malformed symbol cells: {:?}", rejected.len(), rejected);
        }

        if tickers.is_empty() {
            bail!("Symbol column is empty");
        }
        return Ok(tickers);
    }

    bail!("No table with a Symbol column found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_symbol_column() {
        let html = r##"
            <html><body>
            <table class="wikitable sortable" id="constituents">
              <tbody>
                <tr><th>Symbol</th><th>Security</th><th>GICS Sector</th></tr>
                <tr><td><a href="#">MMM</a></td><td>3M</td><td>Industrials</td></tr>
                <tr><td><a href="#">BRK.B</a></td><td>Berkshire Hathaway</td><td>Financials</td></tr>
                <tr><td>
                  VZ
                </td><td>Verizon</td><td>Communication Services</td></tr>
              </tbody>
            </table>
            </body></html>"##;

        let tickers = parse_constituents_table(html).unwrap();
        assert_eq!(tickers, vec!["MMM", "BRK.B", "VZ"]);
    }

    #[test]
    fn skips_tables_without_symbol_header() {
        let html = r#"
            <table><tr><th>Date</th><th>Added</th></tr><tr><td>2024-01-02</td><td>XYZ</td></tr></table>
            <table>
              <tr><th>Security</th><th>Symbol</th></tr>
              <tr><td>Pfizer</td><td>PFE</td></tr>
              <tr><td>Altria</td><td>MO</td></tr>
            </table>"#;

        let tickers = parse_constituents_table(html).unwrap();
        assert_eq!(tickers, vec!["PFE", "MO"]);
    }

    #[test]
    fn page_without_table_is_an_error() {
        assert!(parse_constituents_table("<html><body><p>Rate limited</p></body></html>").is_err());
    }

    #[test]
    fn blank_symbol_cells_are_ignored() {
        let html = r#"<table><tr><th>Symbol</th></tr><tr><td> </td></tr><tr><td>T</td></tr></table>"#;
        assert_eq!(parse_constituents_table(html).unwrap(), vec!["T"]);
    }

    #[test]
    fn malformed_symbol_cells_are_dropped_and_the_rest_kept() {
        let html = r#"<table>
            <tr><th>Symbol</th></tr>
            <tr><td>brk.b</td></tr>
            <tr><td>ABCDEFGHIJKL</td></tr>
            <tr><td>KO</td></tr>
        </table>"#;
        assert_eq!(parse_constituents_table(html).unwrap(), vec!["KO"]);
    }
}
