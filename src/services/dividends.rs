// src/services/dividends.rs
use chrono::Datelike;
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::models::{AnnualDividend, DividendMetrics, DividendPayment};
use crate::services::yahoo::SecurityDataProvider;

/// A year counts as flat-or-growing if it stays within 2% of the year before.
const GROWTH_TOLERANCE: f64 = 0.98;
const CAGR_YEARS: usize = 5;

/// Buckets payments into calendar-year totals.
///
/// Non-positive amounts are dropped. Years between the first and last payment
/// that saw no payment are kept with a total of zero, and the last year is
/// discarded when it is `current_year` since it is still in progress.
pub fn annual_totals(payments: &[DividendPayment], current_year: i32) -> Vec<AnnualDividend> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for payment in payments.iter().filter(|p| p.amount > 0.0) {
        *by_year.entry(payment.date.year()).or_insert(0.0) += payment.amount;
    }

    let (first, last) = match (by_year.keys().next(), by_year.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut series: Vec<AnnualDividend> = (first..=last)
        .map(|year| AnnualDividend {
            year,
            total: by_year.get(&year).copied().unwrap_or(0.0),
        })
        .collect();

    if series.last().map(|a| a.year) == Some(current_year) {
        series.pop();
    }
    series
}

/// Growth streak and 5-year CAGR from complete annual totals, oldest first.
pub fn metrics_from_annual(series: &[AnnualDividend]) -> DividendMetrics {
    if series.len() < 2 {
        return DividendMetrics::sentinel();
    }

    // Two-point estimate between the newest year and the one five years before it.
    let mut growth_5y = DividendMetrics::DEFAULT_GROWTH;
    if series.len() > CAGR_YEARS {
        let now = series[series.len() - 1].total;
        let past = series[series.len() - 1 - CAGR_YEARS].total;
        if past > 0.0 {
            growth_5y = (now / past).powf(1.0 / CAGR_YEARS as f64) - 1.0;
        }
    }

    let consecutive_years = series
        .windows(2)
        .rev()
        .take_while(|pair| pair[1].total >= pair[0].total * GROWTH_TOLERANCE)
        .count() as u32;

    DividendMetrics {
        consecutive_years,
        growth_5y,
    }
}

pub fn dividend_metrics(payments: &[DividendPayment], current_year: i32) -> DividendMetrics {
    let series = annual_totals(payments, current_year);
    debug!("Annual dividend totals: {:?}", series);
    metrics_from_annual(&series)
}

/// Fetches the history and derives metrics. Never fails: any provider error
/// is logged and the sentinel is returned instead.
pub async fn fetch_dividend_metrics<P: SecurityDataProvider>(
    provider: &P,
    ticker: &str,
    history_years: u32,
    current_year: i32,
) -> DividendMetrics {
    match provider.dividend_history(ticker, history_years).await {
        Ok(payments) => dividend_metrics(&payments, current_year),
        Err(e) => {
            warn!("Error computing dividend metrics for {}: {}", ticker, e);
            DividendMetrics::sentinel()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(totals: &[f64]) -> Vec<AnnualDividend> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| AnnualDividend { year: 2015 + i as i32, total })
            .collect()
    }

    fn quarterly(year: i32, per_quarter: f64) -> Vec<DividendPayment> {
        [2, 5, 8, 11]
            .iter()
            .map(|&month| DividendPayment {
                date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
                amount: per_quarter,
            })
            .collect()
    }

    #[test]
    fn short_history_returns_sentinel() {
        assert_eq!(metrics_from_annual(&[]), DividendMetrics::sentinel());
        assert_eq!(metrics_from_annual(&series(&[1.0])), DividendMetrics::sentinel());
        assert_eq!(dividend_metrics(&[], 2026), DividendMetrics::sentinel());
    }

    #[test]
    fn flat_six_years() {
        let m = metrics_from_annual(&series(&[100.0; 6]));
        assert_eq!(m.consecutive_years, 5);
        assert!(m.growth_5y.abs() < 1e-12);
    }

    #[test]
    fn steady_growth_cagr() {
        let m = metrics_from_annual(&series(&[100.0, 110.0, 120.0, 130.0, 140.0, 150.0]));
        let expected = 1.5f64.powf(0.2) - 1.0;
        assert!((m.growth_5y - expected).abs() < 1e-12);
        assert!((m.growth_5y - 0.0845).abs() < 1e-4);
        assert_eq!(m.consecutive_years, 5);
    }

    #[test]
    fn cagr_uses_the_year_five_before_the_newest() {
        // Seven years: the first one must not be used as the start point.
        let m = metrics_from_annual(&series(&[1.0, 100.0, 100.0, 100.0, 100.0, 100.0, 200.0]));
        assert!((m.growth_5y - (2.0f64.powf(0.2) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_six_years_keeps_default_growth() {
        let m = metrics_from_annual(&series(&[100.0, 110.0, 120.0, 130.0, 140.0]));
        assert_eq!(m.growth_5y, 0.05);
        assert_eq!(m.consecutive_years, 4);
    }

    #[test]
    fn cut_right_behind_newest_year_stops_the_streak() {
        // Newest first this reads 100, 50, 100, 100.
        let m = metrics_from_annual(&series(&[100.0, 100.0, 50.0, 100.0]));
        assert_eq!(m.consecutive_years, 1);
    }

    #[test]
    fn cut_in_the_newest_year_gives_zero_streak() {
        let m = metrics_from_annual(&series(&[100.0, 100.0, 100.0, 50.0]));
        assert_eq!(m.consecutive_years, 0);
    }

    #[test]
    fn small_dips_within_tolerance_count_as_flat() {
        let m = metrics_from_annual(&series(&[100.0, 98.5, 97.0]));
        assert_eq!(m.consecutive_years, 2);

        let m = metrics_from_annual(&series(&[100.0, 97.9]));
        assert_eq!(m.consecutive_years, 0);
    }

    #[test]
    fn zero_start_year_keeps_default_growth() {
        let m = metrics_from_annual(&series(&[0.0, 1.0, 1.0, 1.0, 1.0, 2.0]));
        assert_eq!(m.growth_5y, 0.05);
    }

    #[test]
    fn annual_totals_sum_within_year_and_skip_non_positive() {
        let mut payments = quarterly(2020, 0.25);
        payments.push(DividendPayment {
            date: NaiveDate::from_ymd_opt(2020, 12, 1).unwrap(),
            amount: 0.0,
        });
        payments.push(DividendPayment {
            date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            amount: -1.0,
        });
        payments.extend(quarterly(2021, 0.30));

        let totals = annual_totals(&payments, 2026);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].year, 2020);
        assert!((totals[0].total - 1.0).abs() < 1e-12);
        assert_eq!(totals[1].year, 2021);
        assert!((totals[1].total - 1.2).abs() < 1e-12);
    }

    #[test]
    fn annual_totals_drop_current_year() {
        let mut payments = quarterly(2024, 0.5);
        payments.extend(quarterly(2025, 0.5));
        payments.push(DividendPayment {
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            amount: 0.5,
        });

        let totals = annual_totals(&payments, 2026);
        assert_eq!(totals.iter().map(|a| a.year).collect::<Vec<_>>(), vec![2024, 2025]);

        // Same data, a year later: nothing is in progress.
        assert_eq!(annual_totals(&payments, 2027).len(), 3);
    }

    #[test]
    fn annual_totals_fill_missing_years_with_zero() {
        let mut payments = quarterly(2015, 1.0);
        payments.extend(quarterly(2017, 1.0));

        let totals = annual_totals(&payments, 2026);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[1], AnnualDividend { year: 2016, total: 0.0 });
    }

    #[test]
    fn only_current_year_payments_is_insufficient() {
        let payments = quarterly(2026, 0.5);
        assert!(annual_totals(&payments, 2026).is_empty());
        assert_eq!(dividend_metrics(&payments, 2026), DividendMetrics::sentinel());
    }

    #[test]
    fn metrics_from_raw_payments() {
        let mut payments = Vec::new();
        for (i, year) in (2019..=2024).enumerate() {
            payments.extend(quarterly(year, 0.25 + 0.025 * i as f64));
        }
        payments.extend(quarterly(2025, 0.10));

        // 2025 is a real cut, so the streak is zero; CAGR runs 2020..=2025.
        let m = dividend_metrics(&payments, 2026);
        assert_eq!(m.consecutive_years, 0);
        let expected = (0.4f64 / 1.1).powf(0.2) - 1.0;
        assert!((m.growth_5y - expected).abs() < 1e-9);
    }
}
