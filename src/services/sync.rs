// src/services/sync.rs
use anyhow::Result;
use chrono::{Local, NaiveDate};
use log::info;
use reqwest::Client;
use std::path::PathBuf;

use crate::config::SyncConfig;
use crate::services::scoring::rank_by_score;
use crate::services::screener::screen_universe;
use crate::services::snapshot::write_snapshot;
use crate::services::universe::fetch_universe;
use crate::services::yahoo::SecurityDataProvider;

const TOP_PICKS: usize = 5;

#[derive(Debug)]
pub struct SyncSummary {
    pub universe_size: usize,
    pub retained: usize,
    pub below_threshold: usize,
    pub skipped: usize,
    pub output_path: PathBuf,
}

pub async fn run_sync<P: SecurityDataProvider>(
    config: &SyncConfig,
    provider: &P,
    client: &Client,
) -> Result<SyncSummary> {
    run_sync_on(config, provider, client, Local::now().date_naive()).await
}

/// Universe -> screen -> snapshot, as of `today`. `client` fetches the
/// universe page. Only a failure to write the snapshot is returned as an error.
pub async fn run_sync_on<P: SecurityDataProvider>(
    config: &SyncConfig,
    provider: &P,
    client: &Client,
    today: NaiveDate,
) -> Result<SyncSummary> {
    let tickers = fetch_universe(client, &config.universe).await;
    let screened = screen_universe(provider, &tickers, config, today).await;

    write_snapshot(&config.output_path, &screened.records)?;

    for (rank, pick) in rank_by_score(&screened.records).iter().take(TOP_PICKS).enumerate() {
        info!(
            "#{} {} ({}) overall {} | dividend {} | fundamentals {}",
            rank + 1,
            pick.record.ticker,
            pick.record.name,
            pick.scores.overall,
            pick.scores.dividend,
            pick.scores.fundamentals
        );
    }

    let summary = SyncSummary {
        universe_size: tickers.len(),
        retained: screened.records.len(),
        below_threshold: screened.below_threshold,
        skipped: screened.skipped,
        output_path: config.output_path.clone(),
    };
    info!(
        "Done! {} of {} tickers qualified ({} below threshold, {} skipped)",
        summary.retained, summary.universe_size, summary.below_threshold, summary.skipped
    );
    Ok(summary)
}
