use dividend_screener::config::SyncConfig;
use dividend_screener::services::sync::run_sync;
use dividend_screener::services::yahoo::YahooClient;
use dotenv::dotenv;
use log::{error, info};
use reqwest::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Logger initialized. Starting dividend sync...");

    let config = SyncConfig::from_env();
    let provider = YahooClient::new(config.yahoo.clone())?;
    let client = Client::builder()
        .user_agent(config.universe.user_agent.as_str())
        .timeout(config.yahoo.timeout)
        .build()?;

    match run_sync(&config, &provider, &client).await {
        Ok(summary) => {
            info!("Snapshot written to {}", summary.output_path.display());
            Ok(())
        }
        Err(e) => {
            error!("Failed to write snapshot: {:#}", e);
            Err(e)
        }
    }
}
