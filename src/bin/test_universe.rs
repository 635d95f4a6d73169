use dividend_screener::config::UniverseConfig;
use dividend_screener::services::universe::fetch_universe;
use dotenv::dotenv;
use log::info;
use reqwest::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let config = UniverseConfig::default();
    let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;

    let tickers = fetch_universe(&client, &config).await;
    info!("Universe has {} tickers", tickers.len());
    println!("{}", tickers.iter().take(20).cloned().collect::<Vec<_>>().join(", "));

    Ok(())
}
