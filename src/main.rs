use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autochehol::config::BotConfig;
use autochehol::localization::init_localization;
use autochehol::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging; LOG_FORMAT=json switches to structured output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Autochehol Telegram Bot");

    let config = BotConfig::from_env();

    init_localization(&config.default_language)?;

    server::run(config).await
}
