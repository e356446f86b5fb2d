use anyhow::Context;
use server::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    server::logging::init(&config.logging);

    server::bootstrap::run(config).await
}
