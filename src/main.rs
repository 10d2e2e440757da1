use anyhow::Result;

use trademart_api::config::Config;
use trademart_api::startup;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    startup::init_tracing(config.log_format);

    startup::run(config).await
}
