use localtime_edge::{Config, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initializes logging, reads the configuration from the environment and
/// serves until SIGINT or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        addr = %config.listen_addr,
        provider = ?config.weather_provider,
        "configuration loaded"
    );

    server::run(config).await
}
