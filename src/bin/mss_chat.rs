use mss_assistant::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();

    // Log lines would draw over the UI, so only log when explicitly asked to.
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::info!("Connecting chat view to relay at {}", config.relay_url);

    mss_assistant::view::terminal::run(&config.relay_url).await
}
