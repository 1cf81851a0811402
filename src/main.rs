use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use mss_assistant::config::Config;
use mss_assistant::provider::OpenAiProvider;
use mss_assistant::relay::Relay;
use mss_assistant::server;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; provider calls will fail until it is configured");
    }

    let provider = OpenAiProvider::new(config.openai_api_key.clone(), config.openai_base_url.clone());
    let relay = web::Data::new(Relay::new(Arc::new(provider)));

    tracing::info!("Relaying to {}", config.openai_base_url);
    tracing::info!(
        "Starting server at http://{}:{}/ (Swagger UI at /swagger-ui/)",
        config.host,
        config.port
    );

    HttpServer::new(move || App::new().app_data(relay.clone()).configure(server::configure))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
