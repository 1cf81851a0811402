//! Vercel serverless function for the chat relay
//!
//! Exposes the same `/api/chat` contract as the standalone server: validate the body,
//! relay it to OpenAI in chat or image mode, and reshape the reply.

use std::sync::Arc;

use http_body_util::BodyExt;
use mss_assistant::config::Config;
use mss_assistant::provider::OpenAiProvider;
use mss_assistant::relay::Relay;
use mss_assistant::vercel::JsonReply;
use tracing_subscriber::EnvFilter;
use vercel_runtime::{Error, Request, Response, ResponseBody, run, service_fn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; provider calls will fail until it is configured");
    }
    let relay = Relay::new(Arc::new(OpenAiProvider::new(config.openai_api_key, config.openai_base_url)));

    tracing::info!("Starting chat relay serverless function");

    run(service_fn(move |req: Request| {
        let relay = relay.clone();
        async move { handler(req, &relay).await }
    }))
    .await
}

fn json_response(reply: &JsonReply) -> Result<Response<ResponseBody>, Error> {
    Ok(Response::builder()
        .status(reply.status_code)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(reply.body.clone().into())?)
}

/// Handles incoming HTTP requests for the chat relay
///
/// # Errors
///
/// Returns an error if the request body cannot be read or response building fails
pub async fn handler(
    req: Request,
    relay: &Relay,
) -> Result<Response<ResponseBody>, Error> {
    tracing::info!("Received request: {} {}", req.method(), req.uri().path());

    // Handle CORS preflight
    if req.method() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(().into())?);
    }

    if req.method() != "POST" {
        return json_response(&JsonReply::method_not_allowed());
    }

    let body = req.into_body().collect().await?.to_bytes();
    json_response(&JsonReply::relay(relay, &body).await)
}
