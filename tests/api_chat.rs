use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use mss_assistant::provider::{CompletionRequest, ImageRequest, Provider, ProviderError};
use mss_assistant::relay::Relay;
use mss_assistant::server;
use serde_json::{Value, json};

/// Provider double with canned answers.
struct CannedProvider {
    text: &'static str,
    url: &'static str,
    rejection: Option<(u16, &'static str)>,
}

impl CannedProvider {
    fn ok() -> Self {
        Self {
            text: "Hello",
            url: "https://x/img.png",
            rejection: None,
        }
    }

    fn rejecting(
        status: u16,
        message: &'static str,
    ) -> Self {
        Self {
            rejection: Some((status, message)),
            ..Self::ok()
        }
    }

    fn rejection(&self) -> Option<ProviderError> {
        self.rejection.map(|(status, message)| ProviderError::Api {
            status: Some(status),
            message: message.to_string(),
        })
    }
}

#[async_trait]
impl Provider for CannedProvider {
    async fn chat_completion(
        &self,
        _request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        match self.rejection() {
            Some(err) => Err(err),
            None => Ok(self.text.to_string()),
        }
    }

    async fn generate_image(
        &self,
        _request: ImageRequest,
    ) -> Result<String, ProviderError> {
        match self.rejection() {
            Some(err) => Err(err),
            None => Ok(self.url.to_string()),
        }
    }
}

async fn post_chat(
    provider: CannedProvider,
    body: Value,
) -> (StatusCode, Value) {
    let relay = web::Data::new(Relay::new(Arc::new(provider)));
    let app = test::init_service(App::new().app_data(relay).configure(server::configure)).await;

    let req = test::TestRequest::post().uri("/api/chat").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn user_messages(content: &str) -> Value {
    json!([{ "role": "user", "content": content }])
}

#[actix_web::test]
async fn chat_mode_returns_completion_text() {
    let (status, body) = post_chat(
        CannedProvider::ok(),
        json!({ "messages": user_messages("Hi"), "mode": "chat", "model": "gpt-4o" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "content": "Hello", "role": "assistant" }));
}

#[actix_web::test]
async fn image_mode_returns_image_url() {
    let (status, body) = post_chat(
        CannedProvider::ok(),
        json!({ "messages": user_messages("a lighthouse at dusk"), "mode": "image", "model": "gpt-4o" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "content": "https://x/img.png", "role": "assistant", "type": "image" })
    );
}

#[actix_web::test]
async fn empty_messages_are_rejected() {
    for messages in [json!([]), json!("hello"), Value::Null] {
        let (status, body) = post_chat(
            CannedProvider::ok(),
            json!({ "messages": messages, "mode": "chat", "model": "gpt-4o" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid messages format" }));
    }
}

#[actix_web::test]
async fn unknown_mode_is_rejected() {
    let (status, body) = post_chat(
        CannedProvider::ok(),
        json!({ "messages": user_messages("Hi"), "mode": "audio", "model": "gpt-4o" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid mode" }));
}

#[actix_web::test]
async fn provider_rejection_keeps_status_and_message() {
    let (status, body) = post_chat(
        CannedProvider::rejecting(429, "rate limited"),
        json!({ "messages": user_messages("Hi"), "mode": "chat", "model": "gpt-4o" }),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "OpenAI API error: rate limited" }));
}

#[actix_web::test]
async fn non_json_body_is_rejected() {
    let relay = web::Data::new(Relay::new(Arc::new(CannedProvider::ok())));
    let app = test::init_service(App::new().app_data(relay).configure(server::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .insert_header(("content-type", "text/plain"))
        .set_payload("hello")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid messages format");
}

#[actix_web::test]
async fn openapi_document_is_served() {
    let relay = web::Data::new(Relay::new(Arc::new(CannedProvider::ok())));
    let app = test::init_service(App::new().app_data(relay).configure(server::configure)).await;

    let req = test::TestRequest::get().uri("/api-doc/openapi.json").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = test::read_body_json(resp).await;
    assert!(doc["paths"].get("/api/chat").is_some());
}
