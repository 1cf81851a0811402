//! HTTP surface of the relay
//!
//! `POST /api/chat` plus the OpenAPI document and Swagger UI.

use actix_web::{HttpResponse, post, web};
use tracing::Instrument;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::chat::{ChatMessage, ChatMode, ChatPayload, ChatResponse, ChatRole, MessageType};
use crate::error::{ApiError, ErrorResponse};
use crate::relay::Relay;

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Assistant reply (text, or image URL when type is \"image\")", body = ChatResponse),
        (status = 400, description = "Invalid messages format or invalid mode", body = ErrorResponse),
        (status = 500, description = "Provider or internal failure; provider status codes are passed through", body = ErrorResponse)
    )
)]
#[post("/api/chat")]
pub async fn chat(
    relay: web::Data<Relay>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    let response = relay.handle(&body).instrument(span).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(
        ChatPayload,
        ChatResponse,
        ChatMessage,
        ChatRole,
        ChatMode,
        MessageType,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

/// Register the relay routes. The caller provides `web::Data<Relay>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(chat)
        .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()));
}
