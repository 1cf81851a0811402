use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::provider::ProviderError;

/// Body of every non-2xx relay response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Provider { status: Option<u16>, message: String },
    InternalServerError(String),
}

impl fmt::Display for ApiError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Provider { status: Some(status), message } => {
                write!(f, "Provider error ({}): {}", status, message)
            }
            ApiError::Provider { status: None, message } => write!(f, "Provider error: {}", message),
            ApiError::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

// Conversion from ProviderError to ApiError
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api { status, message } => ApiError::Provider { status, message },
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal_server_error(msg: impl Into<String>) -> Self {
        ApiError::InternalServerError(msg.into())
    }

    /// HTTP status for this error. Provider statuses outside the error range fall back to 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Provider { status: Some(status), .. } if (400..=599).contains(status) => *status,
            ApiError::Provider { .. } | ApiError::InternalServerError(_) => 500,
        }
    }

    /// Client-facing body. Internal details stay in the logs.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Provider { message, .. } => format!("OpenAI API error: {message}"),
            ApiError::InternalServerError(_) => "Failed to process request".to_string(),
        };
        ErrorResponse { error }
    }
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.status())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code()).json(self.to_response())
    }
}
