use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Failures talking to the upstream clan API.
#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    /// Request never produced a response (network, DNS, TLS, timeout).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A success response whose body could not be decoded.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
}

/// Everything the clan handler can answer besides a summary.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("API key not configured")]
    MissingApiKey,

    #[error("Clan tag is required")]
    MissingClanTag,

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal { details: String },
}

impl ApiError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            details: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingClanTag => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, message } => ApiError::Upstream { status, message },
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Internal { details } => {
                error!("Unhandled failure: {}", details);
                json!({ "error": self.to_string(), "details": details })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
