//! Error responses of the proxy endpoint.
//!
//! Every failure answers with a [`ProxyErrorBody`] that also carries a
//! degraded reply, so a client can render something without a second request.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use vibe_providers::{ModelReplyBody, ProxyErrorBody, ReplyFailure};

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("method not allowed, use POST")]
    MethodNotAllowed,
    #[error("server API key is not configured")]
    MissingCredential,
    #[error("invalid request body: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Upstream(ReplyFailure),
}

impl ProxyError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(failure) if failure.is_quota() => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Value of the `error` field.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed => "method_not_allowed",
            ProxyError::MissingCredential => "missing_credential",
            ProxyError::InvalidRequest(_) => "invalid_request",
            ProxyError::Upstream(failure) => failure.kind(),
        }
    }

    fn as_failure(&self) -> ReplyFailure {
        match self {
            ProxyError::MethodNotAllowed | ProxyError::InvalidRequest(_) => ReplyFailure::Http {
                status: self.status().as_u16(),
                message: self.to_string(),
            },
            ProxyError::MissingCredential => ReplyFailure::MissingCredential,
            ProxyError::Upstream(failure) => failure.clone(),
        }
    }

    #[must_use]
    pub fn body(&self) -> ProxyErrorBody {
        let fallback = self.as_failure().degraded_reply();
        ProxyErrorBody {
            error: self.code().to_owned(),
            message: self.to_string(),
            fallback: Some(ModelReplyBody::from(&fallback)),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
