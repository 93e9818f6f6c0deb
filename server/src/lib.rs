//! Proxy endpoint for Vibe Coach.
//!
//! `POST /api/generate` takes the same [`ReplyRequest`] body the terminal
//! client builds and answers with `{girlfriendReply, coachFeedback}`, calling
//! Gemini with a key that never leaves the server. `GET /health` reports
//! liveness.

mod error;

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use vibe_config::VibeConfig;
use vibe_providers::{GeminiClient, ModelReplyBody};
use vibe_types::ReplyRequest;

pub use error::ProxyError;

/// Shared, read-only handler state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    gemini: Option<GeminiClient>,
}

impl AppState {
    #[must_use]
    pub fn new(gemini: Option<GeminiClient>) -> Self {
        Self { gemini }
    }

    /// Build the upstream client from the server key and `[gemini]` settings.
    #[must_use]
    pub fn from_config(config: &VibeConfig) -> Self {
        let gemini = config.server_key().map(|key| {
            GeminiClient::new(key)
                .with_model(&config.gemini.model)
                .with_base_url(&config.gemini.base_url)
                .with_timeout(config.gemini.timeout())
        });
        if gemini.is_none() {
            tracing::warn!("No API key configured; /api/generate will answer 500");
        }
        Self { gemini }
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.gemini.is_some()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/generate",
            post(generate).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> Result<Json<ModelReplyBody>, ProxyError> {
    let span = tracing::info_span!("generate", request_id = %Uuid::new_v4());
    async move {
        let client = state.gemini.as_ref().ok_or_else(|| {
            tracing::error!("Rejecting request: server API key is missing");
            ProxyError::MissingCredential
        })?;
        let Json(request) = payload.map_err(|rejection| {
            tracing::warn!(status = rejection.status().as_u16(), "Invalid request body");
            ProxyError::InvalidRequest(rejection.body_text())
        })?;

        match client.generate(&request).await {
            Ok(reply) => {
                tracing::info!(
                    score = reply.feedback.score.wire_value(),
                    vibe = request.vibe_score.value(),
                    "Upstream reply"
                );
                Ok(Json(ModelReplyBody::from(&reply)))
            }
            Err(failure) => {
                let error = ProxyError::Upstream(failure);
                tracing::error!(
                    status = error.status().as_u16(),
                    kind = error.code(),
                    error = %error,
                    "Upstream call failed"
                );
                Err(error)
            }
        }
    }
    .instrument(span)
    .await
}

async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "credential": state.has_credential(),
    }))
}
