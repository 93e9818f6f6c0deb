//! Reply service for Vibe Coach.
//!
//! # Architecture
//!
//! - [`ReplyRouter`] - the [`vibe_types::ReplyService`] the conversation
//!   engine talks to; tries the direct route, then the proxy
//! - [`gemini`] - Google Gemini `generateContent` client (non-streaming)
//! - [`proxy`] - client for the `/api/generate` proxy endpoint
//! - [`prompt`] - system instruction, transcript and response schema
//! - [`wire`] - JSON bodies shared with the proxy server
//!
//! # Error Handling
//!
//! Clients return [`ReplyFailure`]. The router never surfaces it: every
//! failure ends as a degraded [`vibe_types::Reply`] with score 0.

pub mod failure;
pub mod gemini;
pub mod prompt;
pub mod proxy;
pub mod router;
pub mod wire;

use std::time::Duration;

pub use failure::{DEGRADED_REPLY_TEXT, ReplyFailure};
pub use gemini::GeminiClient;
pub use proxy::ProxyClient;
pub use router::{ReplyRouter, Route};
pub use wire::{CoachFeedbackBody, ModelReplyBody, ProxyErrorBody};

pub use vibe_types;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Shared client settings. Per-request timeouts are set by each client.
///
/// Plain HTTP is allowed so a local proxy can be reached.
#[must_use]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client: {e}. Using defaults.");
            reqwest::Client::new()
        })
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error response.
pub async fn read_capped_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
