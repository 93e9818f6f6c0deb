//! Client for the `/api/generate` proxy endpoint.

use std::time::Duration;

use vibe_types::{Reply, ReplyRequest};

use crate::failure::ReplyFailure;
use crate::wire::{ModelReplyBody, ProxyErrorBody};
use crate::{http_client, read_capped_error_body};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl ProxyClient {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn generate(&self, request: &ReplyRequest) -> Result<Reply, ReplyFailure> {
        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| ReplyFailure::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let raw = read_capped_error_body(response).await;
            // The server's fallback reply is ignored; the router builds its own
            // degraded reply from the classified failure.
            let detail = serde_json::from_str::<ProxyErrorBody>(&raw)
                .map(|body| format!("{}: {}", body.error, body.message))
                .unwrap_or(raw);
            return Err(ReplyFailure::from_status(status, &detail));
        }

        let body: ModelReplyBody = response
            .json()
            .await
            .map_err(|e| ReplyFailure::Malformed(format!("proxy body: {e}")))?;
        body.into_reply()
    }
}
