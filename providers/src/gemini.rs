//! Direct Gemini `generateContent` client.
//!
//! One non-streaming call per turn. The model is constrained to JSON with
//! [`prompt::response_schema`] and the text of the first candidate is parsed
//! as a [`ModelReplyBody`].

use std::time::Duration;

use serde_json::{Value, json};

use vibe_types::{ApiKey, Reply, ReplyRequest};

use crate::failure::ReplyFailure;
use crate::wire::ModelReplyBody;
use crate::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL, http_client, prompt, read_capped_error_body};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            http: http_client(),
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: GEMINI_API_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Request body for one turn.
    #[must_use]
    pub fn build_body(request: &ReplyRequest) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": prompt::system_instruction(request) }]
            },
            "contents": prompt::contents(request),
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt::response_schema()
            }
        })
    }

    pub async fn generate(&self, request: &ReplyRequest) -> Result<Reply, ReplyFailure> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .timeout(self.timeout)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| ReplyFailure::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(ReplyFailure::from_status(status, &body));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ReplyFailure::from_reqwest(&e))?;
        let text = candidate_text(&data)?;
        ModelReplyBody::parse_reply(&text)
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(data: &Value) -> Result<String, ReplyFailure> {
    if let Some(reason) = data["promptFeedback"]["blockReason"].as_str() {
        return Err(ReplyFailure::Malformed(format!("prompt blocked: {reason}")));
    }
    let Some(parts) = data["candidates"][0]["content"]["parts"].as_array() else {
        let finish = data["candidates"][0]["finishReason"]
            .as_str()
            .unwrap_or("none");
        return Err(ReplyFailure::Malformed(format!(
            "no candidate content (finishReason: {finish})"
        )));
    };
    let text: String = parts
        .iter()
        .filter(|part| !part["thought"].as_bool().unwrap_or(false))
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.trim().is_empty() {
        return Err(ReplyFailure::Malformed("empty candidate text".into()));
    }
    Ok(text)
}
