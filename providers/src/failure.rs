//! Failure taxonomy of a reply attempt and the degraded reply built from it.

use reqwest::StatusCode;
use thiserror::Error;

use vibe_types::{CoachFeedback, Reply, Score};

/// In-character line shown when no model answer could be obtained.
pub const DEGRADED_REPLY_TEXT: &str =
    "（親愛的，我這裡收訊突然變得很差...剛才你說什麼？可以再對我說一次嗎？）";
const RETRY_SUGGESTION: &str =
    "這可能是因為地區網路限制或伺服器負載，請試著刷新頁面或稍候重試。";
const QUOTA_SUGGESTION: &str = "目前請求太頻繁，額度暫時用完了。請等一分鐘後再試一次。";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("quota exhausted: {0}")]
    Quota(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed model output: {0}")]
    Malformed(String),
    #[error("no API key is configured")]
    MissingCredential,
    #[error("no reply route is configured")]
    NotConfigured,
}

impl ReplyFailure {
    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }

    /// Classify a non-2xx response. 429 and `RESOURCE_EXHAUSTED` bodies are
    /// quota failures.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
            return Self::Quota(truncate(body));
        }
        Self::Http {
            status: status.as_u16(),
            message: truncate(body),
        }
    }

    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota(_))
    }

    /// Short machine-readable class, used in logs and proxy error bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Quota(_) => "quota_exhausted",
            Self::Http { .. } => "upstream_http",
            Self::Malformed(_) => "malformed_output",
            Self::MissingCredential => "missing_credential",
            Self::NotConfigured => "not_configured",
        }
    }

    /// Player-facing description of the failure class.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Transport(_) => "無法接觸伺服器".to_owned(),
            Self::Timeout => "伺服器回應逾時".to_owned(),
            Self::Quota(_) => "請求額度已用盡".to_owned(),
            Self::Http { status, .. } => format!("伺服器回應錯誤 ({status})"),
            Self::Malformed(_) => "收到無法解讀的回覆".to_owned(),
            Self::MissingCredential => "伺服器尚未設定金鑰".to_owned(),
            Self::NotConfigured => "沒有可用的連線設定".to_owned(),
        }
    }

    /// The reply shown in place of a model answer.
    #[must_use]
    pub fn degraded_reply(&self) -> Reply {
        let suggestion = if self.is_quota() {
            QUOTA_SUGGESTION
        } else {
            RETRY_SUGGESTION
        };
        Reply {
            reply_text: DEGRADED_REPLY_TEXT.to_owned(),
            feedback: CoachFeedback {
                score: Score::Degraded,
                critique: format!("連線異常：{}", self.describe()),
                suggestion: suggestion.to_owned(),
            },
        }
    }
}

const MAX_DETAIL_CHARS: usize = 300;

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_DETAIL_CHARS {
        return body.to_owned();
    }
    let mut out: String = body.chars().take(MAX_DETAIL_CHARS).collect();
    out.push_str("...(truncated)");
    out
}
