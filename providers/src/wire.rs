//! JSON bodies shared by the Gemini client, the proxy client and the proxy
//! server.
//!
//! The model is asked for the same shape the proxy returns, so one type covers
//! both: `{girlfriendReply, coachFeedback: {score, comment, suggestion}}`.

use serde::{Deserialize, Serialize};

use vibe_types::{CoachFeedback, Rating, Reply, Score};

use crate::failure::ReplyFailure;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReplyBody {
    pub girlfriend_reply: String,
    pub coach_feedback: CoachFeedbackBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachFeedbackBody {
    pub score: i64,
    pub comment: String,
    pub suggestion: String,
}

impl ModelReplyBody {
    /// Validate a model answer. A genuine answer must carry a 1-5 score and
    /// a non-blank reply; 0 is reserved for degraded replies.
    pub fn into_reply(self) -> Result<Reply, ReplyFailure> {
        if self.girlfriend_reply.trim().is_empty() {
            return Err(ReplyFailure::Malformed("empty girlfriendReply".into()));
        }
        let rating = Rating::new(self.coach_feedback.score)
            .map_err(|e| ReplyFailure::Malformed(e.to_string()))?;
        Ok(Reply {
            reply_text: self.girlfriend_reply,
            feedback: CoachFeedback {
                score: Score::Rated(rating),
                critique: self.coach_feedback.comment,
                suggestion: self.coach_feedback.suggestion,
            },
        })
    }

    /// Parse and validate the JSON text produced by the model.
    pub fn parse_reply(text: &str) -> Result<Reply, ReplyFailure> {
        let body: Self = serde_json::from_str(text.trim())
            .map_err(|e| ReplyFailure::Malformed(format!("reply JSON: {e}")))?;
        body.into_reply()
    }
}

impl From<&Reply> for ModelReplyBody {
    fn from(reply: &Reply) -> Self {
        Self {
            girlfriend_reply: reply.reply_text.clone(),
            coach_feedback: CoachFeedbackBody {
                score: i64::from(reply.feedback.score.wire_value()),
                comment: reply.feedback.critique.clone(),
                suggestion: reply.feedback.suggestion.clone(),
            },
        }
    }
}

/// Failure body of the proxy: the error plus a renderable degraded reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyErrorBody {
    pub error: String,
    pub message: String,
    #[serde(flatten)]
    pub fallback: Option<ModelReplyBody>,
}
