//! The reply-service seam between the conversation engine and the model.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::content::{Persona, Scenario};
use crate::scoring::{Score, VibeScore};
use crate::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

/// One prior line of the conversation as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: HistoryRole,
    pub content: String,
}

/// Everything the reply service needs for one turn.
///
/// Serializes to the proxy request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub scenario: Scenario,
    pub persona: Persona,
    pub history: Vec<HistoryTurn>,
    pub user_message: String,
    pub player_gender: Gender,
    pub vibe_score: VibeScore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachFeedback {
    pub score: Score,
    pub critique: String,
    pub suggestion: String,
}

/// A structurally valid reply: always renderable, possibly degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub reply_text: String,
    pub feedback: CoachFeedback,
}

impl Reply {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.feedback.score.is_degraded()
    }
}

/// Produces the partner's reply and the coach's assessment for one turn.
///
/// Implementations never fail: every transport or parsing problem resolves
/// to a degraded [`Reply`] whose score is [`Score::Degraded`].
pub trait ReplyService {
    fn get_reply(&self, request: &ReplyRequest) -> impl Future<Output = Reply> + Send;
}
