//! Conversation message model.
//!
//! Constructors take `SystemTime` explicitly; callers own the clock.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::NonEmptyString;
use crate::ids::MessageId;
use crate::scoring::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Partner,
}

/// Cosmetic mood of a partner line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Affectionate,
    Pleased,
    Neutral,
    Confused,
    Annoyed,
}

impl Emotion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Emotion::Affectionate => "affectionate",
            Emotion::Pleased => "pleased",
            Emotion::Neutral => "neutral",
            Emotion::Confused => "confused",
            Emotion::Annoyed => "annoyed",
        }
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Emotion::Affectionate => "🥰",
            Emotion::Pleased => "✨",
            Emotion::Neutral => "💬",
            Emotion::Confused => "❓",
            Emotion::Annoyed => "💢",
        }
    }
}

/// Coach feedback attached to a user message after the reply arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub score: Score,
    pub critique: String,
    pub suggestion: String,
    pub vibe_delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: NonEmptyString,
    timestamp: SystemTime,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    feedback: Option<Feedback>,
    #[serde(default)]
    feedback_unlocked: bool,
    #[serde(default)]
    suggestion_unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    emotion: Option<Emotion>,
}

impl Message {
    #[must_use]
    pub fn user(id: MessageId, text: NonEmptyString, timestamp: SystemTime) -> Self {
        Self {
            id,
            sender: Sender::User,
            text,
            timestamp,
            feedback: None,
            feedback_unlocked: false,
            suggestion_unlocked: false,
            emotion: None,
        }
    }

    #[must_use]
    pub fn partner(
        id: MessageId,
        text: NonEmptyString,
        emotion: Emotion,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            id,
            sender: Sender::Partner,
            text,
            timestamp,
            feedback: None,
            feedback_unlocked: false,
            suggestion_unlocked: false,
            emotion: Some(emotion),
        }
    }

    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn emotion(&self) -> Option<Emotion> {
        self.emotion
    }

    #[must_use]
    pub fn feedback_unlocked(&self) -> bool {
        self.feedback_unlocked
    }

    #[must_use]
    pub fn suggestion_unlocked(&self) -> bool {
        self.suggestion_unlocked
    }

    /// Attach coach feedback. Only the first attachment on a user message sticks.
    pub fn attach_feedback(&mut self, feedback: Feedback) -> bool {
        if self.sender != Sender::User || self.feedback.is_some() {
            return false;
        }
        self.feedback = Some(feedback);
        true
    }

    /// Mark the feedback panel revealed.
    ///
    /// Returns false when there is nothing to unlock or it is already open.
    pub fn unlock_feedback(&mut self) -> bool {
        if self.feedback.is_none() || self.feedback_unlocked {
            return false;
        }
        self.feedback_unlocked = true;
        true
    }

    /// Mark the suggestion revealed. Same contract as [`Self::unlock_feedback`].
    pub fn unlock_suggestion(&mut self) -> bool {
        if self.feedback.is_none() || self.suggestion_unlocked {
            return false;
        }
        self.suggestion_unlocked = true;
        true
    }
}
