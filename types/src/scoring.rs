//! Scoring policy: quality score to vibe delta, emotion tag and tier label.
//!
//! Everything here is a pure function of its input. The coach rates each
//! player message 1-5; the reply router reports an unreachable or invalid
//! model as [`Score::Degraded`], which is kept out of the 1-5 domain so it can
//! never be mistaken for a genuine poor rating.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::Emotion;

/// Ascending relationship-quality labels, indexed by `vibe / 10`.
pub const VIBE_TIERS: [&str; 11] = [
    "關係冰點",
    "溝通障礙",
    "冷淡疏離",
    "互動沉悶",
    "平淡如水",
    "默契萌芽",
    "感情升溫",
    "熱情綻放",
    "濃情蜜意",
    "靈魂契合",
    "永恆之約",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("score {0} is outside the 1..=5 rating range")]
    OutOfRange(i64),
}

/// A genuine coach rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ScoreError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreError::OutOfRange(value))
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Outcome of one coach assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum Score {
    Rated(Rating),
    /// The reply service could not reach a valid model answer. Wire value 0.
    Degraded,
}

impl Score {
    /// Parse the integer carried on the wire: 0 is the degraded sentinel.
    pub fn from_wire(value: i64) -> Result<Self, ScoreError> {
        if value == 0 {
            Ok(Self::Degraded)
        } else {
            Rating::new(value).map(Self::Rated)
        }
    }

    #[must_use]
    pub const fn wire_value(self) -> u8 {
        match self {
            Score::Rated(rating) => rating.value(),
            Score::Degraded => 0,
        }
    }

    #[must_use]
    pub const fn rating(self) -> Option<Rating> {
        match self {
            Score::Rated(rating) => Some(rating),
            Score::Degraded => None,
        }
    }

    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Score::Degraded)
    }

    /// Vibe change applied when a message receives this score.
    #[must_use]
    pub const fn vibe_delta(self) -> i32 {
        match self.wire_value() {
            5 => 10,
            4 => 5,
            2 => -12,
            1 => -25,
            // 3 and the degraded sentinel leave the vibe unchanged
            _ => 0,
        }
    }

    /// Emotion the partner's next line is tagged with.
    #[must_use]
    pub const fn emotion(self) -> Emotion {
        match self.wire_value() {
            5 => Emotion::Affectionate,
            4 => Emotion::Pleased,
            2 => Emotion::Confused,
            1 => Emotion::Annoyed,
            _ => Emotion::Neutral,
        }
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_wire(value)
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.wire_value()
    }
}

impl From<Rating> for Score {
    fn from(value: Rating) -> Self {
        Score::Rated(value)
    }
}

/// Visual band of the vibe bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibeBand {
    Critical,
    Steady,
    Blazing,
}

/// Relationship health gauge, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VibeScore(u8);

impl VibeScore {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);
    pub const START: Self = Self(50);

    /// Build a score, clamping into `0..=100`.
    #[must_use]
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn apply(self, delta: i32) -> Self {
        Self::clamped(i32::from(self.0) + delta)
    }

    #[must_use]
    pub fn deduct(self, cost: u8) -> Self {
        Self(self.0.saturating_sub(cost))
    }

    #[must_use]
    pub const fn is_max(self) -> bool {
        self.0 >= 100
    }

    #[must_use]
    pub const fn is_depleted(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn tier_index(self) -> usize {
        (usize::from(self.0) / 10).min(VIBE_TIERS.len() - 1)
    }

    #[must_use]
    pub fn tier(self) -> &'static str {
        VIBE_TIERS[self.tier_index()]
    }

    #[must_use]
    pub const fn band(self) -> VibeBand {
        if self.0 <= 20 {
            VibeBand::Critical
        } else if self.0 > 85 {
            VibeBand::Blazing
        } else {
            VibeBand::Steady
        }
    }
}

impl Default for VibeScore {
    fn default() -> Self {
        Self::START
    }
}

impl std::fmt::Display for VibeScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
