//! Scenario and persona records.
//!
//! The records are plain data. The tables themselves live in `vibe-core`.
//! Field names serialize in camelCase because the same records travel in the
//! proxy request body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Gender;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} id: {value}")]
pub struct UnknownIdError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    DailyCare,
    MissingYou,
    Intimacy,
    Praise,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 4] = [
        ScenarioId::DailyCare,
        ScenarioId::MissingYou,
        ScenarioId::Intimacy,
        ScenarioId::Praise,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScenarioId::DailyCare => "daily_care",
            ScenarioId::MissingYou => "missing_you",
            ScenarioId::Intimacy => "intimacy",
            ScenarioId::Praise => "praise",
        }
    }
}

impl FromStr for ScenarioId {
    type Err = UnknownIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| UnknownIdError {
                kind: "scenario",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    Rational,
    Golden,
    Avoidant,
    Tsundere,
    Anxious,
    HighVibe,
}

impl PersonaId {
    pub const ALL: [PersonaId; 6] = [
        PersonaId::Rational,
        PersonaId::Golden,
        PersonaId::Avoidant,
        PersonaId::Tsundere,
        PersonaId::Anxious,
        PersonaId::HighVibe,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PersonaId::Rational => "rational",
            PersonaId::Golden => "golden",
            PersonaId::Avoidant => "avoidant",
            PersonaId::Tsundere => "tsundere",
            PersonaId::Anxious => "anxious",
            PersonaId::HighVibe => "high_vibe",
        }
    }
}

impl FromStr for PersonaId {
    type Err = UnknownIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| UnknownIdError {
                kind: "persona",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated partner profile. `trait_desc`, `likes` and `dislikes` are
/// embedded verbatim in the model prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    pub avatar: String,
    pub description: String,
    #[serde(rename = "trait")]
    pub trait_desc: String,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub style_hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub word: String,
    pub alternatives: Vec<String>,
}

/// Opening lines, keyed by the gender of the player they are addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroPool {
    pub for_male: Vec<String>,
    pub for_female: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    pub emoji: String,
    pub description: String,
    pub examples: Vec<String>,
    pub replacements: Vec<Replacement>,
    pub intro_pool: IntroPool,
}

impl Scenario {
    #[must_use]
    pub fn opening_lines(&self, player: Gender) -> &[String] {
        match player {
            Gender::Male => &self.intro_pool.for_male,
            Gender::Female => &self.intro_pool.for_female,
        }
    }
}
