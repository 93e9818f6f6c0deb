//! Static scenario and persona tables.
//!
//! The tables are TOML files embedded at compile time and parsed once at
//! startup. After [`ContentStore::load_builtin`] returns, the store is
//! read-only.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use vibe_types::{Gender, Persona, PersonaId, Scenario, ScenarioId};

const BUILTIN_SCENARIOS: &str = include_str!("../content/scenarios.toml");
const BUILTIN_PERSONAS: &str = include_str!("../content/personas.toml");

/// One-liners shown when a session ends in defeat.
pub const DEFEAT_VERDICTS: [&str; 11] = [
    "你又一次憑實力把天給聊死了。",
    "你的情商大概還在月子中心進修。",
    "建議這段對話可以列入單身手冊反面教材。",
    "剛才那句話，是打算把對方推到外太空嗎？",
    "這種聊天法，連 Siri 都會想已讀不回。",
    "恭喜你，成功讓對方對你的人生關上了門。",
    "你是怎麼做到每一句都精準踩在雷區上的？",
    "空氣突然安靜，是因為你把氧氣聊乾了。",
    "對方目前對你的好感度，比昨天的剩菜還低。",
    "你這不是在聊天，你是在進行人道主義關懷（失敗版）。",
    "你的幽默感，似乎跟你的智商一起離家出走了。",
];

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        source: toml::de::Error,
    },
    #[error("scenario {0} is missing from the scenario table")]
    MissingScenario(ScenarioId),
    #[error("scenario {0} appears more than once")]
    DuplicateScenario(ScenarioId),
    #[error("scenario {id} has no usable opening lines for {gender} players")]
    EmptyIntroPool { id: ScenarioId, gender: Gender },
    #[error("the {0} persona list is empty")]
    EmptyPersonaList(Gender),
    #[error("persona {id} appears more than once in the {gender} list")]
    DuplicatePersona { id: PersonaId, gender: Gender },
}

#[derive(Deserialize)]
struct ScenarioTable {
    scenario: Vec<Scenario>,
}

#[derive(Deserialize)]
struct PersonaTable {
    male: Vec<Persona>,
    female: Vec<Persona>,
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    scenarios: Vec<Scenario>,
    male_partners: Vec<Persona>,
    female_partners: Vec<Persona>,
}

impl ContentStore {
    pub fn load_builtin() -> Result<Self, ContentError> {
        Self::from_toml(BUILTIN_SCENARIOS, BUILTIN_PERSONAS)
    }

    pub fn from_toml(scenarios: &str, personas: &str) -> Result<Self, ContentError> {
        let scenarios: ScenarioTable =
            toml::from_str(scenarios).map_err(|source| ContentError::Parse {
                table: "scenario",
                source,
            })?;
        let personas: PersonaTable =
            toml::from_str(personas).map_err(|source| ContentError::Parse {
                table: "persona",
                source,
            })?;

        let store = Self {
            scenarios: scenarios.scenario,
            male_partners: personas.male,
            female_partners: personas.female,
        };
        store.validate()?;
        tracing::debug!(
            scenarios = store.scenarios.len(),
            male_partners = store.male_partners.len(),
            female_partners = store.female_partners.len(),
            "Content tables loaded"
        );
        Ok(store)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id) {
                return Err(ContentError::DuplicateScenario(scenario.id));
            }
            for gender in [Gender::Male, Gender::Female] {
                let usable = scenario
                    .opening_lines(gender)
                    .iter()
                    .any(|line| !line.trim().is_empty());
                if !usable {
                    return Err(ContentError::EmptyIntroPool {
                        id: scenario.id,
                        gender,
                    });
                }
            }
        }
        if let Some(missing) = ScenarioId::ALL.into_iter().find(|id| !seen.contains(id)) {
            return Err(ContentError::MissingScenario(missing));
        }

        for (gender, list) in [
            (Gender::Male, &self.male_partners),
            (Gender::Female, &self.female_partners),
        ] {
            if list.is_empty() {
                return Err(ContentError::EmptyPersonaList(gender));
            }
            let mut ids = HashSet::new();
            for persona in list {
                if !ids.insert(persona.id) {
                    return Err(ContentError::DuplicatePersona {
                        id: persona.id,
                        gender,
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    #[must_use]
    pub fn scenario(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Partners offered to a player of the given gender.
    #[must_use]
    pub fn partners_for(&self, player: Gender) -> &[Persona] {
        match player.partner() {
            Gender::Male => &self.male_partners,
            Gender::Female => &self.female_partners,
        }
    }

    #[must_use]
    pub fn persona(&self, player: Gender, id: PersonaId) -> Option<&Persona> {
        self.partners_for(player).iter().find(|p| p.id == id)
    }
}
