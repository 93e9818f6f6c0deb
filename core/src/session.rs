//! Navigation state machine.
//!
//! ```text
//! Landing --select_gender--> PersonaSelect --select_persona--> Menu
//!    ^                           |   ^                          |  ^
//!    +------change_gender--------+   +------change_persona------+  |
//!                                                               |  back
//!                                            select_scenario    v  |
//!                                       Practice <--start-- Learn -+
//!                                           +---exit_practice--^
//! ```
//!
//! Every transition checks its source view. A wrong view or an id missing
//! from the content tables returns [`NavigationError`] and leaves the session
//! untouched.

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use vibe_types::{Gender, Persona, PersonaId, Scenario, ScenarioId};

use crate::content::ContentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    PersonaSelect,
    Menu,
    Learn,
    Practice,
}

impl View {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            View::Landing => "landing",
            View::PersonaSelect => "persona-select",
            View::Menu => "menu",
            View::Learn => "learn",
            View::Practice => "practice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("cannot {action} from the {} view", .from.as_str())]
    WrongView { action: &'static str, from: View },
    #[error("persona {0} is not offered to this player")]
    UnknownPersona(PersonaId),
    #[error("scenario {0} does not exist")]
    UnknownScenario(ScenarioId),
    #[error("no partners are available for {0} players")]
    NoPartners(Gender),
}

#[derive(Debug, Clone)]
pub struct Session {
    view: View,
    player_gender: Option<Gender>,
    persona: Option<PersonaId>,
    scenario: Option<ScenarioId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: View::Landing,
            player_gender: None,
            persona: None,
            scenario: None,
        }
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn player_gender(&self) -> Option<Gender> {
        self.player_gender
    }

    #[must_use]
    pub fn persona_id(&self) -> Option<PersonaId> {
        self.persona
    }

    #[must_use]
    pub fn scenario_id(&self) -> Option<ScenarioId> {
        self.scenario
    }

    #[must_use]
    pub fn persona<'a>(&self, content: &'a ContentStore) -> Option<&'a Persona> {
        content.persona(self.player_gender?, self.persona?)
    }

    #[must_use]
    pub fn scenario<'a>(&self, content: &'a ContentStore) -> Option<&'a Scenario> {
        content.scenario(self.scenario?)
    }

    fn expect_view(&self, expected: View, action: &'static str) -> Result<(), NavigationError> {
        if self.view == expected {
            Ok(())
        } else {
            Err(NavigationError::WrongView {
                action,
                from: self.view,
            })
        }
    }

    fn gender_for(&self, action: &'static str) -> Result<Gender, NavigationError> {
        self.player_gender.ok_or(NavigationError::WrongView {
            action,
            from: self.view,
        })
    }

    pub fn select_gender(&mut self, gender: Gender) -> Result<(), NavigationError> {
        self.expect_view(View::Landing, "select a gender")?;
        self.player_gender = Some(gender);
        self.view = View::PersonaSelect;
        Ok(())
    }

    pub fn select_persona(
        &mut self,
        content: &ContentStore,
        id: PersonaId,
    ) -> Result<(), NavigationError> {
        self.expect_view(View::PersonaSelect, "select a persona")?;
        let gender = self.gender_for("select a persona")?;
        if content.persona(gender, id).is_none() {
            return Err(NavigationError::UnknownPersona(id));
        }
        self.persona = Some(id);
        self.view = View::Menu;
        Ok(())
    }

    /// Uniform pick over the partners offered to this player.
    pub fn select_random_persona<R: Rng + ?Sized>(
        &mut self,
        content: &ContentStore,
        rng: &mut R,
    ) -> Result<PersonaId, NavigationError> {
        self.expect_view(View::PersonaSelect, "select a persona")?;
        let gender = self.gender_for("select a persona")?;
        let picked = content
            .partners_for(gender)
            .choose(rng)
            .map(|persona| persona.id)
            .ok_or(NavigationError::NoPartners(gender))?;
        self.persona = Some(picked);
        self.view = View::Menu;
        Ok(picked)
    }

    pub fn select_scenario(
        &mut self,
        content: &ContentStore,
        id: ScenarioId,
    ) -> Result<(), NavigationError> {
        self.expect_view(View::Menu, "select a scenario")?;
        if content.scenario(id).is_none() {
            return Err(NavigationError::UnknownScenario(id));
        }
        self.scenario = Some(id);
        self.view = View::Learn;
        Ok(())
    }

    pub fn start_practice(&mut self) -> Result<(), NavigationError> {
        self.expect_view(View::Learn, "start practice")?;
        self.view = View::Practice;
        Ok(())
    }

    /// Learn -> Menu. Drops the scenario.
    pub fn back(&mut self) -> Result<(), NavigationError> {
        self.expect_view(View::Learn, "go back to the menu")?;
        self.scenario = None;
        self.view = View::Menu;
        Ok(())
    }

    pub fn exit_practice(&mut self) -> Result<(), NavigationError> {
        self.expect_view(View::Practice, "exit practice")?;
        self.view = View::Learn;
        Ok(())
    }

    /// Menu -> PersonaSelect. Drops the persona.
    pub fn change_persona(&mut self) -> Result<(), NavigationError> {
        self.expect_view(View::Menu, "change persona")?;
        self.persona = None;
        self.view = View::PersonaSelect;
        Ok(())
    }

    /// PersonaSelect -> Landing. Drops the gender.
    pub fn change_gender(&mut self) -> Result<(), NavigationError> {
        self.expect_view(View::PersonaSelect, "change gender")?;
        self.player_gender = None;
        self.view = View::Landing;
        Ok(())
    }
}
