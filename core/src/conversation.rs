//! Conversation engine: message log, vibe gauge, final call and unlock economy.
//!
//! One [`Conversation`] backs one practice screen. All mutation goes through
//! `&mut self`, and at most one reply is outstanding at a time: a submit is
//! split into [`Conversation::begin_submit`], which appends the user line and
//! hands out a [`PendingTurn`], and [`Conversation::complete_submit`], which
//! applies the reply. [`Conversation::submit_user_message`] runs both around a
//! [`ReplyService`] call.
//!
//! Reaching 0 or 100 does not end the game by itself. The engine raises a
//! [`FinalCall`] and only [`Conversation::acknowledge_final_call`] moves the
//! result to won or lost. From there the result is fixed until
//! [`Conversation::restart`].

use std::time::SystemTime;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use vibe_types::{
    Emotion, Feedback, Gender, HistoryRole, HistoryTurn, Message, MessageId, NonEmptyStaticStr,
    NonEmptyString, Persona, Reply, ReplyRequest, ReplyService, Scenario, ScenarioId, Score,
    VibeScore,
};

use crate::content::DEFEAT_VERDICTS;
use crate::summary::SessionSummary;

/// Vibe spent to reveal the critique of one message.
pub const FEEDBACK_UNLOCK_COST: u8 = 5;

/// Shown when the model returns an empty line.
const SILENT_REPLY: NonEmptyStaticStr = NonEmptyStaticStr::new("…");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Playing,
    Won,
    Lost,
}

/// A threshold was reached and waits for the player to acknowledge it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalCall {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("scenario {scenario} has no opening line for {player} players")]
    NoOpeningLines { scenario: ScenarioId, player: Gender },
}

/// Why a submit was refused. The conversation is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("message is empty")]
    EmptyInput,
    #[error("the session is over")]
    GameOver,
    #[error("the final call has not been acknowledged")]
    AwaitingAcknowledgment,
    #[error("a reply is still pending")]
    RequestPending,
    #[error("the conversation was restarted before the reply arrived")]
    Superseded,
}

/// An accepted submit whose reply has not been applied yet.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    message_id: MessageId,
    request: ReplyRequest,
}

impl PendingTurn {
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    #[must_use]
    pub fn request(&self) -> &ReplyRequest {
        &self.request
    }
}

/// What one completed turn changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub user_message: MessageId,
    pub partner_message: MessageId,
    pub score: Score,
    pub vibe_delta: i32,
    pub vibe: VibeScore,
    pub final_call: Option<FinalCall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionUnlock {
    /// First reveal; `cost` was deducted (possibly zero).
    Revealed { cost: u8 },
    /// Already paid for; visibility flipped at no charge.
    Toggled { visible: bool },
    /// No such user message, or it has no feedback yet.
    Unavailable,
    InsufficientVibe { cost: u8 },
    /// A final call is waiting; the vibe is frozen until it is acknowledged.
    AwaitingAcknowledgment,
}

#[derive(Debug)]
pub struct Conversation {
    scenario: Scenario,
    persona: Persona,
    player: Gender,
    openings: Vec<NonEmptyString>,
    rng: StdRng,
    messages: Vec<Message>,
    next_id: MessageId,
    vibe: VibeScore,
    result: GameResult,
    final_call: Option<FinalCall>,
    pending: Option<MessageId>,
    visible_suggestion: Option<MessageId>,
    last_delta: Option<i32>,
    verdict: Option<&'static str>,
}

impl Conversation {
    /// Start a conversation with a random opening line from the partner.
    pub fn new(
        scenario: Scenario,
        persona: Persona,
        player: Gender,
        rng: StdRng,
    ) -> Result<Self, ConversationError> {
        let openings: Vec<NonEmptyString> = scenario
            .opening_lines(player)
            .iter()
            .filter_map(|line| NonEmptyString::new(line.as_str()).ok())
            .collect();
        if openings.is_empty() {
            return Err(ConversationError::NoOpeningLines {
                scenario: scenario.id,
                player,
            });
        }

        let mut conversation = Self {
            scenario,
            persona,
            player,
            openings,
            rng,
            messages: Vec::new(),
            next_id: MessageId::new(0),
            vibe: VibeScore::START,
            result: GameResult::Playing,
            final_call: None,
            pending: None,
            visible_suggestion: None,
            last_delta: None,
            verdict: None,
        };
        conversation.initialize();
        Ok(conversation)
    }

    fn initialize(&mut self) {
        self.messages.clear();
        self.vibe = VibeScore::START;
        self.result = GameResult::Playing;
        self.final_call = None;
        self.pending = None;
        self.visible_suggestion = None;
        self.last_delta = None;
        self.verdict = None;

        let Some(opening) = self.openings.choose(&mut self.rng).cloned() else {
            return;
        };
        let id = self.allocate_id();
        self.messages
            .push(Message::partner(id, opening, Emotion::Neutral, SystemTime::now()));
    }

    /// Throw the log away and start over with a fresh opening line.
    ///
    /// A reply still in flight is dropped when it arrives.
    pub fn restart(&mut self) {
        tracing::debug!(scenario = %self.scenario.id, "Conversation restarted");
        self.initialize();
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn vibe(&self) -> VibeScore {
        self.vibe
    }

    #[must_use]
    pub fn tier(&self) -> &'static str {
        self.vibe.tier()
    }

    #[must_use]
    pub fn result(&self) -> GameResult {
        self.result
    }

    #[must_use]
    pub fn final_call(&self) -> Option<FinalCall> {
        self.final_call
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn visible_suggestion(&self) -> Option<MessageId> {
        self.visible_suggestion
    }

    /// Vibe change from the latest reply; cleared when a new message is sent.
    #[must_use]
    pub fn last_delta(&self) -> Option<i32> {
        self.last_delta
    }

    #[must_use]
    pub fn verdict(&self) -> Option<&'static str> {
        self.verdict
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[must_use]
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    #[must_use]
    pub fn player(&self) -> Gender {
        self.player
    }

    /// Append the player's line and build the request for the reply service.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingTurn, SubmitRejection> {
        if self.result != GameResult::Playing {
            return Err(SubmitRejection::GameOver);
        }
        if self.final_call.is_some() {
            return Err(SubmitRejection::AwaitingAcknowledgment);
        }
        if self.pending.is_some() {
            return Err(SubmitRejection::RequestPending);
        }
        let text = NonEmptyString::new(text).map_err(|_| SubmitRejection::EmptyInput)?;

        let history = self
            .messages
            .iter()
            .map(|m| HistoryTurn {
                role: if m.is_user() {
                    HistoryRole::User
                } else {
                    HistoryRole::Model
                },
                content: m.text().to_owned(),
            })
            .collect();
        let request = ReplyRequest {
            scenario: self.scenario.clone(),
            persona: self.persona.clone(),
            history,
            user_message: text.as_str().to_owned(),
            player_gender: self.player,
            vibe_score: self.vibe,
        };

        let id = self.allocate_id();
        self.messages.push(Message::user(id, text, SystemTime::now()));
        self.pending = Some(id);
        self.last_delta = None;
        tracing::debug!(message_id = %id, vibe = self.vibe.value(), "Submitted message");

        Ok(PendingTurn {
            message_id: id,
            request,
        })
    }

    /// Apply the reply for `turn`.
    ///
    /// Returns `None` when the turn no longer matches the outstanding request,
    /// which happens after a restart.
    pub fn complete_submit(&mut self, turn: PendingTurn, reply: Reply) -> Option<TurnReport> {
        if self.pending != Some(turn.message_id) {
            tracing::debug!(message_id = %turn.message_id, "Dropping stale reply");
            return None;
        }
        self.pending = None;

        let score = reply.feedback.score;
        let delta = score.vibe_delta();
        if let Some(message) = self.messages.iter_mut().find(|m| m.id() == turn.message_id) {
            message.attach_feedback(Feedback {
                score,
                critique: reply.feedback.critique,
                suggestion: reply.feedback.suggestion,
                vibe_delta: delta,
            });
        }

        let text =
            NonEmptyString::new(reply.reply_text).unwrap_or_else(|_| SILENT_REPLY.into());
        let partner_id = self.allocate_id();
        self.messages.push(Message::partner(
            partner_id,
            text,
            score.emotion(),
            SystemTime::now(),
        ));

        self.vibe = self.vibe.apply(delta);
        self.last_delta = Some(delta);
        self.check_thresholds();

        tracing::debug!(
            message_id = %turn.message_id,
            score = score.wire_value(),
            delta,
            vibe = self.vibe.value(),
            "Reply applied"
        );

        Some(TurnReport {
            user_message: turn.message_id,
            partner_message: partner_id,
            score,
            vibe_delta: delta,
            vibe: self.vibe,
            final_call: self.final_call,
        })
    }

    /// Submit a message and wait for the reply.
    pub async fn submit_user_message<S: ReplyService>(
        &mut self,
        text: &str,
        service: &S,
    ) -> Result<TurnReport, SubmitRejection> {
        let turn = self.begin_submit(text)?;
        let reply = service.get_reply(turn.request()).await;
        self.complete_submit(turn, reply)
            .ok_or(SubmitRejection::Superseded)
    }

    fn check_thresholds(&mut self) {
        if self.result != GameResult::Playing || self.final_call.is_some() {
            return;
        }
        if self.vibe.is_max() {
            self.final_call = Some(FinalCall::Victory);
        } else if self.vibe.is_depleted() {
            self.final_call = Some(FinalCall::Defeat);
            self.verdict = DEFEAT_VERDICTS.choose(&mut self.rng).copied();
        } else {
            return;
        }
        tracing::info!(vibe = self.vibe.value(), final_call = ?self.final_call, "Final call");
    }

    /// Turn a pending final call into the terminal result.
    pub fn acknowledge_final_call(&mut self) -> Option<GameResult> {
        let call = self.final_call.take()?;
        self.result = match call {
            FinalCall::Victory => GameResult::Won,
            FinalCall::Defeat => GameResult::Lost,
        };
        Some(self.result)
    }

    fn user_message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.id() == id && m.is_user())
    }

    /// Reveal the critique of a scored message for [`FEEDBACK_UNLOCK_COST`].
    ///
    /// Returns false, without charging, when there is no feedback, it is
    /// already revealed, the vibe cannot cover the cost, or a final call is
    /// waiting to be acknowledged.
    pub fn unlock_feedback(&mut self, id: MessageId) -> bool {
        if self.final_call.is_some() {
            return false;
        }
        let vibe = self.vibe;
        let Some(message) = self.user_message_mut(id) else {
            return false;
        };
        if message.feedback_unlocked() || vibe.value() < FEEDBACK_UNLOCK_COST {
            return false;
        }
        if !message.unlock_feedback() {
            return false;
        }
        self.vibe = vibe.deduct(FEEDBACK_UNLOCK_COST);
        tracing::debug!(message_id = %id, vibe = self.vibe.value(), "Feedback unlocked");
        self.check_thresholds();
        true
    }

    /// Current price of revealing a suggestion.
    #[must_use]
    pub fn suggestion_cost(&self) -> u8 {
        match self.vibe.value() {
            v if v > 60 => 5,
            v if v < 10 => 0,
            _ => 2,
        }
    }

    #[must_use]
    pub fn suggestion_cost_label(&self) -> String {
        match self.suggestion_cost() {
            0 => "FREE".to_owned(),
            cost => format!("Cost {cost} HP"),
        }
    }

    /// Reveal a suggestion, or toggle it once it has been paid for.
    pub fn unlock_suggestion(&mut self, id: MessageId) -> SuggestionUnlock {
        if self.final_call.is_some() {
            return SuggestionUnlock::AwaitingAcknowledgment;
        }
        let cost = self.suggestion_cost();
        let vibe = self.vibe;
        let visible = self.visible_suggestion;
        let Some(message) = self.user_message_mut(id) else {
            return SuggestionUnlock::Unavailable;
        };
        if message.feedback().is_none() {
            return SuggestionUnlock::Unavailable;
        }

        if message.suggestion_unlocked() {
            let now_visible = visible != Some(id);
            self.visible_suggestion = now_visible.then_some(id);
            return SuggestionUnlock::Toggled {
                visible: now_visible,
            };
        }

        if vibe.value() < cost {
            return SuggestionUnlock::InsufficientVibe { cost };
        }
        message.unlock_suggestion();
        self.vibe = vibe.deduct(cost);
        self.visible_suggestion = Some(id);
        tracing::debug!(message_id = %id, cost, vibe = self.vibe.value(), "Suggestion unlocked");
        self.check_thresholds();
        SuggestionUnlock::Revealed { cost }
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::compute(&self.messages, self.vibe)
    }

    #[cfg(test)]
    pub(crate) fn set_vibe(&mut self, value: i32) {
        self.vibe = VibeScore::clamped(value);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::{Future, Ready, ready};
    use std::sync::Mutex;

    use rand::SeedableRng;
    use vibe_types::{CoachFeedback, PersonaId, Sender};

    use super::*;
    use crate::content::ContentStore;

    struct Scripted {
        replies: Mutex<VecDeque<Reply>>,
        seen: Mutex<Vec<ReplyRequest>>,
    }

    impl Scripted {
        fn new(scores: &[i64]) -> Self {
            Self {
                replies: Mutex::new(scores.iter().map(|s| reply(*s)).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ReplyService for Scripted {
        fn get_reply(&self, request: &ReplyRequest) -> impl Future<Output = Reply> + Send {
            self.seen.lock().unwrap().push(request.clone());
            let next = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| reply(0));
            let out: Ready<Reply> = ready(next);
            out
        }
    }

    fn reply(score: i64) -> Reply {
        Reply {
            reply_text: format!("reply scored {score}"),
            feedback: CoachFeedback {
                score: Score::from_wire(score).unwrap(),
                critique: "critique".into(),
                suggestion: "suggestion".into(),
            },
        }
    }

    fn conversation() -> Conversation {
        let content = ContentStore::load_builtin().unwrap();
        let scenario = content.scenario(ScenarioId::DailyCare).unwrap().clone();
        let persona = content
            .persona(Gender::Male, PersonaId::Tsundere)
            .unwrap()
            .clone();
        Conversation::new(scenario, persona, Gender::Male, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn starts_with_a_neutral_opening_line() {
        let conv = conversation();
        assert_eq!(conv.messages().len(), 1);
        let opening = &conv.messages()[0];
        assert_eq!(opening.sender(), Sender::Partner);
        assert_eq!(opening.emotion(), Some(Emotion::Neutral));
        assert!(
            conv.scenario()
                .opening_lines(Gender::Male)
                .iter()
                .any(|line| line == opening.text())
        );
        assert_eq!(conv.vibe(), VibeScore::START);
        assert_eq!(conv.result(), GameResult::Playing);
    }

    #[test]
    fn scenario_without_openings_is_rejected() {
        let content = ContentStore::load_builtin().unwrap();
        let mut scenario = content.scenario(ScenarioId::Praise).unwrap().clone();
        scenario.intro_pool.for_male = vec!["  ".into()];
        let persona = content
            .persona(Gender::Male, PersonaId::Golden)
            .unwrap()
            .clone();
        let err =
            Conversation::new(scenario, persona, Gender::Male, StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(
            err,
            ConversationError::NoOpeningLines {
                scenario: ScenarioId::Praise,
                player: Gender::Male
            }
        );
    }

    #[tokio::test]
    async fn top_score_raises_vibe_and_tags_reply() {
        let mut conv = conversation();
        let service = Scripted::new(&[5]);
        let report = conv.submit_user_message("辛苦了，我幫你泡杯茶", &service).await.unwrap();

        assert_eq!(report.vibe_delta, 10);
        assert_eq!(conv.vibe().value(), 60);
        assert_eq!(conv.last_delta(), Some(10));
        assert!(!conv.is_pending());

        let user = conv.message(report.user_message).unwrap();
        assert_eq!(user.feedback().unwrap().vibe_delta, 10);
        let partner = conv.message(report.partner_message).unwrap();
        assert_eq!(partner.emotion(), Some(Emotion::Affectionate));
        assert_eq!(conv.messages().len(), 3);
    }

    #[tokio::test]
    async fn request_carries_prior_history_only() {
        let mut conv = conversation();
        let service = Scripted::new(&[3, 3]);
        conv.submit_user_message("first", &service).await.unwrap();
        conv.submit_user_message("second", &service).await.unwrap();

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen[0].history.len(), 1);
        assert_eq!(seen[0].history[0].role, HistoryRole::Model);
        assert_eq!(seen[1].history.len(), 3);
        assert_eq!(seen[1].history[1].role, HistoryRole::User);
        assert_eq!(seen[1].history[1].content, "first");
        assert_eq!(seen[1].user_message, "second");
        assert_eq!(seen[1].vibe_score, VibeScore::START);
    }

    #[tokio::test]
    async fn dropping_to_zero_clamps_and_raises_defeat() {
        let mut conv = conversation();
        let service = Scripted::new(&[2, 1, 1]);

        let first = conv.submit_user_message("嗯", &service).await.unwrap();
        assert_eq!(conv.vibe().value(), 38);
        assert!(conv.unlock_feedback(first.user_message));
        assert_eq!(conv.vibe().value(), 33);
        conv.submit_user_message("喔", &service).await.unwrap();
        assert_eq!(conv.vibe().value(), 8);

        let report = conv.submit_user_message("隨便", &service).await.unwrap();
        assert_eq!(report.vibe.value(), 0);
        assert_eq!(report.final_call, Some(FinalCall::Defeat));
        assert_eq!(conv.result(), GameResult::Playing);
        assert!(conv.verdict().is_some_and(|v| DEFEAT_VERDICTS.contains(&v)));

        assert_eq!(
            conv.begin_submit("還在嗎").unwrap_err(),
            SubmitRejection::AwaitingAcknowledgment
        );
        assert_eq!(conv.acknowledge_final_call(), Some(GameResult::Lost));
        assert_eq!(conv.acknowledge_final_call(), None);
    }

    #[tokio::test]
    async fn reaching_max_raises_victory() {
        let mut conv = conversation();
        let service = Scripted::new(&[5, 5, 5, 5, 5]);
        let mut last = None;
        for _ in 0..5 {
            last = Some(conv.submit_user_message("好棒", &service).await.unwrap());
        }
        assert_eq!(conv.vibe(), VibeScore::MAX);
        assert_eq!(last.unwrap().final_call, Some(FinalCall::Victory));
        assert!(conv.verdict().is_none());
        assert_eq!(conv.acknowledge_final_call(), Some(GameResult::Won));
    }

    #[tokio::test]
    async fn terminal_result_is_one_way() {
        let mut conv = conversation();
        conv.set_vibe(95);
        let service = Scripted::new(&[5, 1]);
        conv.submit_user_message("愛你", &service).await.unwrap();
        conv.acknowledge_final_call();
        assert_eq!(conv.result(), GameResult::Won);

        let before = conv.messages().len();
        assert_eq!(
            conv.submit_user_message("再聊", &service).await.unwrap_err(),
            SubmitRejection::GameOver
        );
        assert_eq!(conv.messages().len(), before);

        let scored = conv.messages()[1].id();
        conv.unlock_suggestion(scored);
        assert_eq!(conv.result(), GameResult::Won);

        conv.restart();
        assert_eq!(conv.result(), GameResult::Playing);
        assert_eq!(conv.vibe(), VibeScore::START);
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        assert!(conv.is_pending());
        assert_eq!(
            conv.begin_submit("again").unwrap_err(),
            SubmitRejection::RequestPending
        );
        assert_eq!(conv.messages().len(), 2);

        conv.complete_submit(turn, reply(3)).unwrap();
        assert!(!conv.is_pending());
    }

    #[test]
    fn blank_input_is_rejected() {
        let mut conv = conversation();
        assert_eq!(conv.begin_submit("   \n").unwrap_err(), SubmitRejection::EmptyInput);
        assert!(!conv.is_pending());
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn reply_after_restart_is_dropped() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        conv.restart();
        assert!(conv.complete_submit(turn, reply(5)).is_none());
        assert_eq!(conv.vibe(), VibeScore::START);
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn degraded_reply_leaves_vibe_unchanged() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        let report = conv.complete_submit(turn, reply(0)).unwrap();
        assert_eq!(report.score, Score::Degraded);
        assert_eq!(report.vibe_delta, 0);
        assert_eq!(conv.vibe(), VibeScore::START);
        let partner = conv.message(report.partner_message).unwrap();
        assert_eq!(partner.emotion(), Some(Emotion::Neutral));
    }

    #[test]
    fn blank_reply_text_is_replaced() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        let mut blank = reply(3);
        blank.reply_text = "  ".into();
        let report = conv.complete_submit(turn, blank).unwrap();
        assert_eq!(
            conv.message(report.partner_message).unwrap().text(),
            SILENT_REPLY.as_str()
        );
    }

    #[test]
    fn feedback_unlock_charges_once() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        let id = conv.complete_submit(turn, reply(3)).unwrap().user_message;

        assert!(conv.unlock_feedback(id));
        assert!(!conv.unlock_feedback(id));
        assert_eq!(conv.vibe().value(), 45);
        assert!(conv.message(id).unwrap().feedback_unlocked());
    }

    #[test]
    fn feedback_unlock_needs_feedback_and_vibe() {
        let mut conv = conversation();
        let opening = conv.messages()[0].id();
        assert!(!conv.unlock_feedback(opening));

        let turn = conv.begin_submit("hello").unwrap();
        let id = turn.message_id();
        assert!(!conv.unlock_feedback(id));
        conv.complete_submit(turn, reply(3));

        conv.set_vibe(4);
        assert!(!conv.unlock_feedback(id));
        assert_eq!(conv.vibe().value(), 4);
    }

    #[test]
    fn suggestion_cost_schedule() {
        let mut conv = conversation();
        conv.set_vibe(70);
        assert_eq!(conv.suggestion_cost(), 5);
        conv.set_vibe(5);
        assert_eq!(conv.suggestion_cost(), 0);
        assert_eq!(conv.suggestion_cost_label(), "FREE");
        conv.set_vibe(40);
        assert_eq!(conv.suggestion_cost(), 2);
        assert_eq!(conv.suggestion_cost_label(), "Cost 2 HP");
        conv.set_vibe(60);
        assert_eq!(conv.suggestion_cost(), 2);
        conv.set_vibe(10);
        assert_eq!(conv.suggestion_cost(), 2);
    }

    #[test]
    fn suggestion_toggles_free_after_first_reveal() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        let id = conv.complete_submit(turn, reply(3)).unwrap().user_message;
        conv.set_vibe(70);

        assert_eq!(conv.unlock_suggestion(id), SuggestionUnlock::Revealed { cost: 5 });
        assert_eq!(conv.vibe().value(), 65);
        assert_eq!(conv.visible_suggestion(), Some(id));

        assert_eq!(
            conv.unlock_suggestion(id),
            SuggestionUnlock::Toggled { visible: false }
        );
        assert_eq!(conv.unlock_suggestion(id), SuggestionUnlock::Toggled { visible: true });
        assert_eq!(conv.vibe().value(), 65);
    }

    #[test]
    fn suggestion_unavailable_without_feedback() {
        let mut conv = conversation();
        let opening = conv.messages()[0].id();
        assert_eq!(conv.unlock_suggestion(opening), SuggestionUnlock::Unavailable);
        assert_eq!(
            conv.unlock_suggestion(MessageId::new(99)),
            SuggestionUnlock::Unavailable
        );
    }

    #[test]
    fn unlock_deduction_can_raise_defeat() {
        let mut conv = conversation();
        let turn = conv.begin_submit("hello").unwrap();
        let id = conv.complete_submit(turn, reply(3)).unwrap().user_message;
        conv.set_vibe(5);
        assert!(conv.unlock_feedback(id));
        assert_eq!(conv.final_call(), Some(FinalCall::Defeat));
    }

    #[tokio::test]
    async fn unlocks_are_frozen_during_final_call() {
        let mut conv = conversation();
        conv.set_vibe(95);
        let service = Scripted::new(&[5]);
        let report = conv.submit_user_message("愛你", &service).await.unwrap();
        assert_eq!(report.final_call, Some(FinalCall::Victory));
        let id = report.user_message;

        assert!(!conv.unlock_feedback(id));
        assert_eq!(
            conv.unlock_suggestion(id),
            SuggestionUnlock::AwaitingAcknowledgment
        );
        assert_eq!(conv.vibe(), VibeScore::MAX);
        assert!(!conv.message(id).unwrap().feedback_unlocked());
        assert!(!conv.message(id).unwrap().suggestion_unlocked());
        assert_eq!(conv.acknowledge_final_call(), Some(GameResult::Won));

        // Once the result is fixed, unlocks reveal text without changing it.
        assert!(conv.unlock_feedback(id));
        assert_eq!(conv.result(), GameResult::Won);
    }
}
