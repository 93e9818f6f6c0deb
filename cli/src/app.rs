//! Line-oriented driver over the session and conversation.
//!
//! Every state change goes through `vibe_core`; this module only reads input,
//! picks the operation and prints the result.

use std::io::{self, Write};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use vibe_core::{
    ContentStore, Conversation, FinalCall, GameResult, NavigationError, ROLL_TICK, Roll, Session,
    SubmitRejection, SuggestionUnlock, TutorialFlag, TutorialPrompt, View,
};
use vibe_providers::ReplyRouter;
use vibe_types::{Gender, MessageId, ReplyService};

use crate::command::{self, Command};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<F, W> {
    content: ContentStore,
    session: Session,
    conversation: Option<Conversation>,
    router: ReplyRouter,
    tutorial: TutorialPrompt<F>,
    rng: StdRng,
    roll_tick: Duration,
    out: W,
}

impl<F: TutorialFlag, W: Write> App<F, W> {
    pub fn new(
        content: ContentStore,
        router: ReplyRouter,
        tutorial: TutorialPrompt<F>,
        rng: StdRng,
        out: W,
    ) -> Self {
        Self {
            content,
            session: Session::new(),
            conversation: None,
            router,
            tutorial,
            rng,
            roll_tick: ROLL_TICK,
            out,
        }
    }

    /// Frame delay of the persona roll. Must be non-zero.
    #[cfg(test)]
    pub fn with_roll_tick(mut self, tick: Duration) -> Self {
        self.roll_tick = tick;
        self
    }

    #[cfg(test)]
    pub fn view(&self) -> View {
        self.session.view()
    }

    #[cfg(test)]
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Read commands until EOF or `exit`.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        let mut lines = input.lines();
        self.show_view()?;
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.handle_line(&line).await? == Flow::Quit {
                break;
            }
        }
        writeln!(self.out, "\n掰掰 👋")?;
        self.out.flush()
    }

    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let in_practice = self.session.view() == View::Practice;
        let Some(command) = command::parse(line, in_practice) else {
            return Ok(Flow::Continue);
        };
        tracing::debug!(view = self.session.view().as_str(), ?command, "Input");

        match self.session.view() {
            View::Landing => self.on_landing(command),
            View::PersonaSelect => self.on_persona_select(command).await,
            View::Menu => self.on_menu(command),
            View::Learn => self.on_learn(command),
            View::Practice => self.on_practice(command).await.map(|()| Flow::Continue),
        }
    }

    fn show_view(&mut self) -> io::Result<()> {
        match self.session.view() {
            View::Landing => writeln!(
                self.out,
                "💘 Vibe Coach 戀愛溝通特訓\n你是：\n  1. 男生\n  2. 女生\n(exit 離開)"
            ),
            View::PersonaSelect => {
                let Some(gender) = self.session.player_gender() else {
                    return Ok(());
                };
                let list = render::persona_list(self.content.partners_for(gender));
                writeln!(
                    self.out,
                    "選擇練習對象：\n{list}(random 隨機抽選，back 重選性別)"
                )
            }
            View::Menu => {
                let who = self
                    .session
                    .persona(&self.content)
                    .map(|p| format!("{} {}", p.avatar, p.name))
                    .unwrap_or_default();
                let menu = render::scenario_menu(self.content.scenarios());
                writeln!(
                    self.out,
                    "對象：{who}\n選擇情境：\n{menu}(/info 對象資料，back 換對象)"
                )
            }
            View::Learn => {
                let lesson = self
                    .session
                    .scenario(&self.content)
                    .map(render::lesson)
                    .unwrap_or_default();
                writeln!(self.out, "{lesson}\n輸入 ok 開始實戰，back 回到情境選單")
            }
            View::Practice => self.show_practice(),
        }
    }

    fn show_practice(&mut self) -> io::Result<()> {
        if self.tutorial.is_visible() {
            return writeln!(self.out, "{}", render::TUTORIAL);
        }
        let Some(conversation) = &self.conversation else {
            return Ok(());
        };
        writeln!(
            self.out,
            "{} {} ｜ {} {}\n{}\n{}建議價格：{}　(/help 查看指令)",
            conversation.persona().avatar,
            conversation.persona().name,
            conversation.scenario().emoji,
            conversation.scenario().title,
            render::vibe_bar(conversation.vibe()),
            render::transcript(conversation),
            conversation.suggestion_cost_label()
        )
    }

    fn navigated(&mut self, result: Result<(), NavigationError>) -> io::Result<()> {
        match result {
            Ok(()) => self.show_view(),
            Err(e) => {
                tracing::warn!(view = self.session.view().as_str(), "Navigation refused: {e}");
                writeln!(self.out, "⚠ {e}")
            }
        }
    }

    fn unknown(&mut self, command: &Command) -> io::Result<()> {
        match command {
            Command::Unknown(input) => {
                writeln!(self.out, "看不懂「{input}」，輸入 help 查看可用指令")
            }
            _ => writeln!(self.out, "這個指令在這一頁用不到，輸入 help 查看可用指令"),
        }
    }

    fn on_landing(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Pick(1) => {
                let result = self.session.select_gender(Gender::Male);
                self.navigated(result)?;
            }
            Command::Pick(2) => {
                let result = self.session.select_gender(Gender::Female);
                self.navigated(result)?;
            }
            Command::Exit => return Ok(Flow::Quit),
            Command::Help => self.show_view()?,
            other => self.unknown(&other)?,
        }
        Ok(Flow::Continue)
    }

    async fn on_persona_select(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Pick(n) => {
                let picked = self
                    .session
                    .player_gender()
                    .and_then(|g| self.content.partners_for(g).get(n - 1))
                    .map(|p| p.id);
                match picked {
                    Some(id) => {
                        let result = self.session.select_persona(&self.content, id);
                        self.navigated(result)?;
                    }
                    None => writeln!(self.out, "沒有第 {n} 位對象")?,
                }
            }
            Command::Random => self.roll_persona().await?,
            Command::Back => {
                let result = self.session.change_gender();
                self.navigated(result)?;
            }
            Command::Exit => return Ok(Flow::Quit),
            Command::Help => self.show_view()?,
            other => self.unknown(&other)?,
        }
        Ok(Flow::Continue)
    }

    async fn roll_persona(&mut self) -> io::Result<()> {
        let Some(gender) = self.session.player_gender() else {
            return Ok(());
        };
        let partners = self.content.partners_for(gender);
        let Some(roll) = Roll::spin(partners.len(), &mut self.rng) else {
            return writeln!(self.out, "⚠ 目前沒有可選的對象");
        };

        let mut ticker = tokio::time::interval(self.roll_tick);
        for &index in roll.frames() {
            ticker.tick().await;
            let persona = &partners[index];
            write!(self.out, "\r🎰 {} {}        ", persona.avatar, persona.name)?;
            self.out.flush()?;
        }
        ticker.tick().await;
        let winner = &partners[roll.winner()];
        writeln!(self.out, "\r🎯 {} {}        ", winner.avatar, winner.name)?;

        let id = winner.id;
        let result = self.session.select_persona(&self.content, id);
        self.navigated(result)
    }

    fn on_menu(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Pick(n) => match self.content.scenarios().get(n - 1).map(|s| s.id) {
                Some(id) => {
                    let result = self.session.select_scenario(&self.content, id);
                    self.navigated(result)?;
                }
                None => writeln!(self.out, "沒有第 {n} 個情境")?,
            },
            Command::Info => {
                if let Some(persona) = self.session.persona(&self.content) {
                    writeln!(self.out, "{}", render::persona_info(persona))?;
                }
            }
            Command::Back => {
                let result = self.session.change_persona();
                self.navigated(result)?;
            }
            Command::Exit => return Ok(Flow::Quit),
            Command::Help => self.show_view()?,
            other => self.unknown(&other)?,
        }
        Ok(Flow::Continue)
    }

    fn on_learn(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Ok | Command::Pick(1) => self.enter_practice()?,
            Command::Back => {
                let result = self.session.back();
                self.navigated(result)?;
            }
            Command::Exit => return Ok(Flow::Quit),
            Command::Help => self.show_view()?,
            other => self.unknown(&other)?,
        }
        Ok(Flow::Continue)
    }

    fn enter_practice(&mut self) -> io::Result<()> {
        let (Some(scenario), Some(persona), Some(player)) = (
            self.session.scenario(&self.content).cloned(),
            self.session.persona(&self.content).cloned(),
            self.session.player_gender(),
        ) else {
            return writeln!(self.out, "⚠ 尚未選好對象與情境");
        };
        let rng = StdRng::from_rng(&mut self.rng);
        match Conversation::new(scenario, persona, player, rng) {
            Ok(conversation) => {
                let result = self.session.start_practice();
                if result.is_ok() {
                    self.conversation = Some(conversation);
                }
                self.navigated(result)
            }
            Err(e) => {
                tracing::error!("Cannot start practice: {e}");
                writeln!(self.out, "⚠ {e}")
            }
        }
    }

    async fn on_practice(&mut self, command: Command) -> io::Result<()> {
        if self.tutorial.is_visible()
            && !matches!(
                command,
                Command::Ok | Command::Tips | Command::Back | Command::Exit
            )
        {
            return writeln!(self.out, "先輸入 /ok 關閉說明");
        }

        match command {
            Command::Say(text) => self.say(&text).await,
            Command::Unlock(n) => self.unlock_feedback(n),
            Command::Hint(n) => self.unlock_suggestion(n),
            Command::Ok => self.acknowledge(),
            Command::Restart => {
                if let Some(conversation) = &mut self.conversation {
                    conversation.restart();
                }
                self.show_practice()
            }
            Command::Summary => match &self.conversation {
                Some(conversation) => {
                    let summary = render::summary(&conversation.summary());
                    writeln!(self.out, "{summary}")
                }
                None => Ok(()),
            },
            Command::Tips => writeln!(self.out, "{}", render::TUTORIAL),
            Command::Info => match &self.conversation {
                Some(conversation) => {
                    let info = render::persona_info(conversation.persona());
                    writeln!(self.out, "{info}")
                }
                None => Ok(()),
            },
            Command::Help => writeln!(self.out, "{}", render::PRACTICE_HELP),
            Command::Back | Command::Exit => {
                self.conversation = None;
                let result = self.session.exit_practice();
                self.navigated(result)
            }
            other => self.unknown(&other),
        }
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        let Some(conversation) = &mut self.conversation else {
            return Ok(());
        };
        let turn = match conversation.begin_submit(text) {
            Ok(turn) => turn,
            Err(rejection) => return writeln!(self.out, "⚠ {}", rejection_text(rejection)),
        };
        writeln!(self.out, "（{} 輸入中…）", conversation.persona().name)?;
        self.out.flush()?;

        let reply = self.router.get_reply(turn.request()).await;
        let Some(report) = conversation.complete_submit(turn, reply) else {
            return Ok(());
        };

        let messages = conversation.messages();
        let turn_number = messages.iter().filter(|m| m.is_user()).count();
        if let Some(user) = conversation.message(report.user_message) {
            let line = render::user_line(user, turn_number, false);
            write!(self.out, "{line}")?;
        }
        if let Some(partner) = conversation.message(report.partner_message) {
            let line = render::partner_line(partner, &conversation.persona().name);
            write!(self.out, "{line}")?;
        }
        writeln!(self.out, "{}", render::vibe_bar(report.vibe))?;
        if let Some(call) = report.final_call {
            writeln!(self.out, "{}", final_call_text(call))?;
        }
        Ok(())
    }

    fn unlock_feedback(&mut self, n: usize) -> io::Result<()> {
        let Some(conversation) = &mut self.conversation else {
            return Ok(());
        };
        let Some(id) = render::user_turn_id(conversation.messages(), n) else {
            return writeln!(self.out, "沒有第 {n} 句");
        };
        if conversation.final_call().is_some() {
            return writeln!(self.out, "⚠ 先輸入 /ok 確認結算");
        }
        if !conversation.unlock_feedback(id) {
            return writeln!(self.out, "⚠ 無法解鎖：尚無點評、已經解鎖，或好感度不足");
        }
        if let Some(feedback) = conversation.message(id).and_then(|m| m.feedback()) {
            writeln!(self.out, "🎓 點評：{}", feedback.critique)?;
        }
        writeln!(self.out, "{}", render::vibe_bar(conversation.vibe()))?;
        if let Some(call) = conversation.final_call() {
            writeln!(self.out, "{}", final_call_text(call))?;
        }
        Ok(())
    }

    fn unlock_suggestion(&mut self, n: usize) -> io::Result<()> {
        let Some(conversation) = &mut self.conversation else {
            return Ok(());
        };
        let Some(id) = render::user_turn_id(conversation.messages(), n) else {
            return writeln!(self.out, "沒有第 {n} 句");
        };
        match conversation.unlock_suggestion(id) {
            SuggestionUnlock::Revealed { cost } => {
                let text = suggestion_of(conversation, id);
                writeln!(self.out, "💡 建議：{text}（-{cost} HP）")?;
                writeln!(self.out, "{}", render::vibe_bar(conversation.vibe()))?;
            }
            SuggestionUnlock::Toggled { visible: true } => {
                writeln!(self.out, "💡 建議：{}", suggestion_of(conversation, id))?;
            }
            SuggestionUnlock::Toggled { visible: false } => {
                writeln!(self.out, "💡 建議已收起")?;
            }
            SuggestionUnlock::Unavailable => writeln!(self.out, "⚠ 這句還沒有建議")?,
            SuggestionUnlock::InsufficientVibe { cost } => {
                writeln!(self.out, "⚠ 好感度不足，解鎖需要 {cost} HP")?;
            }
            SuggestionUnlock::AwaitingAcknowledgment => {
                writeln!(self.out, "⚠ 先輸入 /ok 確認結算")?;
            }
        }
        if let Some(call) = conversation.final_call() {
            writeln!(self.out, "{}", final_call_text(call))?;
        }
        Ok(())
    }

    fn acknowledge(&mut self) -> io::Result<()> {
        if self.tutorial.is_visible() {
            if let Err(e) = self.tutorial.dismiss() {
                tracing::warn!("Failed to persist tutorial flag: {e}");
                writeln!(self.out, "⚠ 無法記住已看過說明：{e}")?;
            }
            return self.show_practice();
        }

        let Some(conversation) = &mut self.conversation else {
            return Ok(());
        };
        match conversation.acknowledge_final_call() {
            Some(GameResult::Won) => writeln!(
                self.out,
                "🎉 特訓成功！對方已經完全被你收服了。\n/summary 查看溝通特質，/restart 再挑戰一次"
            ),
            Some(GameResult::Lost) => {
                let verdict = conversation.verdict().unwrap_or("這次就先到這裡吧。");
                writeln!(
                    self.out,
                    "💔 特訓失敗\n「{verdict}」\n/summary 查看溝通特質，/restart 再挑戰一次"
                )
            }
            Some(GameResult::Playing) | None => writeln!(self.out, "目前沒有需要確認的結算"),
        }
    }
}

fn suggestion_of(conversation: &Conversation, id: MessageId) -> &str {
    conversation
        .message(id)
        .and_then(|m| m.feedback())
        .map_or("", |f| f.suggestion.as_str())
}

fn final_call_text(call: FinalCall) -> &'static str {
    match call {
        FinalCall::Victory => "📞 好感度爆表！輸入 /ok 查看結果",
        FinalCall::Defeat => "📞 好感度歸零了…輸入 /ok 面對現實",
    }
}

fn rejection_text(rejection: SubmitRejection) -> &'static str {
    match rejection {
        SubmitRejection::EmptyInput => "訊息是空的",
        SubmitRejection::GameOver => "這局已經結束，輸入 /restart 重新開始",
        SubmitRejection::AwaitingAcknowledgment => "先輸入 /ok 確認結算",
        SubmitRejection::RequestPending => "對方還在回覆中",
        SubmitRejection::Superseded => "對話已重新開始",
    }
}
