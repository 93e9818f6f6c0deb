//! Plain-text projection of the session and conversation.

use vibe_core::{Conversation, FEEDBACK_UNLOCK_COST, SessionSummary};
use vibe_types::{Emotion, Message, MessageId, Persona, Scenario, VibeBand, VibeScore};

pub const TUTORIAL: &str = "\
💡 玩法核心
  1. 維持好感度 HP，達到 100 通關成功，降至 0 則特訓失敗。
  2. 輸入 /unlock N 解鎖第 N 句的 AI 點評，/hint N 解鎖建議回覆。
  3. 點評每次消耗 5 HP，建議依目前好感度收費，請謹慎使用。
輸入 /ok 開始挑戰!";

pub const PRACTICE_HELP: &str = "\
直接輸入文字傳送訊息。
  /unlock N  解鎖第 N 句的點評      /hint N   解鎖或切換第 N 句的建議
  /summary   查看溝通特質分析        /restart  重新開始
  /info      對象資料               /tips     玩法說明
  /ok        確認結算               /back     回到教學頁";

const BAR_WIDTH: usize = 20;

pub fn vibe_bar(vibe: VibeScore) -> String {
    let filled = usize::from(vibe.value()) * BAR_WIDTH / 100;
    let marker = match vibe.band() {
        VibeBand::Critical => " ⚠",
        VibeBand::Steady => "",
        VibeBand::Blazing => " 🔥",
    };
    format!(
        "[{}{}] {}/100 {}{marker}",
        "■".repeat(filled),
        "□".repeat(BAR_WIDTH - filled),
        vibe.value(),
        vibe.tier()
    )
}

/// Id of the `n`th (1-based) user message.
pub fn user_turn_id(messages: &[Message], n: usize) -> Option<MessageId> {
    messages
        .iter()
        .filter(|m| m.is_user())
        .nth(n.checked_sub(1)?)
        .map(Message::id)
}

pub fn transcript(conversation: &Conversation) -> String {
    let mut out = String::new();
    let mut turn = 0;
    for message in conversation.messages() {
        if message.is_user() {
            turn += 1;
            let visible = conversation.visible_suggestion() == Some(message.id());
            out.push_str(&user_line(message, turn, visible));
        } else {
            out.push_str(&partner_line(message, &conversation.persona().name));
        }
    }
    out
}

pub fn partner_line(message: &Message, name: &str) -> String {
    let glyph = message.emotion().map_or("💬", Emotion::glyph);
    format!("{glyph} {name}：{}\n", message.text())
}

pub fn user_line(message: &Message, turn: usize, suggestion_visible: bool) -> String {
    let mut out = format!("#{turn} 你：{}\n", message.text());
    let Some(feedback) = message.feedback() else {
        return out;
    };

    if feedback.score.is_degraded() {
        out.push_str("    ⚠ 本句未計分\n");
    } else {
        out.push_str(&format!(
            "    評分 {}/5，好感度 {:+}\n",
            feedback.score.wire_value(),
            feedback.vibe_delta
        ));
    }

    if message.feedback_unlocked() {
        out.push_str(&format!("    🎓 點評：{}\n", feedback.critique));
    } else {
        out.push_str(&format!(
            "    🔒 點評 (/unlock {turn}，{FEEDBACK_UNLOCK_COST} HP)\n"
        ));
    }

    if suggestion_visible {
        out.push_str(&format!("    💡 建議：{}\n", feedback.suggestion));
    } else if message.suggestion_unlocked() {
        out.push_str(&format!("    💡 建議已收起 (/hint {turn})\n"));
    }
    out
}

pub fn persona_list(personas: &[Persona]) -> String {
    let mut out = String::new();
    for (i, persona) in personas.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} {}  {}\n",
            i + 1,
            persona.avatar,
            persona.name,
            persona.description
        ));
    }
    out
}

pub fn persona_info(persona: &Persona) -> String {
    format!(
        "{} {}\n  {}\n  個性：{}\n  對象喜好：{}\n  對話雷區：{}\n",
        persona.avatar,
        persona.name,
        persona.style_hint,
        persona.trait_desc,
        persona.likes.join("、"),
        persona.dislikes.join("、")
    )
}

pub fn scenario_menu(scenarios: &[Scenario]) -> String {
    let mut out = String::new();
    for (i, scenario) in scenarios.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} {}  {}\n",
            i + 1,
            scenario.emoji,
            scenario.title,
            scenario.description
        ));
    }
    out
}

pub fn lesson(scenario: &Scenario) -> String {
    let mut out = format!(
        "{} {}\n{}\n\n高分範例：\n",
        scenario.emoji, scenario.title, scenario.description
    );
    for example in &scenario.examples {
        out.push_str(&format!("  ・{example}\n"));
    }
    if !scenario.replacements.is_empty() {
        out.push_str("\n換個說法：\n");
        for replacement in &scenario.replacements {
            out.push_str(&format!(
                "  「{}」→ {}\n",
                replacement.word,
                replacement.alternatives.join(" / ")
            ));
        }
    }
    out
}

fn axis_label(key: &str) -> &'static str {
    match key {
        "empathy" => "共感",
        "logic" => "邏輯",
        "action" => "行動",
        "humor" => "幽默",
        "patience" => "耐心",
        _ => "？？",
    }
}

pub fn summary(summary: &SessionSummary) -> String {
    let profile = summary.archetype.profile();
    let mut out = format!(
        "{} {}（{}）\n{}\n建議：{}\n\n",
        profile.emoji, profile.name, profile.traits, profile.description, profile.advice
    );
    for (key, value) in summary.axes.as_array() {
        let filled = usize::from(value) / 10;
        out.push_str(&format!(
            "  {} {}{} {value}\n",
            axis_label(key),
            "■".repeat(filled),
            "□".repeat(10 - filled)
        ));
    }
    match summary.average_score {
        Some(avg) => out.push_str(&format!(
            "\n有效評分 {} 則，平均 {avg:.1} 分\n",
            summary.rated_messages
        )),
        None => out.push_str("\n尚無有效評分\n"),
    }
    out
}
