//! Prompt contract: system instruction and transcript for one turn.

use serde_json::{Value, json};

use vibe_types::{Gender, HistoryRole, ReplyRequest};

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "男性",
        Gender::Female => "女性",
    }
}

/// System instruction for the dual role-player / coach.
#[must_use]
pub fn system_instruction(request: &ReplyRequest) -> String {
    let persona = &request.persona;
    let scenario = &request.scenario;
    let player = gender_label(request.player_gender);
    let partner = gender_label(request.player_gender.partner());
    format!(
        "你是一位頂尖的感情經營大師，同時扮演玩家的{partner}伴侶。\n\
         目前練習情境是「{title}」：{description}\n\
         \n\
         【伴侶人設】\n\
         名字：{name}\n\
         性格：{traits}\n\
         喜歡：{likes}\n\
         討厭：{dislikes}\n\
         說話風格：{style}\n\
         \n\
         玩家是{player}，目前好感度為 {vibe}/100。\n\
         \n\
         【行為準則】\n\
         1. 伴侶身份：請表現得像個真實的人。如果玩家敷衍（如只回一個字、亂打字、123），請表現出不悅、困惑或撒嬌吐槽，不要生硬配合。\n\
         2. 導師身份：替玩家最新的一句話評分 1-5 分。敷衍或冷漠給 1-2 分，並明確解釋為什麼這樣的溝通會讓對方感到心寒；具體、有同理心的表達給 4-5 分。絕對不要給 0 分。\n\
         3. suggestion 請提供一句更具體、更貼近這位伴侶喜好的改寫。\n\
         4. 所有內容請使用繁體中文。",
        title = scenario.title,
        description = scenario.description,
        name = persona.name,
        traits = persona.trait_desc,
        likes = persona.likes.join("、"),
        dislikes = persona.dislikes.join("、"),
        style = persona.style_hint,
        vibe = request.vibe_score.value(),
    )
}

/// Prior history plus the new message as Gemini `contents`.
#[must_use]
pub fn contents(request: &ReplyRequest) -> Vec<Value> {
    request
        .history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                HistoryRole::User => "user",
                HistoryRole::Model => "model",
            };
            json!({ "role": role, "parts": [{ "text": turn.content }] })
        })
        .chain(std::iter::once(
            json!({ "role": "user", "parts": [{ "text": request.user_message }] }),
        ))
        .collect()
}

/// Structured-output schema the model must follow.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "girlfriendReply": {
                "type": "STRING",
                "description": "伴侶身分的自然回覆內容"
            },
            "coachFeedback": {
                "type": "OBJECT",
                "properties": {
                    "score": { "type": "INTEGER", "description": "1-5 分的評分" },
                    "comment": { "type": "STRING", "description": "針對回覆內容的深度分析" },
                    "suggestion": { "type": "STRING", "description": "更浪漫或更合適的改寫建議" }
                },
                "required": ["score", "comment", "suggestion"]
            }
        },
        "required": ["girlfriendReply", "coachFeedback"]
    })
}
