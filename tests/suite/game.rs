//! Whole practice sessions: thresholds, final call, unlock economy.

use vibe_core::{
    Archetype, DEFEAT_VERDICTS, FinalCall, GameResult, SubmitRejection, SuggestionUnlock,
};
use vibe_types::{Emotion, VibeScore};

use crate::common::{Scripted, conversation, rated};

#[tokio::test]
async fn a_great_line_moves_fifty_to_sixty() {
    let service = Scripted::new([rated(5, "你好甜")]);
    let mut conversation = conversation(10);

    let report = conversation
        .submit_user_message("今天的你特別好看", &service)
        .await
        .unwrap();

    assert_eq!(report.vibe, VibeScore::clamped(60));
    assert_eq!(conversation.last_delta(), Some(10));
    assert_eq!(conversation.tier(), VibeScore::clamped(60).tier());
    let partner = conversation.message(report.partner_message).unwrap();
    assert_eq!(partner.emotion(), Some(Emotion::Affectionate));
    assert_eq!(conversation.messages().len(), 3);
}

#[tokio::test]
async fn sliding_to_zero_needs_acknowledgment_before_losing() {
    let service = Scripted::scores(&[1, 2, 2]);
    let mut conversation = conversation(11);

    let first = conversation.submit_user_message("喔", &service).await.unwrap();
    assert_eq!(first.vibe.value(), 25);
    conversation.submit_user_message("隨便", &service).await.unwrap();
    assert_eq!(conversation.vibe().value(), 13);

    assert!(conversation.unlock_feedback(first.user_message));
    assert_eq!(conversation.vibe().value(), 8);
    assert!(!conversation.unlock_feedback(first.user_message));

    let last = conversation.submit_user_message("都可以", &service).await.unwrap();
    assert_eq!(last.vibe.value(), 0);
    assert_eq!(last.final_call, Some(FinalCall::Defeat));
    assert_eq!(conversation.result(), GameResult::Playing);
    assert!(DEFEAT_VERDICTS.contains(&conversation.verdict().unwrap()));

    assert_eq!(
        conversation.begin_submit("等等").unwrap_err(),
        SubmitRejection::AwaitingAcknowledgment
    );
    assert_eq!(conversation.acknowledge_final_call(), Some(GameResult::Lost));
    assert_eq!(conversation.acknowledge_final_call(), None);
    assert_eq!(
        conversation.begin_submit("再給我一次機會").unwrap_err(),
        SubmitRejection::GameOver
    );
    assert_eq!(service.requests_left(), 0);

    conversation.restart();
    assert_eq!(conversation.vibe(), VibeScore::START);
    assert_eq!(conversation.result(), GameResult::Playing);
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.verdict(), None);
}

#[tokio::test]
async fn five_perfect_lines_win_the_session() {
    let service = Scripted::scores(&[5, 5, 5, 5, 5]);
    let mut conversation = conversation(12);

    for round in 1..=5 {
        let report = conversation
            .submit_user_message("我記得你說過喜歡海", &service)
            .await
            .unwrap();
        let expected = (round == 5).then_some(FinalCall::Victory);
        assert_eq!(report.final_call, expected, "round {round}");
    }
    assert_eq!(conversation.vibe(), VibeScore::MAX);
    assert_eq!(conversation.acknowledge_final_call(), Some(GameResult::Won));

    let summary = conversation.summary();
    assert_eq!(summary.rated_messages, 5);
    assert_eq!(summary.average_score, Some(5.0));
    assert_eq!(summary.archetype, Archetype::LightningRod);
}

#[tokio::test]
async fn a_pending_victory_cannot_be_spent_down() {
    let service = Scripted::scores(&[5, 5, 5, 5, 5]);
    let mut conversation = conversation(14);

    let mut last = None;
    for _ in 0..5 {
        last = Some(
            conversation
                .submit_user_message("週末陪你去看海", &service)
                .await
                .unwrap(),
        );
    }
    let last = last.unwrap();
    assert_eq!(last.final_call, Some(FinalCall::Victory));

    assert!(!conversation.unlock_feedback(last.user_message));
    assert_eq!(
        conversation.unlock_suggestion(last.user_message),
        SuggestionUnlock::AwaitingAcknowledgment
    );
    assert_eq!(conversation.vibe(), VibeScore::MAX);
    assert_eq!(conversation.final_call(), Some(FinalCall::Victory));
    assert_eq!(conversation.acknowledge_final_call(), Some(GameResult::Won));
}

#[tokio::test]
async fn suggestions_are_paid_once_then_toggle() {
    let service = Scripted::scores(&[5, 5]);
    let mut conversation = conversation(13);

    let first = conversation.submit_user_message("早安", &service).await.unwrap();
    assert_eq!(conversation.suggestion_cost(), 2);
    conversation.submit_user_message("吃早餐了嗎", &service).await.unwrap();
    assert_eq!(conversation.vibe().value(), 70);
    assert_eq!(conversation.suggestion_cost_label(), "Cost 5 HP");

    assert_eq!(
        conversation.unlock_suggestion(first.user_message),
        SuggestionUnlock::Revealed { cost: 5 }
    );
    assert_eq!(conversation.vibe().value(), 65);
    assert_eq!(conversation.visible_suggestion(), Some(first.user_message));

    assert_eq!(
        conversation.unlock_suggestion(first.user_message),
        SuggestionUnlock::Toggled { visible: false }
    );
    assert_eq!(
        conversation.unlock_suggestion(first.user_message),
        SuggestionUnlock::Toggled { visible: true }
    );
    assert_eq!(conversation.vibe().value(), 65);

    // Partner lines carry no feedback.
    assert_eq!(
        conversation.unlock_suggestion(first.partner_message),
        SuggestionUnlock::Unavailable
    );
}

#[tokio::test]
async fn one_request_at_a_time_and_restart_drops_the_late_reply() {
    let mut conversation = conversation(14);

    let turn = conversation.begin_submit("你在哪").unwrap();
    assert!(conversation.is_pending());
    assert_eq!(
        conversation.begin_submit("怎麼不回").unwrap_err(),
        SubmitRejection::RequestPending
    );
    assert_eq!(conversation.messages().len(), 2);

    conversation.restart();
    assert!(!conversation.is_pending());
    assert!(conversation.complete_submit(turn, rated(5, "在家")).is_none());
    assert_eq!(conversation.vibe(), VibeScore::START);
    assert_eq!(conversation.messages().len(), 1);
}

#[tokio::test]
async fn blank_input_is_refused_without_a_request() {
    let service = Scripted::new(Vec::new());
    let mut conversation = conversation(15);
    assert_eq!(
        conversation
            .submit_user_message("   ", &service)
            .await
            .unwrap_err(),
        SubmitRejection::EmptyInput
    );
    assert_eq!(conversation.messages().len(), 1);
}
