//! Direct route, proxy fallback and degraded replies, driven through the
//! conversation engine.

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use vibe_core::GameResult;
use vibe_providers::{DEGRADED_REPLY_TEXT, GeminiClient, ProxyClient, ReplyRouter};
use vibe_types::{ApiKey, Emotion, Score};

use crate::common::{
    GEMINI_MODEL, conversation, gemini_candidate, mount_status, mount_proxy_reply,
};

fn direct(server: &MockServer) -> GeminiClient {
    GeminiClient::new(ApiKey::new("client-key").unwrap())
        .with_model(GEMINI_MODEL)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(2))
}

fn proxy(server: &MockServer) -> ProxyClient {
    ProxyClient::new(format!("{}/api/generate", server.uri())).with_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn direct_failure_falls_back_to_proxy() {
    let gemini = MockServer::start().await;
    mount_status(&gemini, 500, "internal").await;
    let proxy_server = MockServer::start().await;
    mount_proxy_reply(&proxy_server, 5, "你怎麼這麼會說話").await;

    let router = ReplyRouter::new(Some(direct(&gemini)), Some(proxy(&proxy_server)));
    let mut conversation = conversation(1);
    let report = conversation
        .submit_user_message("剛剛路過那家店就想到你", &router)
        .await
        .unwrap();

    assert_eq!(report.vibe_delta, 10);
    assert_eq!(report.vibe.value(), 60);
    let partner = conversation.message(report.partner_message).unwrap();
    assert_eq!(partner.text(), "你怎麼這麼會說話");
    assert_eq!(partner.emotion(), Some(Emotion::Affectionate));
    assert_eq!(gemini.received_requests().await.unwrap().len(), 1);
    assert_eq!(proxy_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn proxy_receives_history_and_state() {
    let proxy_server = MockServer::start().await;
    mount_proxy_reply(&proxy_server, 3, "喔").await;

    let router = ReplyRouter::new(None, Some(proxy(&proxy_server)));
    let mut conversation = conversation(2);
    let opening = conversation.messages()[0].text().to_owned();
    conversation
        .submit_user_message("在忙嗎", &router)
        .await
        .unwrap();

    let requests = proxy_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["userMessage"], "在忙嗎");
    assert_eq!(body["playerGender"], "male");
    assert_eq!(body["vibeScore"], 50);
    assert_eq!(body["persona"]["id"], "tsundere");
    assert_eq!(body["history"][0]["role"], "model");
    assert_eq!(body["history"][0]["content"], opening.as_str());
}

#[tokio::test]
async fn both_routes_failing_degrades_and_keeps_the_vibe() {
    let gemini = MockServer::start().await;
    mount_status(&gemini, 503, "unavailable").await;
    let proxy_server = MockServer::start().await;
    mount_status(&proxy_server, 502, r#"{"error":"upstream_http","message":"down"}"#).await;

    let router = ReplyRouter::new(Some(direct(&gemini)), Some(proxy(&proxy_server)));
    let mut conversation = conversation(3);
    let report = conversation
        .submit_user_message("哈囉", &router)
        .await
        .unwrap();

    assert_eq!(report.score, Score::Degraded);
    assert_eq!(report.vibe_delta, 0);
    assert_eq!(conversation.vibe().value(), 50);
    assert_eq!(conversation.result(), GameResult::Playing);
    assert!(!conversation.is_pending());

    let partner = conversation.message(report.partner_message).unwrap();
    assert_eq!(partner.text(), DEGRADED_REPLY_TEXT);
    let feedback = conversation
        .message(report.user_message)
        .unwrap()
        .feedback()
        .unwrap();
    assert_eq!(feedback.critique, "連線異常：伺服器回應錯誤 (502)");
    assert_eq!(conversation.summary().rated_messages, 0);
}

#[tokio::test]
async fn quota_on_both_routes_asks_to_wait() {
    let gemini = MockServer::start().await;
    mount_status(&gemini, 429, "RESOURCE_EXHAUSTED").await;
    let proxy_server = MockServer::start().await;
    mount_status(&proxy_server, 429, r#"{"error":"quota_exhausted","message":"slow down"}"#)
        .await;

    let router = ReplyRouter::new(Some(direct(&gemini)), Some(proxy(&proxy_server)));
    let mut conversation = conversation(4);
    let report = conversation
        .submit_user_message("晚安", &router)
        .await
        .unwrap();

    let feedback = conversation
        .message(report.user_message)
        .unwrap()
        .feedback()
        .unwrap();
    assert_eq!(feedback.critique, "連線異常：請求額度已用盡");
    assert!(feedback.suggestion.contains("等一分鐘"));
}

#[tokio::test]
async fn zero_score_from_the_model_is_treated_as_a_failure() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_candidate(0, "嗯")))
        .mount(&gemini)
        .await;
    let proxy_server = MockServer::start().await;
    mount_proxy_reply(&proxy_server, 3, "好吧").await;

    let router = ReplyRouter::new(Some(direct(&gemini)), Some(proxy(&proxy_server)));
    let mut conversation = conversation(5);
    let report = conversation
        .submit_user_message("嗯嗯", &router)
        .await
        .unwrap();

    assert!(!report.score.is_degraded());
    assert_eq!(report.score.wire_value(), 3);
    assert_eq!(
        conversation.message(report.partner_message).unwrap().text(),
        "好吧"
    );
}
